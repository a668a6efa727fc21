use std::collections::HashMap;

use crate::model::{Outcome, RunSummary};

/// Compute run counters from the classified outcomes.
pub fn compute(
    total_rows: usize,
    outcomes: &[Outcome],
    excluded_rows: usize,
    duplicate_master_keys: usize,
) -> RunSummary {
    let mut outcome_counts: HashMap<String, usize> = HashMap::new();
    let mut updated_master = 0;
    let mut flagged_duplicate = 0;
    let mut flagged_new = 0;
    let mut skipped = 0;

    for outcome in outcomes {
        *outcome_counts.entry(outcome.to_string()).or_insert(0) += 1;

        match outcome {
            Outcome::UpdatedMaster => updated_master += 1,
            Outcome::FlagDuplicate => flagged_duplicate += 1,
            Outcome::FlagNew => flagged_new += 1,
            Outcome::Skipped => skipped += 1,
        }
    }

    RunSummary {
        total_rows,
        accepted_rows: outcomes.len(),
        excluded_rows,
        updated_master,
        flagged_duplicate,
        flagged_new,
        skipped,
        duplicate_master_keys,
        outcome_counts,
    }
}
