use crate::classify::classify;
use crate::config::ReconcileConfig;
use crate::error::EngineError;
use crate::index::MatchIndex;
use crate::model::{MasterEntry, Record, RunMeta, RunResult};
use crate::normalize::normalize;
use crate::summary;

/// Reconcile one input batch against a master snapshot.
///
/// The caller's master collection is never touched: mutations land on a
/// working copy, which is returned as `updated_master`. Classification is a
/// sequential fold over accepted records in input order — the index is built
/// once from the pre-mutation snapshot, but it resolves to entries of the
/// working copy, so a record matching a key that an earlier record already
/// flipped `D`→`X` observes the updated status (last word wins within a run).
pub fn run(
    config: &ReconcileConfig,
    raw_records: Vec<Record>,
    master: &[MasterEntry],
) -> Result<RunResult, EngineError> {
    validate_structure(config, &raw_records, master)?;

    let total_rows = raw_records.len();
    let (accepted, excluded) = normalize(raw_records, config);

    let mut working: Vec<MasterEntry> = master.to_vec();
    let index = MatchIndex::build(&working, &config.key, &config.cleaning);

    let mut annotated = Vec::with_capacity(accepted.len());
    let mut outcomes = Vec::with_capacity(accepted.len());

    for mut record in accepted {
        let outcome = match index.lookup(&record, &config.key, &config.cleaning) {
            Some(idx) => classify(&mut record, Some(&mut working[idx]), &config.key),
            None => classify(&mut record, None, &config.key),
        };
        outcomes.push(outcome);
        annotated.push(record);
    }

    let summary = summary::compute(total_rows, &outcomes, excluded.len(), index.duplicate_keys);

    Ok(RunResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        accepted: annotated,
        updated_master: working,
        excluded,
    })
}

/// Fail fast before any processing: the classification table cannot be
/// evaluated when a dataset lacks its key or status columns entirely.
/// Individual rows missing values are the normalizer's job, not an error.
fn validate_structure(
    config: &ReconcileConfig,
    records: &[Record],
    master: &[MasterEntry],
) -> Result<(), EngineError> {
    if master.is_empty() {
        return Err(EngineError::EmptyMaster);
    }

    for column in [
        &config.key.part_number,
        &config.key.project,
        &config.key.status,
    ] {
        if !master.iter().any(|e| e.record.contains_field(column)) {
            return Err(EngineError::MissingColumn {
                dataset: "master".into(),
                column: column.clone(),
            });
        }
    }

    if !records.is_empty() {
        for column in [&config.key.part_number, &config.key.project] {
            if !records.iter().any(|r| r.contains_field(column)) {
                return Err(EngineError::MissingColumn {
                    dataset: "input".into(),
                    column: column.clone(),
                });
            }
        }
    }

    Ok(())
}
