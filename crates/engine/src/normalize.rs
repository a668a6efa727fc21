use crate::config::{CleaningRules, ReconcileConfig};
use crate::model::{ExclusionRecord, Record, Scalar};

/// Clean and partition a raw batch into accepted and excluded rows.
///
/// Accepted rows come back cleaned in place; excluded rows keep their
/// original field values so the excluded report shows what actually arrived.
/// Both outputs preserve input order, and
/// `accepted.len() + excluded.len() == records.len()` always holds.
pub fn normalize(
    records: Vec<Record>,
    config: &ReconcileConfig,
) -> (Vec<Record>, Vec<ExclusionRecord>) {
    let required = config.required_fields();
    let pattern = config.part_number_regex();

    let mut accepted = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();

    for record in records {
        if record.is_blank() {
            excluded.push(ExclusionRecord {
                record,
                reason: "empty row".into(),
            });
            continue;
        }

        let cleaned = clean_record(&record, &config.cleaning);

        let missing: Vec<&str> = required
            .iter()
            .filter(|name| cleaned.get(name).map_or(true, Scalar::is_empty))
            .copied()
            .collect();
        if !missing.is_empty() {
            let reason = if missing.len() == 1 {
                format!("missing required field: {}", missing[0])
            } else {
                format!("missing required fields: {}", missing.join(", "))
            };
            excluded.push(ExclusionRecord { record, reason });
            continue;
        }

        if let Some(ref re) = pattern {
            let part_number = cleaned
                .get(&config.key.part_number)
                .map(|v| v.to_string())
                .unwrap_or_default();
            if !re.is_match(&part_number) {
                excluded.push(ExclusionRecord {
                    record,
                    reason: format!("part number does not match pattern: {part_number}"),
                });
                continue;
            }
        }

        accepted.push(cleaned);
    }

    (accepted, excluded)
}

/// Apply the text-cleaning rules to every text field of a record.
/// Numbers and empty cells pass through; text that cleans down to nothing
/// becomes an empty cell.
pub fn clean_record(record: &Record, rules: &CleaningRules) -> Record {
    let fields = record
        .fields()
        .iter()
        .map(|(name, value)| {
            let cleaned = match value {
                Scalar::Text(s) => {
                    let uppercase = rules.uppercase_fields.iter().any(|f| f == name);
                    let text = clean_text(s, uppercase, rules);
                    if text.is_empty() {
                        Scalar::Empty
                    } else {
                        Scalar::Text(text)
                    }
                }
                other => other.clone(),
            };
            (name.clone(), cleaned)
        })
        .collect();
    Record::from_pairs(fields)
}

/// Trim, optionally strip non-ASCII, collapse whitespace runs, upper-case.
/// Idempotent: cleaning a cleaned value changes nothing.
pub fn clean_text(raw: &str, uppercase: bool, rules: &CleaningRules) -> String {
    let mut text = raw.to_string();
    if rules.remove_non_ascii {
        text.retain(|c| c.is_ascii());
    }
    let text = if rules.normalize_spaces {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        text.trim().to_string()
    };
    if uppercase {
        text.to_uppercase()
    } else {
        text
    }
}
