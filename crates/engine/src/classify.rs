use crate::config::KeyFields;
use crate::model::{MasterEntry, Outcome, Record, Scalar, ACTION_FIELD, NOTES_FIELD};

/// Classify one accepted record against its matched master entry (or the
/// absence of one), annotate the record, and apply the master mutation.
///
/// The status decision table:
///
/// | Matched status | Outcome       | Action    | Master mutation |
/// |----------------|---------------|-----------|-----------------|
/// | `D`            | UpdatedMaster | Updated   | status → `X`    |
/// | numeric zero   | FlagDuplicate | Duplicate | none            |
/// | no match       | FlagNew       | New       | none            |
/// | `X`            | Skipped       | Ignored   | none            |
/// | anything else  | Skipped       | Ignored   | none            |
///
/// The final arm is a designed catch-all for dirty reference data, not an
/// error path.
pub fn classify(record: &mut Record, matched: Option<&mut MasterEntry>, key: &KeyFields) -> Outcome {
    let Some(master_entry) = matched else {
        annotate(record, "New", "Potential new component");
        return Outcome::FlagNew;
    };

    match status_code(master_entry.field(&key.status)) {
        StatusCode::Deprecated => {
            master_entry.record.set(&key.status, Scalar::text("X"));
            enrich(record, master_entry, key);
            annotate(record, "Updated", "Deprecated component marked obsolete");
            Outcome::UpdatedMaster
        }
        StatusCode::Duplicate => {
            enrich(record, master_entry, key);
            annotate(record, "Duplicate", "Requires manual verification");
            Outcome::FlagDuplicate
        }
        StatusCode::Obsolete => {
            enrich(record, master_entry, key);
            annotate(record, "Ignored", "Already marked obsolete");
            Outcome::Skipped
        }
        StatusCode::Other(raw) => {
            enrich(record, master_entry, key);
            annotate(record, "Ignored", format!("Unrecognized status: {raw}"));
            Outcome::Skipped
        }
    }
}

enum StatusCode {
    Deprecated,
    Duplicate,
    Obsolete,
    Other(String),
}

/// Read a status cell into a code. Letters compare case-insensitively after
/// trimming; a literal `NAN` (an Excel-export artifact) reads as blank; any
/// value that parses to exactly zero is the duplicate marker.
fn status_code(value: Option<&Scalar>) -> StatusCode {
    let raw = value.map(|v| v.to_string()).unwrap_or_default();
    let trimmed = raw.trim();
    let cleaned = if trimmed.eq_ignore_ascii_case("nan") {
        ""
    } else {
        trimmed
    };

    if cleaned.eq_ignore_ascii_case("d") {
        return StatusCode::Deprecated;
    }
    if cleaned.eq_ignore_ascii_case("x") {
        return StatusCode::Obsolete;
    }
    if let Ok(n) = cleaned.parse::<f64>() {
        if n == 0.0 {
            return StatusCode::Duplicate;
        }
    }
    StatusCode::Other(cleaned.to_string())
}

/// Copy the master's descriptive fields onto the record: everything except
/// the key columns and the status column. Same-named fields are overwritten;
/// fields only the record has are left alone.
fn enrich(record: &mut Record, master_entry: &MasterEntry, key: &KeyFields) {
    for (name, value) in master_entry.record.fields() {
        if *name == key.part_number || *name == key.project || *name == key.status {
            continue;
        }
        record.set(name, value.clone());
    }
}

fn annotate(record: &mut Record, action: &str, notes: impl Into<String>) {
    record.set(ACTION_FIELD, Scalar::text(action));
    record.set(NOTES_FIELD, Scalar::text(notes.into()));
}
