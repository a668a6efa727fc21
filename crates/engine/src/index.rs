use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::{CleaningRules, KeyFields};
use crate::model::{MasterEntry, Record, Scalar};
use crate::normalize::clean_text;

/// Normalized (part number, project) composite key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub part_number: String,
    pub project: String,
}

/// Lookup structure over the master dataset.
///
/// Holds indices into the master Vec rather than references, so the engine
/// can mutate the entry an index points to while later lookups in the same
/// run still reach the mutated row.
#[derive(Debug)]
pub struct MatchIndex {
    map: HashMap<MatchKey, usize>,
    /// Master rows whose key collided with an earlier row. The earlier row
    /// wins every lookup; the later rows stay in the persisted master.
    pub duplicate_keys: usize,
}

impl MatchIndex {
    /// Build the index in master order. First entry per key wins.
    pub fn build(master: &[MasterEntry], key: &KeyFields, rules: &CleaningRules) -> Self {
        let mut map = HashMap::with_capacity(master.len());
        let mut duplicate_keys = 0;

        for (idx, master_entry) in master.iter().enumerate() {
            let Some(match_key) = record_key(&master_entry.record, key, rules) else {
                // Rows without a usable key can never match an input row.
                continue;
            };
            match map.entry(match_key) {
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
                Entry::Occupied(_) => duplicate_keys += 1,
            }
        }

        Self { map, duplicate_keys }
    }

    /// Pure read: index of the first master entry matching the record's key.
    pub fn lookup(&self, record: &Record, key: &KeyFields, rules: &CleaningRules) -> Option<usize> {
        let match_key = record_key(record, key, rules)?;
        self.map.get(&match_key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Key of a record under the same trim/case rules the normalizer applies,
/// so matching tolerates incidental drift on either side.
fn record_key(record: &Record, key: &KeyFields, rules: &CleaningRules) -> Option<MatchKey> {
    let part_number = key_component(record.get(&key.part_number)?, &key.part_number, rules)?;
    let project = key_component(record.get(&key.project)?, &key.project, rules)?;
    Some(MatchKey {
        part_number,
        project,
    })
}

fn key_component(value: &Scalar, field: &str, rules: &CleaningRules) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let uppercase = rules.uppercase_fields.iter().any(|f| f == field);
    let text = clean_text(&value.to_string(), uppercase, rules);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
