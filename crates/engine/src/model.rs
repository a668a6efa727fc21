use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// A single cell value as it arrives from a spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Empty,
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Empty, or text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            // Integral numbers render without a trailing ".0" so numeric
            // part numbers compare cleanly against their text form.
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Empty => Ok(()),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Empty => serializer.serialize_unit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single row: ordered field-name → value mapping.
///
/// Field order is part of the contract — output columns follow input column
/// order, with annotation columns appended at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(String, Scalar)>) -> Self {
        Self { fields: pairs }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Overwrite an existing field in place, or append a new one.
    pub fn set(&mut self, name: &str, value: Scalar) {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    pub fn fields(&self) -> &[(String, Scalar)] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    /// True when every value is empty (a row of blank cells counts).
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A row of the master dataset. Same shape as an input record; the engine
/// reads its key and status fields through the configured field names.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterEntry {
    pub record: Record,
}

impl MasterEntry {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn field(&self, name: &str) -> Option<&Scalar> {
        self.record.get(name)
    }
}

impl Serialize for MasterEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.record.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Annotation field appended to every accepted record.
pub const ACTION_FIELD: &str = "Action";
/// Annotation field appended to every accepted record.
pub const NOTES_FIELD: &str = "Notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    UpdatedMaster,
    FlagDuplicate,
    FlagNew,
    Skipped,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdatedMaster => write!(f, "updated_master"),
            Self::FlagDuplicate => write!(f, "flag_duplicate"),
            Self::FlagNew => write!(f, "flag_new"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// A row the normalizer refused, with the reason it was refused.
/// Only the normalizer produces these — classification never excludes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExclusionRecord {
    pub record: Record,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RunSummary {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub excluded_rows: usize,
    pub updated_master: usize,
    pub flagged_duplicate: usize,
    pub flagged_new: usize,
    pub skipped: usize,
    /// Master rows whose key collided with an earlier row (first match wins).
    pub duplicate_master_keys: usize,
    pub outcome_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    /// Accepted records, input order, annotated with Action/Notes.
    pub accepted: Vec<Record>,
    /// Working copy of the master, original order, mutations applied.
    pub updated_master: Vec<MasterEntry>,
    /// Rows the normalizer refused, input order.
    pub excluded: Vec<ExclusionRecord>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
