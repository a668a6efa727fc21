use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconcileConfig {
    pub name: String,
    /// Input batch location. Consumed by the CLI, not the engine.
    #[serde(default)]
    pub input: Option<SourceConfig>,
    /// Master dataset location. Consumed by the CLI, not the engine.
    #[serde(default)]
    pub master: Option<MasterConfig>,
    #[serde(default)]
    pub key: KeyFields,
    #[serde(default)]
    pub cleaning: CleaningRules,
    #[serde(default = "default_valid_statuses")]
    pub valid_statuses: Vec<String>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_valid_statuses() -> Vec<String> {
    vec!["X".into(), "D".into(), "0".into()]
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterConfig {
    pub file: String,
    #[serde(default)]
    pub sheet: Option<String>,
    /// Copy the master file aside before the updated master is written.
    #[serde(default)]
    pub backup: bool,
}

// ---------------------------------------------------------------------------
// Key mapping
// ---------------------------------------------------------------------------

/// Names of the composite-key columns and the status column, shared by the
/// input batch and the master dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyFields {
    #[serde(default = "default_part_number")]
    pub part_number: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_part_number() -> String {
    "PartNumber".into()
}

fn default_project() -> String {
    "Project".into()
}

fn default_status() -> String {
    "Status".into()
}

impl Default for KeyFields {
    fn default() -> Self {
        Self {
            part_number: default_part_number(),
            project: default_project(),
            status: default_status(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CleaningRules {
    /// Fields that must be non-empty after trimming. Empty list means the
    /// two key fields.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Text fields upper-cased during cleaning.
    #[serde(default)]
    pub uppercase_fields: Vec<String>,
    #[serde(default = "default_true")]
    pub remove_non_ascii: bool,
    #[serde(default = "default_true")]
    pub normalize_spaces: bool,
    /// Optional regex an accepted part number must match.
    #[serde(default)]
    pub part_number_pattern: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            uppercase_fields: Vec::new(),
            remove_non_ascii: true,
            normalize_spaces: true,
            part_number_pattern: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Artifact directory, resolved relative to the config file.
    #[serde(default)]
    pub dir: Option<String>,
    /// Optional JSON result path.
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconcileConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: ReconcileConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::ConfigValidation("name must not be empty".into()));
        }

        for (label, field) in [
            ("key.part_number", &self.key.part_number),
            ("key.project", &self.key.project),
            ("key.status", &self.key.status),
        ] {
            if field.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "{label} must not be empty"
                )));
            }
        }

        if self.key.part_number == self.key.project {
            return Err(EngineError::ConfigValidation(
                "key.part_number and key.project must name different columns".into(),
            ));
        }
        if self.key.status == self.key.part_number || self.key.status == self.key.project {
            return Err(EngineError::ConfigValidation(
                "key.status must not be one of the key columns".into(),
            ));
        }

        if self.valid_statuses.is_empty() {
            return Err(EngineError::ConfigValidation(
                "valid_statuses must not be empty".into(),
            ));
        }

        if let Some(ref pattern) = self.cleaning.part_number_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                EngineError::ConfigValidation(format!(
                    "cleaning.part_number_pattern is not a valid regex: {e}"
                ))
            })?;
        }

        Ok(())
    }

    /// Fields required to be non-empty: the configured list, or the two key
    /// fields when no list was given.
    pub fn required_fields(&self) -> Vec<&str> {
        if self.cleaning.required_fields.is_empty() {
            vec![self.key.part_number.as_str(), self.key.project.as_str()]
        } else {
            self.cleaning
                .required_fields
                .iter()
                .map(String::as_str)
                .collect()
        }
    }

    /// Compiled part-number pattern, if one was configured.
    /// `validate()` has already rejected invalid patterns.
    pub fn part_number_regex(&self) -> Option<regex::Regex> {
        self.cleaning
            .part_number_pattern
            .as_deref()
            .and_then(|p| regex::Regex::new(p).ok())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Weekly EDI batch"

[input]
file = "incoming.xlsx"

[master]
file = "Master_BOM.xlsx"
backup = true

[key]
part_number = "PN"
project     = "Project"
status      = "Status"

[cleaning]
uppercase_fields = ["PN", "Project"]
remove_non_ascii = true
normalize_spaces = true

[output]
dir = "output"
"#;

    #[test]
    fn parse_valid() {
        let config = ReconcileConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Weekly EDI batch");
        assert_eq!(config.key.part_number, "PN");
        assert_eq!(config.key.status, "Status");
        assert_eq!(config.valid_statuses, vec!["X", "D", "0"]);
        assert!(config.master.as_ref().unwrap().backup);
        assert_eq!(config.output.dir.as_deref(), Some("output"));
        // No explicit required_fields → the key fields.
        assert_eq!(config.required_fields(), vec!["PN", "Project"]);
    }

    #[test]
    fn defaults_without_sections() {
        let config = ReconcileConfig::from_toml(r#"name = "Minimal""#).unwrap();
        assert_eq!(config.key.part_number, "PartNumber");
        assert_eq!(config.key.project, "Project");
        assert_eq!(config.key.status, "Status");
        assert!(config.cleaning.remove_non_ascii);
        assert!(config.cleaning.normalize_spaces);
        assert!(config.cleaning.uppercase_fields.is_empty());
        assert!(config.input.is_none());
        assert!(config.part_number_regex().is_none());
    }

    #[test]
    fn explicit_required_fields_win() {
        let input = r#"
name = "Custom required"

[cleaning]
required_fields = ["PartNumber", "Project", "Supplier"]
"#;
        let config = ReconcileConfig::from_toml(input).unwrap();
        assert_eq!(
            config.required_fields(),
            vec!["PartNumber", "Project", "Supplier"]
        );
    }

    #[test]
    fn reject_empty_name() {
        let err = ReconcileConfig::from_toml(r#"name = "  ""#).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn reject_key_collision() {
        let input = r#"
name = "Bad"

[key]
part_number = "PN"
project     = "PN"
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("different columns"));
    }

    #[test]
    fn reject_status_named_like_key() {
        let input = r#"
name = "Bad"

[key]
part_number = "PN"
project     = "Project"
status      = "PN"
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("key.status"));
    }

    #[test]
    fn reject_empty_statuses() {
        let input = r#"
name = "Bad"
valid_statuses = []
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("valid_statuses"));
    }

    #[test]
    fn reject_bad_pattern() {
        let input = r#"
name = "Bad"

[cleaning]
part_number_pattern = "["
"#;
        let err = ReconcileConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("part_number_pattern"));
    }

    #[test]
    fn pattern_compiles() {
        let input = r#"
name = "Patterned"

[cleaning]
part_number_pattern = "^[A-Z0-9_-]+$"
"#;
        let config = ReconcileConfig::from_toml(input).unwrap();
        let re = config.part_number_regex().unwrap();
        assert!(re.is_match("PN-100"));
        assert!(!re.is_match("pn 100"));
    }
}
