use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad key mapping, bad pattern, etc.).
    ConfigValidation(String),
    /// Master dataset has no rows — nothing to validate columns against.
    EmptyMaster,
    /// A required column is absent from every row of a dataset.
    MissingColumn { dataset: String, column: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EmptyMaster => write!(f, "master dataset is empty"),
            Self::MissingColumn { dataset, column } => {
                write!(f, "{dataset} dataset: missing column '{column}'")
            }
        }
    }
}

impl std::error::Error for EngineError {}
