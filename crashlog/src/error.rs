use thiserror::Error;

use crate::severity::Severity;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("minSeverity ({min}) cannot be greater than minCrashSeverity ({crash})")]
    SeverityOrder { min: Severity, crash: Severity },
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),
    #[error("Invalid value for {var}: {value}")]
    InvalidFlag { var: String, value: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config directory not accessible")]
    ConfigDirError,
}
