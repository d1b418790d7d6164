//! Error taxonomy.
//!
//! Only configuration problems surface as errors. Degenerate geometry is
//! recovered inside the force calculations and unplaceable extra obstacles
//! are dropped, so a tick itself never fails.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no scenario config files found in {dir}")]
    NoScenarioConfigs { dir: PathBuf },
    #[error("scenario '{id}' is invalid: {reason}")]
    InvalidTemplate { id: String, reason: String },
    #[error("unknown scenario '{id}'. Available: {}", available.join(", "))]
    UnknownScenario { id: String, available: Vec<String> },
    #[error("unknown control mode '{0}' (expected manual, naive, random or potential-field)")]
    UnknownControlMode(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidSetting { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, SimError>;
