use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The identity segment has a hyphen count other than 1 or 2. The monitored layout changed
    /// and must be investigated; the run stops here.
    #[error(
        "Invalid build job or deployment '{identity_key}' ({hyphens} hyphens) in '{path}' on {host}"
    )]
    ClassificationIntegrity {
        identity_key: String,
        path: String,
        host: String,
        hyphens: usize,
    },

    #[error(
        "Identity '{identity_key}' seen under '{conflicting}' but first recorded under '{first}'"
    )]
    InconsistentWorkspacePath {
        identity_key: String,
        first: String,
        conflicting: String,
    },

    #[error("Malformed log file name '{}': {reason}", .path.display())]
    MalformedLogFileName { path: PathBuf, reason: String },

    #[error("No log files found in '{}'", .dir.display())]
    NoLogFiles { dir: PathBuf },

    #[error("Input directory '{}' not found, {hint}", .dir.display())]
    MissingInputDir { dir: PathBuf, hint: String },

    #[error("Event dump not found at '{}', {hint}", .path.display())]
    MissingEventDump { path: PathBuf, hint: String },

    #[error("Log read task failed: {0}")]
    ReadTask(String),
}

impl AuditError {
    /// Errors caused by the run's inputs or settings rather than by log contents.
    pub fn is_configuration_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::ConfigParse(_)
                | Self::MalformedLogFileName { .. }
                | Self::NoLogFiles { .. }
                | Self::MissingInputDir { .. }
                | Self::MissingEventDump { .. }
        )
    }

    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::ClassificationIntegrity { .. } | Self::InconsistentWorkspacePath { .. }
        )
    }
}
