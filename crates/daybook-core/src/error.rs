use thiserror::Error;

/// Top-level error type for the Daybook system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and convert into `DaybookError` so that the `?`
/// operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DaybookError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DaybookError {
    fn from(err: toml::de::Error) -> Self {
        DaybookError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DaybookError {
    fn from(err: toml::ser::Error) -> Self {
        DaybookError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DaybookError {
    fn from(err: serde_json::Error) -> Self {
        DaybookError::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DaybookError>;
