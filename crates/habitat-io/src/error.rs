use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported layout schema version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unknown environment profile '{0}'")]
    UnknownEnvironment(String),
}

/// A problem with catalog or global-parameter input. Row-level errors are
/// collected and the row skipped; only an unreadable document aborts a load.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog document must be an object with 'modules' and 'globals'")]
    InvalidDocument,

    #[error("Module row {index} skipped: {reason}")]
    MalformedRow { index: usize, reason: String },

    #[error("Unknown global parameter '{0}'")]
    UnknownGlobal(String),

    #[error("Global parameter '{key}' rejected: {reason}")]
    WrongGlobalType { key: String, reason: String },
}
