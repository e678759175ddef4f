// ── Core error types ──
//
// API failures pass through untouched so callers can still inspect the
// status code or transport cause. Everything else here is about the
// dashboard's own settings.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The request to the backend failed. Carries the client error as-is.
    #[error(transparent)]
    Api(#[from] dsmon_api::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The underlying client error, if this came from a request.
    pub fn as_api(&self) -> Option<&dsmon_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            Self::Config { .. } => None,
        }
    }
}
