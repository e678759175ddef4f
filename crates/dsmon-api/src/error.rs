use thiserror::Error;

/// Top-level error type for the `dsmon-api` crate.
///
/// The client is a pass-through: it never retries or reinterprets a failure.
/// Transport failures and non-success statuses are returned as-is so the
/// caller (a store action, the CLI) decides what to show.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or joining failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup failed while building the HTTP client.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A data resource key that is not a UUID.
    #[error("Invalid data key '{0}': expected a UUID")]
    InvalidDataKey(String),

    // ── Credentials ─────────────────────────────────────────────────
    /// `set_token` was called with an empty string.
    #[error("Bearer token must not be empty")]
    EmptyToken,

    /// A header (usually `Authorization`) could not be encoded.
    #[error("Invalid {name} header: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    /// The persisted credential backend failed.
    #[error("Token store error: {0}")]
    TokenStore(String),
}

impl Error {
    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for 401 / 403 responses.
    ///
    /// Informational only: nothing in this crate re-authenticates.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the request never reached the server.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Shorten a response body for error messages without splitting a char.
pub(crate) fn preview(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_owned()
    } else {
        let mut short: String = body.chars().take(MAX).collect();
        short.push('…');
        short
    }
}
