//! CLI error types with miette diagnostics.
//!
//! Maps client, core and config errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use dsmon_api::Error as ApiError;
use dsmon_config::ConfigError;
use dsmon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(dsmon::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Try: dsmon health --server {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(dsmon::tls_error),
        help("Use --insecure (-k) to skip verification, or set ca_cert in your profile.")
    )]
    Tls { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(dsmon::timeout),
        help("Increase the limit with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not authorized (HTTP {status})")]
    #[diagnostic(
        code(dsmon::auth_failed),
        help(
            "The backend rejected the credentials.\n\
             Run: dsmon login --username <name>\n\
             Or pass a token with --token / DSMON_TOKEN."
        )
    )]
    AuthFailed { status: u16 },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(dsmon::not_found), help("Run: dsmon {list_command}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(dsmon::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response from backend: {message}")]
    #[diagnostic(code(dsmon::bad_response))]
    BadResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dsmon::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dsmon::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dsmon config init --server <url> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(dsmon::no_config),
        help(
            "Create a profile with: dsmon config init --server <url>\n\
             Or pass --server / DSMON_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dsmon::config))]
    Config(Box<ConfigError>),

    #[error("Token store failed: {message}")]
    #[diagnostic(
        code(dsmon::token_store),
        help("Use --no-persist to skip the token store for this run.")
    )]
    TokenStore { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(dsmon::json), help("Check the JSON document and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(dsmon::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        url: e.url().map_or_else(
                            || "<unknown>".into(),
                            |u| u.origin().ascii_serialization(),
                        ),
                        source: Box::new(e),
                    }
                } else {
                    Self::Api {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            ApiError::Status {
                status: status @ (401 | 403),
                ..
            } => Self::AuthFailed { status },
            ApiError::Status { status: 404, .. } => Self::NotFound {
                resource_type: "resource".into(),
                identifier: String::new(),
                list_command: "data list".into(),
            },
            ApiError::Status { status, body } => Self::Api {
                status,
                message: if body.is_empty() { "(empty body)".into() } else { body },
            },
            ApiError::Deserialization { message, .. } => Self::BadResponse { message },
            ApiError::InvalidDataKey(key) => Self::Validation {
                field: "id".into(),
                reason: format!("'{key}' is not a UUID"),
            },
            ApiError::EmptyToken => Self::Validation {
                field: "token".into(),
                reason: "token cannot be empty".into(),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            ApiError::InvalidHeader { name, reason } => Self::Validation {
                field: name.into(),
                reason,
            },
            ApiError::Tls(message) => Self::Tls { message },
            ApiError::TokenStore(message) => Self::TokenStore { message },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),
            CoreError::Config { message } => Self::Validation {
                field: "dashboard".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}
