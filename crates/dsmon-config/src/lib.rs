//! Shared configuration for the dsmon CLI.
//!
//! TOML profiles layered with environment overrides, token persistence
//! backends, and translation to `dsmon_api::ClientConfig` and
//! `dsmon_core::DashboardConfig`.

mod token_store;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use dsmon_api::{ClientConfig, CredentialScope, DATA_BASE_PATH, TlsMode, TransportConfig};
use dsmon_core::{DashboardConfig, FetchOrdering};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use token_store::{
    FileTokenStore, KEYRING_SERVICE, KeyringTokenStore, TokenBackend, token_store_for,
};

/// Prefix for environment overrides. Nested keys use `__`,
/// e.g. `DSMON_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "DSMON_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use: explicit choice, else `default_profile`,
    /// else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub token_backend: TokenBackend,

    #[serde(default)]
    pub credential_scope: CredentialScope,

    /// Clock refresh period, e.g. `"1s"`.
    #[serde(default = "default_clock_interval")]
    pub clock_interval: String,

    /// Metrics poll period, e.g. `"5s"`.
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval: String,

    #[serde(default)]
    pub fetch_ordering: FetchOrdering,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: None,
            token_backend: TokenBackend::default(),
            credential_scope: CredentialScope::default(),
            clock_interval: default_clock_interval(),
            metrics_interval: default_metrics_interval(),
            fetch_ordering: FetchOrdering::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_clock_interval() -> String {
    "1s".into()
}
fn default_metrics_interval() -> String {
    "5s".into()
}

/// A named backend profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend origin (e.g. `"http://localhost:8080"`).
    pub server: String,

    /// Root for relative data paths. Defaults to `/api/v1/data/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_backend: Option<TokenBackend>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_scope: Option<CredentialScope>,

    /// Environment variable holding a bearer token. Wins over the
    /// persisted token when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Path to a custom CA certificate (PEM).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn token_backend(&self, defaults: &Defaults) -> TokenBackend {
        self.token_backend.unwrap_or(defaults.token_backend)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dsmon", "dsmon")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "dsmon", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for persisted tokens and other local state.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "dsmon"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path` (if it exists) and `DSMON_*`
/// environment overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile, falling back to `defaults`.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let server: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = profile
        .timeout
        .or(defaults.timeout)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    Ok(ClientConfig {
        server,
        data_path: profile
            .data_path
            .clone()
            .unwrap_or_else(|| DATA_BASE_PATH.to_owned()),
        credential_scope: profile.credential_scope.unwrap_or(defaults.credential_scope),
        transport: TransportConfig {
            tls,
            timeout,
            ..TransportConfig::default()
        },
    })
}

/// Build the dashboard cadence from `defaults`.
pub fn dashboard_config(defaults: &Defaults) -> Result<DashboardConfig, ConfigError> {
    let config = DashboardConfig {
        clock_interval: parse_interval("clock_interval", &defaults.clock_interval)?,
        metrics_interval: parse_interval("metrics_interval", &defaults.metrics_interval)?,
        ordering: defaults.fetch_ordering,
    };
    config.validate().map_err(|e| ConfigError::Validation {
        field: "defaults".into(),
        reason: e.to_string(),
    })?;
    Ok(config)
}

fn parse_interval(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{raw}': {e}"),
    })
}
