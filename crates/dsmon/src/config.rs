//! CLI configuration: thin wrapper around `dsmon_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --token, --insecure, --timeout, --no-persist).

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use dsmon_api::{ApiClient, ClientCell, TokenStore};
use dsmon_config::{
    Config, Profile, TokenBackend, config_path, profile_to_client_config, token_store_for,
};

use clap::ValueEnum;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Load the config file, or defaults when no file exists.
pub fn load() -> Result<Config, CliError> {
    Ok(dsmon_config::load_config()?)
}

/// Fill `--output` / `--color` from `[defaults]` when not given on the
/// command line or in the environment.
pub fn apply_output_defaults(global: &mut GlobalOpts) {
    if global.output.is_some() && global.color.is_some() {
        return;
    }
    let defaults = dsmon_config::load_config_or_default().defaults;
    if global.output.is_none() {
        global.output = parse_value::<OutputFormat>("output", &defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_value::<ColorMode>("color", &defaults.color);
    }
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    let parsed = T::from_str(raw.trim(), true).ok();
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "ignoring invalid config default");
    }
    parsed
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// The token backend for the active profile, honoring `--no-persist`.
pub fn token_backend(global: &GlobalOpts, config: &Config, profile_name: &str) -> TokenBackend {
    if global.no_persist {
        return TokenBackend::Memory;
    }
    config
        .profiles
        .get(profile_name)
        .map_or(config.defaults.token_backend, |p| {
            p.token_backend(&config.defaults)
        })
}

/// Everything a command needs to talk to the backend.
pub struct Session {
    pub profile_name: String,
    pub config: Config,
    pub backend: TokenBackend,
    pub token_store: Arc<dyn TokenStore>,
    pub cell: ClientCell,
}

impl Session {
    /// The shared client, with any `--token` / `token_env` override applied.
    pub async fn client(&self, global: &GlobalOpts) -> Result<Arc<ApiClient>, CliError> {
        let client = self.cell.get_instance().await?;
        if let Some(token) = token_override(global, self.config.profiles.get(&self.profile_name))
        {
            client.set_token(token.expose_secret())?;
        }
        Ok(client)
    }
}

/// Build a session from the config file, profile, and CLI overrides.
///
/// CLI flags take priority over profile values. Without a matching
/// profile, `--server` alone is enough.
pub fn session(global: &GlobalOpts) -> Result<Session, CliError> {
    let config = load()?;
    let profile_name = active_profile_name(global, &config);

    let mut profile = match (config.profiles.get(&profile_name), &global.server) {
        (Some(p), _) => p.clone(),
        (None, Some(server)) => Profile::new(server.clone()),
        (None, None) if global.profile.is_some() => {
            let mut names: Vec<_> = config.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    let client_config = profile_to_client_config(&profile, &config.defaults)?;
    let backend = token_backend(global, &config, &profile_name);
    let token_store = token_store_for(&profile_name, backend);
    let cell = ClientCell::new(client_config, Arc::clone(&token_store));

    tracing::debug!(profile = %profile_name, %backend, "session resolved");

    Ok(Session {
        profile_name,
        config,
        backend,
        token_store,
        cell,
    })
}

/// Token from `--token` / `DSMON_TOKEN`, else from the profile's `token_env`.
pub fn token_override(global: &GlobalOpts, profile: Option<&Profile>) -> Option<SecretString> {
    if let Some(ref token) = global.token {
        return Some(SecretString::from(token.clone()));
    }
    let env_name = profile?.token_env.as_ref()?;
    std::env::var(env_name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// The token store for the active profile, without requiring a server.
pub fn profile_token_store(
    global: &GlobalOpts,
) -> Result<(String, TokenBackend, Arc<dyn TokenStore>), CliError> {
    let config = load()?;
    let profile_name = active_profile_name(global, &config);
    let backend = token_backend(global, &config, &profile_name);
    let store = token_store_for(&profile_name, backend);
    Ok((profile_name, backend, store))
}
