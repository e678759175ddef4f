// ── Token persistence backends ──
//
// On-disk and keyring implementations of `dsmon_api::TokenStore`. The
// in-memory backend lives in the API crate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dsmon_api::{Error as ApiError, MemoryTokenStore, TokenStore};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::data_dir;

/// Keyring service name for persisted tokens.
pub const KEYRING_SERVICE: &str = "dsmon";

/// Where a profile's bearer token is persisted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenBackend {
    /// Process lifetime only.
    Memory,
    #[default]
    File,
    Keyring,
}

/// Build the persistence backend for a profile.
pub fn token_store_for(profile_name: &str, backend: TokenBackend) -> Arc<dyn TokenStore> {
    match backend {
        TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        TokenBackend::File => Arc::new(FileTokenStore::for_profile(profile_name)),
        TokenBackend::Keyring => Arc::new(KeyringTokenStore::new(profile_name)),
    }
}

// ── File backend ────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// A small TOML file with a single `token` key.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/tokens/<profile>.toml`
    pub fn for_profile(profile_name: &str) -> Self {
        Self::new(data_dir().join("tokens").join(format!("{profile_name}.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_err(context: &str, err: impl std::fmt::Display) -> ApiError {
    ApiError::TokenStore(format!("{context}: {err}"))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ApiError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err("reading token file", e)),
        };
        let file: TokenFile = toml::from_str(&raw).map_err(|e| store_err("parsing token file", e))?;
        Ok(file
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    fn save(&self, token: &SecretString) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| store_err("creating token dir", e))?;
        }
        let body = toml::to_string(&TokenFile {
            token: Some(token.expose_secret().to_owned()),
        })
        .map_err(|e| store_err("encoding token file", e))?;
        std::fs::write(&self.path, body).map_err(|e| store_err("writing token file", e))?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    fn remove(&self) -> Result<(), ApiError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_err("removing token file", e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ApiError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| store_err("setting token file permissions", e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ApiError> {
    Ok(())
}

// ── Keyring backend ─────────────────────────────────────────────────

/// OS keyring entry `dsmon` / `<profile>/token`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("{profile_name}/token"),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry, ApiError> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account).map_err(|e| store_err("keyring", e))
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ApiError> {
        match self.entry()?.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(store_err("keyring read", e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), ApiError> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(|e| store_err("keyring write", e))
    }

    fn remove(&self) -> Result<(), ApiError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(store_err("keyring delete", e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("default.toml"));

        assert!(store.load().unwrap().is_none());

        store.save(&SecretString::from("abc".to_owned())).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "abc");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "token = \"abc\"");

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
        store.remove().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("t.toml"));
        store.save(&SecretString::from("abc".to_owned())).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.toml");
        std::fs::write(&path, "token = [").unwrap();
        let err = FileTokenStore::new(path).load().unwrap_err();
        assert!(matches!(err, ApiError::TokenStore(_)));
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.toml");
        std::fs::write(&path, "token = \"\"\n").unwrap();
        assert!(FileTokenStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn keyring_account_is_per_profile() {
        assert_eq!(KeyringTokenStore::new("lab").account(), "lab/token");
    }

    #[test]
    fn backend_names() {
        assert_eq!("keyring".parse::<TokenBackend>().unwrap(), TokenBackend::Keyring);
        assert_eq!(TokenBackend::default().to_string(), "file");
    }
}
