// Persisted credential storage.
//
// The client reads the persisted token once, at construction. Writing is
// explicit: `ApiClient::set_token` only changes the in-memory credential.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Backend holding the bearer token across process restarts.
///
/// Absence is a valid state: `load` returns `Ok(None)` when nothing has
/// been stored, and `remove` on an empty store succeeds.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SecretString>, Error>;

    fn save(&self, token: &SecretString) -> Result<(), Error>;

    fn remove(&self) -> Result<(), Error>;
}

/// Process-local token store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: ArcSwapOption<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: ArcSwapOption::new(Some(Arc::new(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        Ok(self
            .slot
            .load_full()
            .map(|t| SecretString::from(t.as_str().to_owned())))
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        self.slot
            .store(Some(Arc::new(token.expose_secret().to_owned())));
        Ok(())
    }

    fn remove(&self) -> Result<(), Error> {
        self.slot.store(None);
        Ok(())
    }
}
