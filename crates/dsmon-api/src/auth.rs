use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::Method;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// Which requests carry the bearer credential.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CredentialScope {
    /// `Authorization` on every verb.
    #[default]
    AllRequests,
    /// `Authorization` on POST only. Matches older dashboards that only
    /// configured the header on the POST defaults.
    PostOnly,
}

impl CredentialScope {
    /// Whether a request with this method should carry the credential.
    pub fn applies_to(self, method: &Method) -> bool {
        match self {
            Self::AllRequests => true,
            Self::PostOnly => method == Method::POST,
        }
    }
}

/// The in-memory bearer credential of one client instance.
///
/// Readers see either the old or the new token, never a torn value:
/// `set` and `unset` swap a whole `Arc` atomically. There is exactly one
/// credential per instance; callers that need two identities need two
/// clients.
#[derive(Debug)]
pub struct Credential {
    current: ArcSwapOption<SecretString>,
}

impl Credential {
    pub fn new(initial: Option<SecretString>) -> Self {
        Self {
            current: ArcSwapOption::new(initial.map(Arc::new)),
        }
    }

    /// Replace the credential. Any non-empty string is accepted verbatim.
    pub fn set(&self, token: SecretString) -> Result<(), Error> {
        if token.expose_secret().is_empty() {
            return Err(Error::EmptyToken);
        }
        self.current.store(Some(Arc::new(token)));
        Ok(())
    }

    /// Drop the credential; later requests go out unauthenticated.
    pub fn unset(&self) {
        self.current.store(None);
    }

    pub fn get(&self) -> Option<Arc<SecretString>> {
        self.current.load_full()
    }

    pub fn is_set(&self) -> bool {
        self.current.load().is_some()
    }

    /// `Authorization: Bearer <token>` for the current credential, if any.
    pub(crate) fn bearer_header(&self) -> Result<Option<HeaderValue>, Error> {
        let Some(token) = self.get() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidHeader {
                name: "Authorization",
                reason: e.to_string(),
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new(None)
    }
}
