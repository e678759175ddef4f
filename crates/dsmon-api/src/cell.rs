// ── Lazily constructed shared client ──
//
// One `ClientCell` per process hands out the same `Arc<ApiClient>` to
// every caller. The cell is passed around explicitly rather than living
// in a static, so tests can build as many isolated cells as they like.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::client::{ApiClient, ClientConfig};
use crate::error::Error;
use crate::token::TokenStore;

/// Get-or-create holder for the process-wide [`ApiClient`].
///
/// The first [`get_instance`](Self::get_instance) builds the client and
/// reads the persisted credential; every later call (including concurrent
/// first calls) returns the same instance without touching the token
/// store again. A failed construction leaves the cell empty so the next
/// call retries.
pub struct ClientCell {
    config: ClientConfig,
    token_store: Arc<dyn TokenStore>,
    instance: OnceCell<Arc<ApiClient>>,
}

impl ClientCell {
    pub fn new(config: ClientConfig, token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            token_store,
            instance: OnceCell::new(),
        }
    }

    pub async fn get_instance(&self) -> Result<Arc<ApiClient>, Error> {
        let client = self
            .instance
            .get_or_try_init(|| async {
                debug!("constructing shared api client");
                ApiClient::new(&self.config, self.token_store.as_ref()).map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(client))
    }

    /// The instance, if it has been constructed already.
    pub fn get(&self) -> Option<Arc<ApiClient>> {
        self.instance.get().cloned()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The persistence backend the instance loads its credential from.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }
}
