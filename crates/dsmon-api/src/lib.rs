// dsmon-api: async client for the dataStore monitoring backend
//
// One shared `ApiClient` per process (handed out by `ClientCell`) carries
// the default headers and the bearer credential for every request.

pub mod auth;
pub mod cell;
pub mod client;
mod endpoints;
pub mod error;
pub mod models;
pub mod token;
pub mod transport;

pub use auth::{Credential, CredentialScope};
pub use cell::ClientCell;
pub use client::{
    ApiClient, ApiResponse, ClientConfig, DATA_BASE_PATH, METRICS_PATH, RequestOptions,
};
pub use endpoints::AUTHORIZATION_PATH;
pub use error::Error;
pub use models::{AuthorizationResponse, CreatedData, HealthStatus, MetricRecord, VersionInfo};
pub use token::{MemoryTokenStore, TokenStore};
pub use transport::{TlsMode, TransportConfig};
