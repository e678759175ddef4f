// Unauthenticated service endpoints.

use crate::client::{ApiClient, RequestOptions};
use crate::error::Error;
use crate::models::{HealthStatus, VersionInfo};

impl ApiClient {
    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        Ok(self
            .get("/health", &RequestOptions::default())
            .await?
            .into_data())
    }

    /// `GET /version`: build information of the backend.
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        Ok(self
            .get("/version", &RequestOptions::default())
            .await?
            .into_data())
    }
}
