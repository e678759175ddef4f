use crate::client::{ApiClient, METRICS_PATH, RequestOptions};
use crate::error::Error;
use crate::models::MetricRecord;

impl ApiClient {
    /// `GET /api/v1/metrics`: the full metrics sequence.
    pub async fn fetch_metrics(&self) -> Result<Vec<MetricRecord>, Error> {
        Ok(self
            .get(METRICS_PATH, &RequestOptions::default())
            .await?
            .into_data())
    }
}
