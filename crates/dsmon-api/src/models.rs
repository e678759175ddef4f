// Wire types for the monitoring backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One entry of the metrics sequence.
///
/// The record shape belongs to the backend, so the JSON object is kept
/// verbatim. `name` / `value` are convenience lookups for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRecord(pub Value);

impl MetricRecord {
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn value(&self) -> Option<&Value> {
        self.0.get("value")
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for MetricRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// `GET /authorization` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationResponse {
    pub authorization: String,
}

/// `GET /health` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub health: bool,
}

/// `GET /version` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub commit_hash: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub signature: String,
}

/// `POST /api/v1/data` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedData {
    pub id: Uuid,
}
