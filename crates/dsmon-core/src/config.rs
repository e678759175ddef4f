// ── Dashboard runtime configuration ──
//
// Refresh cadence and fetch policy. Built by the CLI from the config
// file; never touches disk itself.

use std::time::Duration;

use crate::error::CoreError;
use crate::store::FetchOrdering;

/// How often the dashboard refreshes its stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub clock_interval: Duration,
    pub metrics_interval: Duration,
    pub ordering: FetchOrdering,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            clock_interval: Duration::from_secs(1),
            metrics_interval: Duration::from_secs(5),
            ordering: FetchOrdering::default(),
        }
    }
}

impl DashboardConfig {
    /// Reject settings the refresh loops cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.clock_interval.is_zero() {
            return Err(CoreError::Config {
                message: "clock interval must be greater than zero".into(),
            });
        }
        if self.metrics_interval.is_zero() {
            return Err(CoreError::Config {
                message: "metrics interval must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
