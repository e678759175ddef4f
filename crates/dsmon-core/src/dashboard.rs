// ── Dashboard ──
//
// Owns the clock and metrics stores and the background tasks that keep
// them fresh. Cheaply cloneable; all clones share the same stores.

use std::sync::Arc;
use std::time::Duration;

use dsmon_api::ApiClient;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::store::{ClockStore, FetchOutcome, MetricsStore};

#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    clock: ClockStore,
    metrics: MetricsStore,
    cancel: CancellationToken,
    /// Child token for the current run. Replaced on every `start()` so the
    /// dashboard can be restarted after `shutdown()`.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    pub fn new(client: Arc<ApiClient>, config: DashboardConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let metrics = MetricsStore::with_ordering(client, config.ordering);

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                clock: ClockStore::new(),
                metrics,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Spawn the clock ticker and the metrics poller.
    ///
    /// Both tick immediately, so the first metrics request goes out right
    /// away. Calling `start()` on a running dashboard is a no-op.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("dashboard already running");
            return;
        }

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let dash = self.clone();
        let period = self.inner.config.clock_interval;
        handles.push(tokio::spawn(clock_task(dash, period, child.clone())));

        let dash = self.clone();
        let period = self.inner.config.metrics_interval;
        handles.push(tokio::spawn(metrics_task(dash, period, child)));

        info!(
            clock = ?self.inner.config.clock_interval,
            metrics = ?self.inner.config.metrics_interval,
            "dashboard started"
        );
    }

    /// Update the clock and fetch metrics once, right now.
    pub async fn refresh_now(&self) -> Result<FetchOutcome, CoreError> {
        self.inner.clock.update_time();
        self.inner.metrics.fetch_metrics().await
    }

    /// Stop the background tasks and wait for them to finish.
    ///
    /// A metrics request still in flight is abandoned.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "dashboard task ended abnormally");
            }
        }
        debug!("dashboard stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.inner.task_handles.lock().await.is_empty()
    }

    pub fn clock(&self) -> &ClockStore {
        &self.inner.clock
    }

    pub fn metrics(&self) -> &MetricsStore {
        &self.inner.metrics
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn clock_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                dashboard.clock().update_time();
            }
        }
    }
}

/// Poll failures are logged and the next tick tries again.
async fn metrics_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = dashboard.metrics().fetch_metrics() => match result {
                        Ok(FetchOutcome::Applied) => {
                            debug!(count = dashboard.metrics().snapshot().len(), "metrics refreshed");
                        }
                        Ok(FetchOutcome::Superseded) => debug!("stale metrics response dropped"),
                        Err(e) => warn!(error = %e, "metrics poll failed"),
                    },
                }
            }
        }
    }
}
