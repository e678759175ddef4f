// ── Metrics store ──
//
// Holds the last metrics snapshot fetched from the backend. Every
// successful fetch replaces the whole sequence. Failed fetches leave the
// state alone and hand the error back to the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dsmon_api::{ApiClient, MetricRecord};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::stream::StoreStream;

/// How overlapping fetches resolve.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FetchOrdering {
    /// Whichever response arrives last is kept, even if it was issued first.
    #[default]
    CompletionOrder,
    /// Responses older than the newest applied one are discarded.
    LatestIssued,
}

/// Whether any fetch is currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the stored snapshot.
    Applied,
    /// A newer response had already been applied; this one was dropped.
    /// Only happens with [`FetchOrdering::LatestIssued`].
    Superseded,
}

pub struct MetricsStore {
    client: Arc<ApiClient>,
    ordering: FetchOrdering,
    records: watch::Sender<Arc<Vec<MetricRecord>>>,
    status: watch::Sender<FetchStatus>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    in_flight: AtomicUsize,
    /// Generation handed to the most recently issued fetch.
    issued: AtomicU64,
    /// Generation of the snapshot currently stored. Only touched while
    /// holding the `records` channel lock.
    applied: AtomicU64,
}

impl MetricsStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_ordering(client, FetchOrdering::default())
    }

    pub fn with_ordering(client: Arc<ApiClient>, ordering: FetchOrdering) -> Self {
        let (records, _) = watch::channel(Arc::new(Vec::new()));
        let (status, _) = watch::channel(FetchStatus::Idle);
        let (last_updated, _) = watch::channel(None);

        Self {
            client,
            ordering,
            records,
            status,
            last_updated,
            in_flight: AtomicUsize::new(0),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Fetch the metrics sequence and replace the stored snapshot.
    ///
    /// Overlapping calls are not deduplicated; each one issues its own
    /// request. On error the snapshot is untouched.
    pub async fn fetch_metrics(&self) -> Result<FetchOutcome, CoreError> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(self);

        let records = self.client.fetch_metrics().await.inspect_err(|e| {
            debug!(generation, error = %e, "metrics fetch failed");
        })?;

        let outcome = self.apply(generation, records);
        debug!(generation, ?outcome, "metrics fetch finished");
        Ok(outcome)
    }

    fn apply(&self, generation: u64, records: Vec<MetricRecord>) -> FetchOutcome {
        let ordering = self.ordering;
        let applied = self.records.send_if_modified(|current| {
            let newest = self.applied.load(Ordering::SeqCst);
            if ordering == FetchOrdering::LatestIssued && generation < newest {
                return false;
            }
            self.applied.store(generation, Ordering::SeqCst);
            *current = Arc::new(records);
            true
        });

        if applied {
            self.last_updated.send_replace(Some(Utc::now()));
            FetchOutcome::Applied
        } else {
            FetchOutcome::Superseded
        }
    }

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<MetricRecord>> {
        self.records.borrow().clone()
    }

    pub fn subscribe(&self) -> StoreStream<Arc<Vec<MetricRecord>>> {
        StoreStream::new(self.records.subscribe())
    }

    pub fn status(&self) -> FetchStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<FetchStatus> {
        self.status.subscribe()
    }

    /// When a snapshot was last applied. `None` until the first success.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.borrow()
    }

    pub fn ordering(&self) -> FetchOrdering {
        self.ordering
    }

    /// Adjust the in-flight counter and publish the derived status.
    ///
    /// The counter is changed inside the channel lock so status updates
    /// from concurrent fetches cannot interleave out of order.
    fn track_in_flight(&self, entering: bool) {
        self.status.send_if_modified(|status| {
            let count = if entering {
                self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
            } else {
                self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1
            };
            let next = if count > 0 {
                FetchStatus::Fetching
            } else {
                FetchStatus::Idle
            };
            if *status == next {
                false
            } else {
                *status = next;
                true
            }
        });
    }
}

/// Marks a fetch as in flight until dropped, also when the fetch future
/// is cancelled.
struct InFlight<'a> {
    store: &'a MetricsStore,
}

impl<'a> InFlight<'a> {
    fn enter(store: &'a MetricsStore) -> Self {
        store.track_in_flight(true);
        Self { store }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.track_in_flight(false);
    }
}
