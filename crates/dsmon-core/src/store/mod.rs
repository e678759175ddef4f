// ── Reactive stores ──
//
// Each store owns one piece of dashboard state behind a `watch` channel.
// Reads are cheap snapshots; writers replace the whole value.

mod clock;
mod metrics;

pub use clock::ClockStore;
pub use metrics::{FetchOrdering, FetchOutcome, FetchStatus, MetricsStore};
