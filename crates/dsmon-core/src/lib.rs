//! Reactive data layer between `dsmon-api` and the presentation layer.
//!
//! - **[`ClockStore`]** holds the current wall-clock time and replaces it
//!   synchronously on [`update_time()`](ClockStore::update_time).
//!
//! - **[`MetricsStore`]** holds the last metrics snapshot and replaces it
//!   wholesale on every successful
//!   [`fetch_metrics()`](MetricsStore::fetch_metrics). Overlapping fetches
//!   resolve by [`FetchOrdering`].
//!
//! - **[`StoreStream<T>`]** is the subscription handle both stores vend:
//!   `current()` / `latest()` / `changed()` or a `Stream`.
//!
//! - **[`Dashboard`]** owns one of each store plus the background tasks
//!   that refresh them on a timer.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod store;
pub mod stream;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use store::{ClockStore, FetchOrdering, FetchOutcome, FetchStatus, MetricsStore};
pub use stream::{StoreStream, StoreWatchStream};
