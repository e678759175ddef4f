use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::stream::StoreStream;

/// Holds the wall-clock time shown by the dashboard.
///
/// Updating never blocks and never fails. Subscribers see every update.
pub struct ClockStore {
    time: watch::Sender<DateTime<Utc>>,
}

impl ClockStore {
    pub fn new() -> Self {
        let (time, _) = watch::channel(Utc::now());
        Self { time }
    }

    /// Replace the stored time with the current instant and return it.
    pub fn update_time(&self) -> DateTime<Utc> {
        let now = Utc::now();
        // `send_replace` stores the value even with zero receivers.
        self.time.send_replace(now);
        now
    }

    /// The last stored time.
    pub fn now(&self) -> DateTime<Utc> {
        *self.time.borrow()
    }

    pub fn subscribe(&self) -> StoreStream<DateTime<Utc>> {
        StoreStream::new(self.time.subscribe())
    }
}

impl Default for ClockStore {
    fn default() -> Self {
        Self::new()
    }
}
