// ── Reactive store subscriptions ──
//
// Subscription handles vended by the stores. Consumers either poll
// `changed()` or turn the handle into a `Stream`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one store's state.
///
/// `T` is the published value: a timestamp for the clock, an
/// `Arc<Vec<MetricRecord>>` for metrics. Cloning it is cheap.
pub struct StoreStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StoreStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The value captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// The latest published value (may be newer than `current()`).
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new value.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let value = self.receiver.borrow_and_update().clone();
        self.current = value.clone();
        Some(value)
    }

    /// Convert into a `Stream`. The first item is the current value.
    pub fn into_stream(self) -> StoreWatchStream<T> {
        StoreWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StoreWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<T>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StoreWatchStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_tracks_sender() {
        let (tx, rx) = watch::channel(1u32);
        let mut stream = StoreStream::new(rx);
        assert_eq!(*stream.current(), 1);

        tx.send_replace(2);
        assert_eq!(stream.latest(), 2);
        assert_eq!(*stream.current(), 1);

        assert_eq!(stream.changed().await, Some(2));
        assert_eq!(*stream.current(), 2);

        drop(tx);
        assert_eq!(stream.changed().await, None);
    }
}
