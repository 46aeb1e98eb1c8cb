// ── Reactive slot streams ──
//
// Subscription types for consuming slot changes from the Store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::SlotValue;

/// A subscription to one store slot.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via the `changed()` method or by converting to a `Stream`.
pub struct SlotStream<T: Clone + Send + Sync + 'static> {
    current: SlotValue<T>,
    receiver: watch::Receiver<SlotValue<T>>,
}

impl<T: Clone + Send + Sync + 'static> SlotStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<SlotValue<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or last `changed()`).
    pub fn current(&self) -> &SlotValue<T> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> SlotValue<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the sender (Store) has been dropped.
    pub async fn changed(&mut self) -> Option<SlotValue<T>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SlotWatchStream<T> {
        SlotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a new [`SlotValue`] snapshot each time the slot is mutated.
pub struct SlotWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<SlotValue<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for SlotWatchStream<T> {
    type Item = SlotValue<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin when the inner type is Unpin, and
        // SlotValue<T> always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
