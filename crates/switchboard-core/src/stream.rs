// ── Reactive state stream ──
//
// Subscription type for consuming actuator-state changes from the store.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ActuatorState;

/// A subscription to the actuator flags.
///
/// Provides both point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct StateStream {
    current: ActuatorState,
    receiver: watch::Receiver<ActuatorState>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<ActuatorState>) -> Self {
        let current = *receiver.borrow();
        Self { current, receiver }
    }

    /// State captured at creation time or at the last `changed()`.
    pub fn current(&self) -> ActuatorState {
        self.current
    }

    /// Latest state (may have changed since the last `changed()`).
    pub fn latest(&self) -> ActuatorState {
        *self.receiver.borrow()
    }

    /// Wait for the next change. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<ActuatorState> {
        self.receiver.changed().await.ok()?;
        let state = *self.receiver.borrow_and_update();
        self.current = state;
        Some(state)
    }

    /// Convert into a `Stream` that yields the current state, then every change.
    pub fn into_stream(self) -> StateWatchStream {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter returned by [`StateStream::into_stream`].
pub struct StateWatchStream {
    inner: WatchStream<ActuatorState>,
}

impl Stream for StateWatchStream {
    type Item = ActuatorState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
