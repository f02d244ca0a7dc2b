//! A wake-based pause/resume gate for the push-side adapters.
//!
//! `futures::stream::unfold`'s generator closure has no natural place to
//! hang a "don't pull yet" signal, so callers who need to throttle a
//! [`ReaderStream`](crate::ReaderStream) independently of its own
//! backpressure (a UI pause button, a rate limiter) thread a [`PauseHandle`]
//! through instead. Paused status is checked on every pull; a parked waiter
//! is woken the moment [`PauseHandle::resume`] flips the gate back open, so
//! a paused stream consumes no CPU between pulls.

use event_listener::Event;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
struct PauseState {
    paused: AtomicBool,
    event: Event,
}

/// A shared pause/resume gate. Clones refer to the same underlying state.
#[derive(Debug, Clone)]
pub struct PauseHandle {
    state: Arc<PauseState>,
}

impl PauseHandle {
    /// Create a new handle, initially resumed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(PauseState {
                paused: AtomicBool::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Stop the stream from pulling further values until [`resume`](Self::resume) is called.
    pub fn pause(&self) {
        trace!("[NODIFY] pause gate closed");
        self.state.paused.store(true, Ordering::SeqCst);
    }

    /// Allow the stream to resume pulling, waking it if it was parked.
    pub fn resume(&self) {
        trace!("[NODIFY] pause gate opened, waking parked waiters");
        self.state.paused.store(false, Ordering::SeqCst);
        self.state.event.notify(usize::MAX);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    /// Resolve once the gate is open. Returns immediately if already open.
    pub(crate) async fn wait_until_resumed(&self) {
        loop {
            if !self.is_paused() {
                return;
            }
            let listener = self.state.event.listen();
            if !self.is_paused() {
                return;
            }
            listener.await;
        }
    }
}

impl Default for PauseHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_resumed() {
        let handle = PauseHandle::new();
        assert!(!handle.is_paused());
    }

    #[test]
    fn pause_then_resume_round_trips() {
        let handle = PauseHandle::new();
        handle.pause();
        assert!(handle.is_paused());
        handle.resume();
        assert!(!handle.is_paused());
    }

    #[test]
    fn wait_returns_immediately_when_not_paused() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let handle = PauseHandle::new();
            handle.wait_until_resumed().await;
        });
    }

    #[test]
    fn wait_unblocks_after_resume() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let handle = PauseHandle::new();
            handle.pause();
            let waiter = handle.clone();
            let task = compio::runtime::spawn(async move {
                waiter.wait_until_resumed().await;
            });
            handle.resume();
            task.await.unwrap();
        });
    }
}
