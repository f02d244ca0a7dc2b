//! Bounded producer/consumer queue device.
//!
//! Exposes a writer side with both a lossy `put` (non-suspending, returns
//! whether the value was accepted) and a lossless `write` (suspends until
//! space is available), and a reader side that drains FIFO and yields end
//! once `end()` has closed the writer and the backlog is drained.
//!
//! Built on `flume::bounded`, the channel of choice anywhere one async
//! task hands values to another in this codebase.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use async_trait::async_trait;

/// Create a queue with the given capacity, returning its writer and
/// reader halves.
#[must_use]
pub fn queue<T: Send + 'static>(max: usize) -> (QueueWriter<T>, QueueReader<T>) {
    let (tx, rx) = flume::bounded(max.max(1));
    (
        QueueWriter { tx: Some(tx) },
        QueueReader {
            rx,
            stop_called: false,
            pending_reason: None,
        },
    )
}

/// The producer side of a queue.
pub struct QueueWriter<T> {
    tx: Option<flume::Sender<T>>,
}

impl<T: Send + 'static> QueueWriter<T> {
    /// Non-suspending. Returns `true` if accepted, `false` if the queue is
    /// full or already closed (lossy).
    pub fn put(&self, value: T) -> bool {
        match &self.tx {
            Some(tx) => tx.try_send(value).is_ok(),
            None => false,
        }
    }

    /// Suspends until space is available (lossless).
    pub async fn write_lossless(&self, value: T) -> Result<(), StreamError> {
        match &self.tx {
            Some(tx) => tx
                .send_async(value)
                .await
                .map_err(|_| StreamError::protocol("queue closed")),
            None => Err(StreamError::WriteAfterEnd),
        }
    }

    /// Closes the producer side; the reader yields end once the backlog
    /// already queued has drained.
    pub fn end(&mut self) {
        self.tx = None;
    }
}

#[async_trait]
impl<T: Send + 'static> Writer<T> for QueueWriter<T> {
    async fn write(&mut self, value: Option<T>) -> Result<(), StreamError> {
        match value {
            Some(v) => self.write_lossless(v).await,
            None => {
                self.end();
                Ok(())
            }
        }
    }

    async fn stop(&mut self, _reason: StopReason) {
        self.end();
    }
}

/// The consumer side of a queue.
pub struct QueueReader<T> {
    rx: flume::Receiver<T>,
    stop_called: bool,
    pending_reason: Option<StopReason>,
}

#[async_trait]
impl<T: Send + 'static> Reader<T> for QueueReader<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if let Some(reason) = self.pending_reason.take() {
            return match reason {
                StopReason::Err(e) => Err(e),
                _ => Ok(None),
            };
        }
        if self.stop_called {
            return Ok(None);
        }
        match self.rx.recv_async().await {
            Ok(v) => Ok(Some(v)),
            Err(_) => Ok(None),
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.stop_called {
            return;
        }
        self.stop_called = true;
        self.pending_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossy_put_rejects_past_capacity_then_drains() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let (mut w, mut r) = queue::<i32>(4);
            let accepted: Vec<bool> = (0..6).map(|i| w.put(i)).collect();
            assert_eq!(accepted, vec![true, true, true, true, false, false]);
            w.end();
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 2, 3]);
        });
    }

    #[test]
    fn lossless_write_delivers_every_value() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            // Capacity covers the whole burst so each `write_lossless` below
            // resolves without needing a concurrent drainer.
            let (mut w, mut r) = queue::<i32>(6);
            for i in 0..6 {
                w.write_lossless(i).await.unwrap();
            }
            w.end();
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);
        });
    }
}
