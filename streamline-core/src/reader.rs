//! The reader contract: the pull side of the protocol.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use async_trait::async_trait;

/// A lazy producer of a stream of `T` values.
///
/// Invariants enforced by every implementation (see crate-level docs for
/// the full list):
///
/// - **At-most-one-live-read**: callers must not start a second `read()`
///   before the first resolves.
/// - **End-stickiness**: once `read()` yields `Ok(None)`, every subsequent
///   `read()` also yields `Ok(None)`.
/// - **Stop-idempotence**: `stop` may be called any number of times; only
///   the first call propagates upstream.
/// - **No-resurrection**: after `stop(reason)`, `read()` returns `Ok(None)`
///   for `None`/`Silent`, or `Err(e)` for `Err(e)`.
#[async_trait]
pub trait Reader<T>: Send
where
    T: Send,
{
    /// Await and yield the next value, or `None` at end of stream.
    async fn read(&mut self) -> Result<Option<T>, StreamError>;

    /// Signal upstream to release resources. Returns once upstream has
    /// acknowledged release. Safe to call from any state, any number of
    /// times.
    async fn stop(&mut self, reason: StopReason);

    /// Opaque metadata attached by devices that carry framing metadata.
    /// Combinators forward the upstream reader's headers unchanged.
    fn headers(&self) -> Option<&Headers> {
        None
    }
}

/// A boxed, owned reader — the common currency combinators pass around so
/// chains can be built without naming every intermediate stage's type.
pub type BoxReader<T> = Box<dyn Reader<T> + Send>;

#[async_trait]
impl<T: Send> Reader<T> for BoxReader<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        (**self).read().await
    }

    async fn stop(&mut self, reason: StopReason) {
        (**self).stop(reason).await;
    }

    fn headers(&self) -> Option<&Headers> {
        (**self).headers()
    }
}
