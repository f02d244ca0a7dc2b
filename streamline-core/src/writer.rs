//! The writer contract: the push side of the protocol.

use crate::error::StreamError;
use crate::stop::StopReason;
use async_trait::async_trait;

/// A consumer of a stream of `T` values.
///
/// `write(None)` closes the writer (the "end" sentinel); every subsequent
/// `write(Some(_))` then fails with [`StreamError::WriteAfterEnd`].
#[async_trait]
pub trait Writer<T>: Send
where
    T: Send,
{
    /// Consume a value, or close the writer with `None`.
    async fn write(&mut self, value: Option<T>) -> Result<(), StreamError>;

    /// Write a value then immediately close: `write(Some(v))` followed by
    /// `write(None)`, as a single call.
    async fn write_all(&mut self, value: T) -> Result<(), StreamError> {
        self.write(Some(value)).await?;
        self.write(None).await
    }

    /// Abort the writer. The default behavior is `write(None)`; devices
    /// that hold a resource that shouldn't be flushed on abort (a socket
    /// mid-handshake, say) override this to release without writing end.
    async fn stop(&mut self, _reason: StopReason) {
        let _ = self.write(None).await;
    }
}

/// A boxed, owned writer.
pub type BoxWriter<T> = Box<dyn Writer<T> + Send>;

#[async_trait]
impl<T: Send> Writer<T> for BoxWriter<T> {
    async fn write(&mut self, value: Option<T>) -> Result<(), StreamError> {
        (**self).write(value).await
    }

    async fn stop(&mut self, reason: StopReason) {
        (**self).stop(reason).await;
    }
}

/// A writer that accumulates its input and exposes it via `result()`
/// (array/string/buffer writers). Modeled as a separate trait rather than
/// a field on `Writer` since most writers (devices wrapping sockets,
/// `generic` closures) have no result to expose.
pub trait Accumulates {
    type Output;

    /// The data collected so far. Sinks are not rolled back on a failed
    /// write partway through a chain: whatever was written before the
    /// failure remains observable here.
    fn result(&self) -> Self::Output;
}
