//! Stream error types.
//!
//! Comprehensive error handling for all streamline operations.

use std::sync::Arc;
use thiserror::Error;

/// Main error type for streamline operations.
///
/// `Clone` is required because a single error can be observed by more than
/// one downstream branch at once (a collective-abort stop surfaces on
/// every peer's next read). The upstream/user variants wrap their source
/// in an `Arc` so cloning stays cheap.
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    /// Error raised by a mapper/predicate/device closure, or injected via
    /// `stop(Err(e))`.
    #[error("{0}")]
    Upstream(Arc<dyn std::error::Error + Send + Sync>),

    /// IO error from a device (socket, file, etc. layered on top of this
    /// crate).
    #[error("io error: {0}")]
    Io(Arc<std::io::Error>),

    /// `write` called after `write(end)` already closed the writer.
    #[error("write after end")]
    WriteAfterEnd,

    /// Protocol misuse: e.g. reading a writer-only device.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// `unread(v)` popped past what the last `read`/`peek` actually
    /// consumed (must be ≤ size of the last accepted read).
    #[error("unread exceeds last accepted read")]
    UnreadTooMuch,

    /// Invalid length/endian request to the binary helper.
    #[error("invalid binary read: {0}")]
    InvalidBinaryRead(String),

    /// A writer's `write` raising this in place of a real failure signals
    /// a graceful early stop with the given reason rather than an error —
    /// the control-flow-via-exception `StopException` from spec §4.6/§7.
    /// `pipe` inspects this variant specially: a `None`/`Silent` reason is
    /// swallowed (upstream is stopped with that reason and the writer is
    /// returned normally); an `Err` reason propagates like any other error.
    #[error("stopped: {0:?}")]
    StopSignal(crate::stop::StopReason),
}

impl StreamError {
    /// Wrap an arbitrary user/device error.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Upstream(Arc::new(err))
    }

    /// Wrap a plain message as an upstream error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Upstream(Arc::new(MessageError(message.into())))
    }

    /// Create a protocol error with a message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// A writer's graceful early-stop signal, for `pipe` to swallow.
    pub fn stop_signal(reason: crate::stop::StopReason) -> Self {
        Self::StopSignal(reason)
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

/// Result type alias for streamline operations.
pub type Result<T> = std::result::Result<T, StreamError>;
