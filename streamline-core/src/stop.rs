//! Stop reasons: the three-way termination signal threaded through every
//! reader and writer.

use crate::error::StreamError;

/// Why a reader/writer is being stopped.
///
/// - `None` is advisory: a branch opts out without affecting peers.
/// - `Silent` is a collective end: peers terminate normally on their next
///   read (end-stickiness, no error).
/// - `Err(e)` is a collective abort: peers raise `e` on their next read.
///
/// `stop(true)`/"truthy non-error" in the source this crate generalizes
/// collapses onto `Silent` — a single distinguished sentinel rather than an
/// overloaded boolean.
#[derive(Debug, Clone, Default)]
pub enum StopReason {
    #[default]
    None,
    Silent,
    Err(StreamError),
}

impl StopReason {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::Silent)
    }

    #[must_use]
    pub const fn as_err(&self) -> Option<&StreamError> {
        match self {
            Self::Err(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_err(self) -> Option<StreamError> {
        match self {
            Self::Err(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StreamError> for StopReason {
    fn from(err: StreamError) -> Self {
        Self::Err(err)
    }
}
