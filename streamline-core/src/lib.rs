//! Streamline Core
//!
//! The reader/writer pull-streaming algebra: the pull protocol, the
//! termination ("stop") propagation protocol, the combinators that
//! preserve those protocols under composition, and the supporting devices.
//!
//! - [`reader`] / [`writer`]: the two halves of the pull protocol.
//! - [`stop`]: the three-way termination signal (`None`/`Silent`/`Err`).
//! - [`headers`]: opaque metadata carried by readers, passed through
//!   combinators unchanged.
//! - [`release`]: exactly-once resource release on stop/end/drop.
//! - [`handshake`]: the single-slot rendezvous `transform` and `buffer`
//!   hand values across.
//! - [`combinators`]: `map`, `filter`, `while`/`until`, `limit`, `skip`,
//!   `concat`, `transform`, `peekable`, `buffer`.
//! - [`fanout`]: `tee`, `dup`, `fork`.
//! - [`fanin`]: `dequeue`, `rr`, `join`, `parallel`.
//! - [`devices`]: array/string/buffer/generic/queue/empty sources and
//!   sinks.
//! - [`binary`]: the byte-oriented read/peek/unread window and big-/
//!   little-endian numeric helpers, layered over a byte-chunk reader.
//! - [`pipe`]: terminal drivers (`pipe`, `each`, `reduce`, `every`/`some`/
//!   `find`, `toArray`, `readAll`, `compare`).
//! - [`error`]: [`error::StreamError`], the error type threaded through
//!   every fallible operation.
//! - [`backpressure`]: an optional byte-budgeted flow-control hook,
//!   additive to `buffer`'s count-based bound.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

pub mod backpressure;
pub mod binary;
pub mod combinators;
pub mod devices;
pub mod error;
pub mod fanin;
pub mod fanout;
pub mod handshake;
pub mod headers;
pub mod pipe;
pub mod release;
pub mod reader;
pub mod stop;
pub mod writer;

pub use error::StreamError;
pub use reader::{BoxReader, Reader};
pub use stop::StopReason;
pub use writer::{Accumulates, BoxWriter, Writer};

/// A small prelude covering the common currency of every chain: the two
/// contracts, the stop reason, and the terminal drivers. Combinators and
/// devices are left to their own modules since call sites tend to name
/// only the handful they actually build a chain out of.
pub mod prelude {
    pub use crate::error::{Result, StreamError};
    pub use crate::headers::{empty_headers, Headers};
    pub use crate::pipe::{compare, each, every, find, pipe, read_all_bytes, read_all_string, reduce, some, to_array};
    pub use crate::reader::{BoxReader, Reader};
    pub use crate::stop::StopReason;
    pub use crate::writer::{Accumulates, BoxWriter, Writer};
}
