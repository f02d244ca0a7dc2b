//! # Streamline
//!
//! A pull-based streaming pipeline library: lazy reader/writer chains with
//! deterministic stop propagation.
//!
//! ## Architecture
//!
//! Streamline is structured as a small **pipeline kernel** with clean
//! layering:
//!
//! - **`streamline-core`**: the `Reader`/`Writer` pull contracts, the stop
//!   protocol, combinators, fan-out/fan-in, and devices (this is what
//!   `streamline` re-exports below).
//! - **`streamline-nodify`**: a `futures::Stream`/`Sink` bridge for push
//!   ecosystem interop, opt-in via the `nodify` feature.
//! - **`streamline`**: public API surface (this crate).
//!
//! ## Quick Start
//!
//! ```rust
//! use streamline::prelude::*;
//! use streamline::devices::ArrayReader;
//! use streamline::combinators::Map;
//!
//! # async fn example() -> Result<()> {
//! let reader = ArrayReader::new(vec![1, 2, 3]);
//! let doubled = Map::new(reader, |v, _index| Ok(v * 2));
//! let values = to_array(doubled).await?;
//! assert_eq!(values, vec![2, 4, 6]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Fan-out and fan-in (opt-in via module, always available)
//!
//! `tee`/`dup`/`fork` split one reader into several; `dequeue`/`rr`/`join`/
//! `parallel` combine several readers into one. Both directions preserve
//! the same stop semantics as every other combinator: a `Silent` stop
//! drains what's already in flight, an `Err` stop aborts every branch.
//!
//! ## Push ecosystem interop (`nodify` feature)
//!
//! ```toml
//! [dependencies]
//! streamline = { version = "0.1", features = ["nodify"] }
//! ```
//!
//! ```rust,no_run
//! # #[cfg(feature = "nodify")]
//! use streamline::nodify::reader_stream;
//!
//! # #[cfg(feature = "nodify")]
//! # async fn example() {
//! use futures::StreamExt;
//! use streamline::devices::ArrayReader;
//!
//! let reader = ArrayReader::new(vec![1, 2, 3]);
//! let mut stream = Box::pin(reader_stream(reader));
//! while let Some(value) = stream.next().await {
//!     println!("{:?}", value);
//! }
//! # }
//! ```
//!
//! ## Performance
//!
//! - **Zero-copy**: byte-oriented devices and the binary helper move
//!   `bytes::Bytes` segments around, not memcpy'd buffers, on the
//!   single-segment fast path.
//! - **`io_uring`-friendly**: runs on `compio`, no assumption of a
//!   multi-threaded executor.
//! - **Sans-executor protocol**: the stop/end protocol is pure state, not
//!   tied to any particular runtime beyond `async-trait`.

#![warn(missing_docs)]
#![warn(clippy::all)]
// Allow some pedantic patterns
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// Re-export core types
pub use bytes::Bytes;
pub use streamline_core::{backpressure, binary, combinators, devices, error, fanin, fanout, handshake, headers, pipe, prelude, release, stop};
pub use streamline_core::{BoxReader, BoxWriter, Reader, StreamError, StopReason, Writer};

/// The push-ecosystem bridge (`futures::Stream`/`Sink`), opt-in via the
/// `nodify` feature.
#[cfg(feature = "nodify")]
pub mod nodify {
    pub use streamline_nodify::*;
}

/// Development helpers (benches/tests)
pub mod dev_tracing;
