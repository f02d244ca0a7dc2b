//! Streamline Nodify
//!
//! A bridge between the pull-based `Reader`/`Writer` contracts in
//! `streamline-core` and the push-based `futures::Stream`/`futures::Sink`
//! traits, for call sites that already live in the futures ecosystem —
//! `select!`, `StreamExt`/`SinkExt` combinators, or a library that only
//! accepts `impl Stream`.
//!
//! This crate is a non-core collaborator: nothing in `streamline-core`
//! depends on it, and most pipelines never need it. Reach for it only at
//! the edge where a pull chain has to hand off to, or receive from, push
//! ecosystem code.

#![deny(unsafe_code)]

mod pause;
mod stream_sink;

pub use pause::PauseHandle;
pub use stream_sink::{reader_stream, reader_stream_with_pause, stop_writer, writer_sink};
