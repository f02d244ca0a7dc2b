//! Fan-in nodes: many upstream readers merged into one downstream reader.

pub mod dequeue;
pub mod join;
pub mod parallel;
pub mod rr;

pub use dequeue::Dequeue;
pub use join::Join;
pub use parallel::{parallel_preserve_order, parallel_shuffle, ParallelPreserveOrder, ParallelShuffle, WorkerSource};
pub use rr::RoundRobin;
