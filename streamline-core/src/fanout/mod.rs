//! Fan-out nodes: one upstream reader replicated to many downstream
//! readers, with per-node termination policy.

pub mod dup;
pub mod fork;
pub mod tee;

pub use dup::{dup, DupBranch};
pub use fork::{fork, fork_aggregate, ForkAggregate, ForkBranch};
pub use tee::Tee;
