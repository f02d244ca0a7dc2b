//! Concrete sources and sinks: the leaves of every chain.

pub mod array;
pub mod buffer;
pub mod chunk;
pub mod empty;
pub mod generic;
pub mod queue;
pub mod segmented;
pub mod string;

pub use array::{ArrayReader, ArrayWriter};
pub use buffer::{BufferReader, BufferWriter};
pub use chunk::ChunkSize;
pub use empty::{EmptyReader, EmptyWriter};
pub use generic::{GenericReader, GenericWriter};
pub use queue::{queue, QueueReader, QueueWriter};
pub use segmented::SegmentedBuffer;
pub use string::{StringReader, StringWriter};
