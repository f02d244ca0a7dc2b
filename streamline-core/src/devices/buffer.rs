//! Byte-buffer reader/writer devices.

use crate::backpressure::{BytePermits, NoOpPermits};
use crate::devices::chunk::ChunkSize;
use crate::error::StreamError;
use crate::stop::StopReason;
use crate::writer::Accumulates;
use crate::{Reader, Writer};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

/// Slices an in-memory byte buffer into `chunkSize`-sized `Bytes` pieces
/// (default 1024). `chunkSize` may be a closure for randomized sizes.
pub struct BufferReader {
    data: Bytes,
    offset: usize,
    chunk_size: ChunkSize,
    stop_called: bool,
    pending_reason: Option<StopReason>,
}

impl BufferReader {
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: 0,
            chunk_size: ChunkSize::default(),
            stop_called: false,
            pending_reason: None,
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: impl Into<ChunkSize>) -> Self {
        self.chunk_size = chunk_size.into();
        self
    }
}

#[async_trait]
impl Reader<Bytes> for BufferReader {
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError> {
        if let Some(reason) = self.pending_reason.take() {
            return match reason {
                StopReason::Err(e) => Err(e),
                _ => Ok(None),
            };
        }
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        let want = self.chunk_size.next().max(1);
        let end = (self.offset + want).min(self.data.len());
        let chunk = self.data.slice(self.offset..end);
        self.offset = end;
        Ok(Some(chunk))
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.stop_called {
            return;
        }
        self.stop_called = true;
        self.offset = self.data.len();
        self.pending_reason = Some(reason);
    }
}

/// A concatenating byte sink; `result()` returns the accumulated bytes.
///
/// Bounds by count alone by default. A caller chaining this behind a
/// socket/file device that needs byte-budgeted flow control can supply a
/// [`BytePermits`] implementation via [`BufferWriter::with_permits`]; a
/// permit for each chunk's size is acquired (and held until the chunk is
/// appended) before the write proceeds.
pub struct BufferWriter {
    data: BytesMut,
    ended: bool,
    err: Option<StreamError>,
    permits: Box<dyn BytePermits>,
}

impl Default for BufferWriter {
    fn default() -> Self {
        Self {
            data: BytesMut::new(),
            ended: false,
            err: None,
            permits: Box::new(NoOpPermits),
        }
    }
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default no-op permit source with a byte-budgeted one.
    #[must_use]
    pub fn with_permits(mut self, permits: impl BytePermits + 'static) -> Self {
        self.permits = Box::new(permits);
        self
    }
}

#[async_trait]
impl Writer<Bytes> for BufferWriter {
    async fn write(&mut self, value: Option<Bytes>) -> Result<(), StreamError> {
        if let Some(e) = &self.err {
            return Err(e.clone());
        }
        if self.ended {
            if value.is_some() {
                let e = StreamError::WriteAfterEnd;
                self.err = Some(e.clone());
                return Err(e);
            }
            return Ok(());
        }
        match value {
            Some(chunk) => {
                let _permit = self.permits.acquire(chunk.len()).await;
                self.data.extend_from_slice(&chunk);
            }
            None => self.ended = true,
        }
        Ok(())
    }
}

impl Accumulates for BufferWriter {
    type Output = Bytes;

    fn result(&self) -> Bytes {
        self.data.clone().freeze()
    }
}
