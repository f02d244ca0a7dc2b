//! A byte-oriented read/peek/unread window over a byte-chunk reader, plus
//! big-/little-endian numeric helpers and a buffering binary writer.
//!
//! [`BinaryReader`] is built on [`crate::devices::SegmentedBuffer`] — the
//! same zero-copy multi-segment buffer the `buffer` device uses to slice
//! an in-memory blob into chunks, used here the other way around: chunks
//! arrive from upstream and are concatenated until a requested length is
//! satisfied.

use crate::devices::SegmentedBuffer;
use crate::error::StreamError;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use bytes::{Bytes, BytesMut};

/// Wraps a `Bytes`-chunk reader with a sliding window supporting exact-
/// length reads, peeks, and bounded unread.
///
/// `read(len)` returns exactly `len` bytes, except at end of stream where
/// it returns whatever remains (fewer than `len`, possibly empty).
/// `unread(k)` pushes the last `k` bytes of the most recently accepted
/// read back onto the front of the window; `k` must not exceed the size
/// of that read, or [`StreamError::UnreadTooMuch`] is raised.
pub struct BinaryReader<R> {
    upstream: R,
    buffered: SegmentedBuffer,
    upstream_ended: bool,
    last_read: Bytes,
}

impl<R> BinaryReader<R>
where
    R: Reader<Bytes> + Send,
{
    pub const fn new(upstream: R) -> Self {
        Self {
            upstream,
            buffered: SegmentedBuffer::new(),
            upstream_ended: false,
            last_read: Bytes::new(),
        }
    }

    /// Pull upstream chunks until at least `want` bytes are buffered, or
    /// upstream has ended.
    async fn fill_to(&mut self, want: usize) -> Result<(), StreamError> {
        while self.buffered.len() < want && !self.upstream_ended {
            match self.upstream.read().await? {
                Some(chunk) => self.buffered.push(chunk),
                None => self.upstream_ended = true,
            }
        }
        Ok(())
    }

    /// Read exactly `len` bytes, or fewer only once upstream has ended.
    pub async fn read(&mut self, len: usize) -> Result<Bytes, StreamError> {
        self.fill_to(len).await?;
        let take = len.min(self.buffered.len());
        let out = self
            .buffered
            .take_bytes(take)
            .expect("take is bounded by buffered.len()");
        self.last_read = out.clone();
        Ok(out)
    }

    /// Peek at the next `len` bytes without consuming them. A second
    /// `peek` (or a `read` for the same length) observes the same bytes.
    pub async fn peek(&mut self, len: usize) -> Result<Bytes, StreamError> {
        self.fill_to(len).await?;
        let take = len.min(self.buffered.len());
        let mut dst = vec![0u8; take];
        self.buffered.copy_prefix(take, &mut dst);
        Ok(Bytes::from(dst))
    }

    /// Peek at every remaining byte, pulling upstream to exhaustion
    /// without consuming anything.
    pub async fn peek_all(&mut self) -> Result<Bytes, StreamError> {
        while !self.upstream_ended {
            match self.upstream.read().await? {
                Some(chunk) => self.buffered.push(chunk),
                None => self.upstream_ended = true,
            }
        }
        let mut dst = vec![0u8; self.buffered.len()];
        self.buffered.copy_prefix(self.buffered.len(), &mut dst);
        Ok(Bytes::from(dst))
    }

    /// Push the last `k` bytes of the most recently accepted `read` back
    /// onto the front of the window.
    pub fn unread(&mut self, k: usize) -> Result<(), StreamError> {
        if k > self.last_read.len() {
            return Err(StreamError::UnreadTooMuch);
        }
        let split_at = self.last_read.len() - k;
        let pushed_back = self.last_read.slice(split_at..);
        self.last_read = self.last_read.slice(..split_at);
        self.buffered.push_front(pushed_back);
        Ok(())
    }

    async fn read_exact<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let bytes = self.read(N).await?;
        if bytes.len() != N {
            return Err(StreamError::InvalidBinaryRead(format!(
                "expected {N} bytes, upstream ended with {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub async fn read_u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.read_exact::<1>().await?[0])
    }

    pub async fn read_i8(&mut self) -> Result<i8, StreamError> {
        Ok(self.read_exact::<1>().await?[0] as i8)
    }

    pub async fn read_u16_be(&mut self) -> Result<u16, StreamError> {
        Ok(u16::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_u16_le(&mut self) -> Result<u16, StreamError> {
        Ok(u16::from_le_bytes(self.read_exact().await?))
    }

    pub async fn read_i16_be(&mut self) -> Result<i16, StreamError> {
        Ok(i16::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_i16_le(&mut self) -> Result<i16, StreamError> {
        Ok(i16::from_le_bytes(self.read_exact().await?))
    }

    pub async fn read_u32_be(&mut self) -> Result<u32, StreamError> {
        Ok(u32::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_u32_le(&mut self) -> Result<u32, StreamError> {
        Ok(u32::from_le_bytes(self.read_exact().await?))
    }

    pub async fn read_i32_be(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_i32_le(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_le_bytes(self.read_exact().await?))
    }

    pub async fn read_f32_be(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_f32_le(&mut self) -> Result<f32, StreamError> {
        Ok(f32::from_le_bytes(self.read_exact().await?))
    }

    pub async fn read_f64_be(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_be_bytes(self.read_exact().await?))
    }

    pub async fn read_f64_le(&mut self) -> Result<f64, StreamError> {
        Ok(f64::from_le_bytes(self.read_exact().await?))
    }

    /// Relay a `stop` to the upstream chunk reader, discarding whatever is
    /// still buffered.
    pub async fn stop(&mut self, reason: StopReason) {
        self.buffered = SegmentedBuffer::new();
        self.upstream.stop(reason).await;
    }
}

/// Buffers writes up to `buf_size` bytes (default 16384) before flushing
/// to the underlying `Bytes`-chunk writer.
pub struct BinaryWriter<W> {
    downstream: W,
    buf: BytesMut,
    buf_size: usize,
}

const DEFAULT_BUF_SIZE: usize = 16384;

impl<W> BinaryWriter<W>
where
    W: Writer<Bytes> + Send,
{
    pub fn new(downstream: W) -> Self {
        Self {
            downstream,
            buf: BytesMut::new(),
            buf_size: DEFAULT_BUF_SIZE,
        }
    }

    #[must_use]
    pub const fn with_buf_size(mut self, buf_size: usize) -> Self {
        self.buf_size = buf_size;
        self
    }

    /// Append raw bytes, flushing automatically once the buffer reaches
    /// `buf_size`.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() >= self.buf_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Send whatever is buffered downstream now, regardless of size.
    pub async fn flush(&mut self) -> Result<(), StreamError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::take(&mut self.buf).freeze();
        self.downstream.write(Some(chunk)).await
    }

    pub async fn write_u8(&mut self, v: u8) -> Result<(), StreamError> {
        self.write_bytes(&[v]).await
    }

    pub async fn write_i8(&mut self, v: i8) -> Result<(), StreamError> {
        self.write_bytes(&[v as u8]).await
    }

    pub async fn write_u16_be(&mut self, v: u16) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_u16_le(&mut self, v: u16) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    pub async fn write_i16_be(&mut self, v: i16) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_i16_le(&mut self, v: i16) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    pub async fn write_u32_be(&mut self, v: u32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_u32_le(&mut self, v: u32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    pub async fn write_i32_be(&mut self, v: i32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_i32_le(&mut self, v: i32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    pub async fn write_f32_be(&mut self, v: f32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_f32_le(&mut self, v: f32) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    pub async fn write_f64_be(&mut self, v: f64) -> Result<(), StreamError> {
        self.write_bytes(&v.to_be_bytes()).await
    }

    pub async fn write_f64_le(&mut self, v: f64) -> Result<(), StreamError> {
        self.write_bytes(&v.to_le_bytes()).await
    }

    /// Flush, then close the downstream writer.
    pub async fn end(&mut self) -> Result<(), StreamError> {
        self.flush().await?;
        self.downstream.write(None).await
    }
}
