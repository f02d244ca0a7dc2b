//! String reader/writer devices.

use crate::devices::chunk::ChunkSize;
use crate::error::StreamError;
use crate::stop::StopReason;
use crate::writer::Accumulates;
use crate::{Reader, Writer};
use async_trait::async_trait;

/// Slices an in-memory string into `chunkSize`-sized pieces (default
/// 1024 bytes), never splitting a UTF-8 character across two chunks.
pub struct StringReader {
    data: String,
    offset: usize,
    chunk_size: ChunkSize,
    stop_called: bool,
    pending_reason: Option<StopReason>,
}

impl StringReader {
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
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

    /// Find the largest valid char boundary at or before `want` bytes past
    /// `self.offset`, so a chunk never splits a multi-byte character.
    fn boundary_at_most(&self, want: usize) -> usize {
        let mut end = (self.offset + want).min(self.data.len());
        while end > self.offset && !self.data.is_char_boundary(end) {
            end -= 1;
        }
        end
    }
}

#[async_trait]
impl Reader<String> for StringReader {
    async fn read(&mut self) -> Result<Option<String>, StreamError> {
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
        let end = self.boundary_at_most(want);
        let chunk = self.data[self.offset..end].to_string();
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

/// A concatenating string sink; `result()` returns the accumulated text.
#[derive(Default)]
pub struct StringWriter {
    data: String,
    ended: bool,
    err: Option<StreamError>,
}

impl StringWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Writer<String> for StringWriter {
    async fn write(&mut self, value: Option<String>) -> Result<(), StreamError> {
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
            Some(chunk) => self.data.push_str(&chunk),
            None => self.ended = true,
        }
        Ok(())
    }
}

impl Accumulates for StringWriter {
    type Output = String;

    fn result(&self) -> String {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_reader_respects_char_boundaries() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            // "é" is 2 bytes; chunk_size 1 would split it if not boundary-aware.
            let mut r = StringReader::new("éb").with_chunk_size(1);
            let first = r.read().await.unwrap().unwrap();
            assert_eq!(first, "é");
            let second = r.read().await.unwrap().unwrap();
            assert_eq!(second, "b");
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn string_writer_concatenates() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut w = StringWriter::new();
            w.write(Some("ab".to_string())).await.unwrap();
            w.write(Some("cd".to_string())).await.unwrap();
            w.write(None).await.unwrap();
            assert_eq!(w.result(), "abcd");
        });
    }
}
