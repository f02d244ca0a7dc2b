//! `peekable`: adds `peek()` and `unread(v)` to a reader.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;

/// A reader augmented with a one-deep peek and a LIFO unread stack.
/// `read()` first drains the unread stack (most-recently-pushed first),
/// then the stashed peek value, then falls through to upstream.
pub struct Peekable<R, T> {
    upstream: R,
    peeked: Option<T>,
    unread_stack: Vec<T>,
}

impl<R, T> Peekable<R, T> {
    pub fn new(upstream: R) -> Self {
        Self {
            upstream,
            peeked: None,
            unread_stack: Vec::new(),
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Peekable<R, T>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if let Some(v) = self.unread_stack.pop() {
            return Ok(Some(v));
        }
        if let Some(v) = self.peeked.take() {
            return Ok(Some(v));
        }
        self.upstream.read().await
    }

    async fn stop(&mut self, reason: StopReason) {
        self.unread_stack.clear();
        self.peeked = None;
        self.upstream.stop(reason).await;
    }

    fn headers(&self) -> Option<&Headers> {
        self.upstream.headers()
    }
}

impl<R, T> Peekable<R, T>
where
    R: Reader<T> + Send,
    T: Send + Clone + 'static,
{
    /// Read the next value without consuming it: the next `read()` (or
    /// `peek()`) returns the same value.
    pub async fn peek(&mut self) -> Result<Option<T>, StreamError> {
        if let Some(v) = self.unread_stack.last() {
            return Ok(Some(v.clone()));
        }
        if self.peeked.is_none() {
            self.peeked = self.upstream.read().await?;
        }
        Ok(self.peeked.clone())
    }
}

impl<R, T> Peekable<R, T> {
    /// Push an arbitrary value back onto the front of the stream (LIFO:
    /// the most recently unread value is the next one `read()` returns).
    pub fn unread(&mut self, value: T) {
        self.unread_stack.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn peek_does_not_consume() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2, 3]);
            let mut r = Peekable::new(upstream);
            assert_eq!(r.peek().await.unwrap(), Some(1));
            assert_eq!(r.peek().await.unwrap(), Some(1));
            assert_eq!(r.read().await.unwrap(), Some(1));
            assert_eq!(r.read().await.unwrap(), Some(2));
        });
    }

    #[test]
    fn unread_pushes_values_back_lifo() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2, 3]);
            let mut r = Peekable::new(upstream);
            assert_eq!(r.read().await.unwrap(), Some(1));
            let two = r.read().await.unwrap().unwrap();
            r.unread(two);
            r.unread(99);
            assert_eq!(r.read().await.unwrap(), Some(99));
            assert_eq!(r.read().await.unwrap(), Some(2));
            assert_eq!(r.read().await.unwrap(), Some(3));
        });
    }
}
