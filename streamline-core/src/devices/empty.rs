//! Trivial reader/writer that immediately ends / discards.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use async_trait::async_trait;
use std::marker::PhantomData;

/// A reader that yields end on the very first `read()`.
#[derive(Default)]
pub struct EmptyReader<T>(PhantomData<fn() -> T>);

impl<T> EmptyReader<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<T: Send> Reader<T> for EmptyReader<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        Ok(None)
    }

    async fn stop(&mut self, _reason: StopReason) {}
}

/// A writer that discards every value written to it.
#[derive(Default)]
pub struct EmptyWriter<T>(PhantomData<fn(T)>);

impl<T> EmptyWriter<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

#[async_trait]
impl<T: Send> Writer<T> for EmptyWriter<T> {
    async fn write(&mut self, _value: Option<T>) -> Result<(), StreamError> {
        Ok(())
    }

    async fn stop(&mut self, _reason: StopReason) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader_ends_immediately() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut r: EmptyReader<i32> = EmptyReader::new();
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn empty_writer_discards() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut w: EmptyWriter<i32> = EmptyWriter::new();
            w.write(Some(1)).await.unwrap();
            w.write(None).await.unwrap();
        });
    }
}
