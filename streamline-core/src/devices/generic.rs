//! Generic reader/writer: trivial wrappers over user closures.
//!
//! Construction takes effectful closures; the wrapper layers on top the
//! three properties every reader/writer needs regardless of the concrete
//! device: end-stickiness, stop-idempotence, and an error latch (once a
//! closure fails, every subsequent call short-circuits to the same
//! terminal state without invoking the closure again).

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;

type ReadFn<T> = Box<dyn FnMut() -> BoxFuture<'static, Result<Option<T>, StreamError>> + Send>;
type ReaderStopFn = Box<dyn FnMut(StopReason) -> BoxFuture<'static, ()> + Send>;

/// A reader backed by a user-supplied async closure.
pub struct GenericReader<T> {
    read_fn: ReadFn<T>,
    stop_fn: Option<ReaderStopFn>,
    ended: bool,
    stopped: Option<StopReason>,
    headers: Option<Headers>,
}

impl<T: Send + 'static> GenericReader<T> {
    pub fn new<R, Fut>(mut read: R) -> Self
    where
        R: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<T>, StreamError>> + Send + 'static,
    {
        Self {
            read_fn: Box::new(move || Box::pin(read())),
            stop_fn: None,
            ended: false,
            stopped: None,
            headers: None,
        }
    }

    #[must_use]
    pub fn with_stop<S, Fut>(mut self, mut stop: S) -> Self
    where
        S: FnMut(StopReason) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop_fn = Some(Box::new(move |r| Box::pin(stop(r))));
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }
}

#[async_trait]
impl<T: Send + 'static> Reader<T> for GenericReader<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        if let Some(reason) = self.stopped.take() {
            self.ended = true;
            return match reason {
                StopReason::Err(e) => Err(e),
                _ => Ok(None),
            };
        }
        match (self.read_fn)().await {
            Ok(None) => {
                self.ended = true;
                Ok(None)
            }
            Ok(Some(v)) => Ok(Some(v)),
            Err(e) => {
                self.ended = true;
                Err(e)
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.ended || self.stopped.is_some() {
            return;
        }
        if let Some(stop_fn) = &mut self.stop_fn {
            stop_fn(reason.clone()).await;
        }
        self.stopped = Some(reason);
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }
}

type WriteFn<T> = Box<dyn FnMut(Option<T>) -> BoxFuture<'static, Result<(), StreamError>> + Send>;
type WriterStopFn = Box<dyn FnMut(StopReason) -> BoxFuture<'static, ()> + Send>;

/// A writer backed by a user-supplied async closure.
pub struct GenericWriter<T> {
    write_fn: WriteFn<T>,
    stop_fn: Option<WriterStopFn>,
    err: Option<StreamError>,
}

impl<T: Send + 'static> GenericWriter<T> {
    pub fn new<W, Fut>(mut write: W) -> Self
    where
        W: FnMut(Option<T>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), StreamError>> + Send + 'static,
    {
        Self {
            write_fn: Box::new(move |v| Box::pin(write(v))),
            stop_fn: None,
            err: None,
        }
    }

    #[must_use]
    pub fn with_stop<S, Fut>(mut self, mut stop: S) -> Self
    where
        S: FnMut(StopReason) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop_fn = Some(Box::new(move |r| Box::pin(stop(r))));
        self
    }
}

#[async_trait]
impl<T: Send + 'static> Writer<T> for GenericWriter<T> {
    async fn write(&mut self, value: Option<T>) -> Result<(), StreamError> {
        if let Some(e) = &self.err {
            return Err(e.clone());
        }
        match (self.write_fn)(value).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.err = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if let Some(stop_fn) = &mut self.stop_fn {
            stop_fn(reason).await;
        } else {
            let _ = self.write(None).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn generic_reader_wraps_closure_state() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let n = Arc::new(AtomicUsize::new(0));
            let n2 = n.clone();
            let mut r = GenericReader::new(move || {
                let n = n2.clone();
                async move {
                    let i = n.fetch_add(1, Ordering::SeqCst);
                    if i < 3 {
                        Ok(Some(i))
                    } else {
                        Ok(None)
                    }
                }
            });
            assert_eq!(r.read().await.unwrap(), Some(0));
            assert_eq!(r.read().await.unwrap(), Some(1));
            assert_eq!(r.read().await.unwrap(), Some(2));
            assert_eq!(r.read().await.unwrap(), None);
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn generic_writer_defaults_stop_to_write_end() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let ended = Arc::new(AtomicUsize::new(0));
            let ended2 = ended.clone();
            let mut w = GenericWriter::new(move |v: Option<i32>| {
                let ended = ended2.clone();
                async move {
                    if v.is_none() {
                        ended.store(1, Ordering::SeqCst);
                    }
                    Ok(())
                }
            });
            w.stop(StopReason::None).await;
            assert_eq!(ended.load(Ordering::SeqCst), 1);
        });
    }
}
