//! Array reader/writer devices: the simplest concrete source and sink.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::writer::Accumulates;
use crate::{Reader, Writer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

/// A reader over an in-memory slice, copied on construction and shifted
/// one element per read.
pub struct ArrayReader<T> {
    items: VecDeque<T>,
    sync: bool,
    position: usize,
    stop_called: bool,
    pending_reason: Option<StopReason>,
    headers: Option<Headers>,
}

impl<T: Send> ArrayReader<T> {
    /// Build a reader over `items`, read synchronously (no forced yield
    /// between reads — the default).
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            sync: true,
            position: 0,
            stop_called: false,
            pending_reason: None,
            headers: None,
        }
    }

    /// When `sync` is `false`, each `read()` yields to the executor once
    /// before returning, modeling a device whose values only become
    /// available after an async tick.
    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Number of values yielded so far — used by tests to assert exactly
    /// where an upstream `stop` landed (see §8 scenario 1).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

#[async_trait]
impl<T: Send> Reader<T> for ArrayReader<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if let Some(reason) = self.pending_reason.take() {
            return match reason {
                StopReason::Err(e) => Err(e),
                _ => Ok(None),
            };
        }
        if !self.sync {
            compio::time::sleep(Duration::from_millis(0)).await;
        }
        match self.items.pop_front() {
            Some(v) => {
                self.position += 1;
                Ok(Some(v))
            }
            None => Ok(None),
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.stop_called {
            return;
        }
        self.stop_called = true;
        self.items.clear();
        self.pending_reason = Some(reason);
    }

    fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }
}

/// A writer that pushes into an internal vector; `result()` returns it.
#[derive(Default)]
pub struct ArrayWriter<T> {
    items: Vec<T>,
    ended: bool,
    err: Option<StreamError>,
}

impl<T: Send> ArrayWriter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ended: false,
            err: None,
        }
    }
}

#[async_trait]
impl<T: Send> Writer<T> for ArrayWriter<T> {
    async fn write(&mut self, value: Option<T>) -> Result<(), StreamError> {
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
            Some(v) => self.items.push(v),
            None => self.ended = true,
        }
        Ok(())
    }
}

impl<T: Clone> Accumulates for ArrayWriter<T> {
    type Output = Vec<T>;

    fn result(&self) -> Vec<T> {
        self.items.clone()
    }
}
