//! `transform(fn)`: the most general combinator. `fn` runs as a cooperative
//! task alongside the downstream puller, communicating through a
//! single-slot handshake.

use crate::error::StreamError;
use crate::handshake::{handshake, HandshakeRx};
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use tracing::{debug, trace};

/// The writer handed to a `transform` body: `write`s land in the shared
/// single-slot handshake that the composite reader's `read()` drains.
struct InnerWriter<U> {
    tx: crate::handshake::HandshakeTx<Option<Result<U, StreamError>>>,
    ended: bool,
}

#[async_trait]
impl<U: Send + 'static> Writer<U> for InnerWriter<U> {
    async fn write(&mut self, value: Option<U>) -> Result<(), StreamError> {
        if self.ended {
            return Err(StreamError::WriteAfterEnd);
        }
        match value {
            Some(v) => {
                let _ = self.tx.put(Some(Ok(v))).await;
                Ok(())
            }
            None => {
                self.ended = true;
                Ok(())
            }
        }
    }
}

type Body<R, U> = Box<
    dyn FnOnce(R, InnerWriter<U>) -> BoxFuture<'static, Result<(), StreamError>> + Send,
>;

/// A reader produced by `transform`. Owns the inner reader via the task
/// spawned on first `read()`; communicates through a one-deep handshake.
pub struct Transform<R, U> {
    state: TransformState<R, U>,
}

enum TransformState<R, U> {
    NotStarted {
        upstream: Option<R>,
        body: Option<Body<R, U>>,
    },
    Running {
        rx: HandshakeRx<Option<Result<U, StreamError>>>,
        task: Option<compio::runtime::JoinHandle<Result<(), StreamError>>>,
    },
    Ended,
}

impl<R, U> Transform<R, U> {
    /// `body(inner_reader, inner_writer)` is the cooperative task; it owns
    /// the upstream reader entirely for the lifetime of the transform.
    pub fn new<F, Fut>(upstream: R, body: F) -> Self
    where
        F: FnOnce(R, InnerWriter<U>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), StreamError>> + Send + 'static,
    {
        let boxed_body: Body<R, U> = Box::new(move |r, w| Box::pin(body(r, w)));
        Self {
            state: TransformState::NotStarted {
                upstream: Some(upstream),
                body: Some(boxed_body),
            },
        }
    }
}

#[async_trait]
impl<R, U> Reader<U> for Transform<R, U>
where
    R: Send + 'static,
    U: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<U>, StreamError> {
        if let TransformState::NotStarted { upstream, body } = &mut self.state {
            let upstream = upstream.take().expect("not started implies present");
            let body = body.take().expect("not started implies present");
            trace!("[TRANSFORM] starting body task on first read");
            let (tx, rx) = handshake::<Option<Result<U, StreamError>>>();
            let inner_writer = InnerWriter {
                tx: tx.clone(),
                ended: false,
            };
            let task = compio::runtime::spawn(async move {
                let result = body(upstream, inner_writer).await;
                // Signal completion (success or error) to the reader side.
                let _ = match &result {
                    Ok(()) => tx.put(None).await,
                    Err(e) => tx.put(Some(Err(e.clone()))).await,
                };
                result
            });
            self.state = TransformState::Running {
                rx,
                task: Some(task),
            };
        }

        match &mut self.state {
            // `rx.take()` yields `Option<Option<Result<U, StreamError>>>`:
            // the outer `Option` is the handshake's own "closed" signal, the
            // inner one distinguishes a value (`Some(Ok(v))`) from the
            // body's normal completion (`None`) or failure (`Some(Err(e))`).
            TransformState::Running { rx, .. } => match rx.take().await {
                Some(Some(Ok(v))) => Ok(Some(v)),
                Some(Some(Err(e))) => {
                    self.state = TransformState::Ended;
                    Err(e)
                }
                Some(None) | None => {
                    self.state = TransformState::Ended;
                    Ok(None)
                }
            },
            TransformState::Ended => Ok(None),
            TransformState::NotStarted { .. } => unreachable!("started above"),
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        // The inner task owns the upstream reader directly and is
        // responsible for propagating stop into it; from the outside we
        // can only stop pulling and let the task's completion (or drop)
        // release resources. A well-behaved `body` returns promptly once
        // its writer observes no further demand.
        debug!(?reason, "[TRANSFORM] stop, detaching body task");
        if let TransformState::Running { task, .. } = &mut self.state {
            if let Some(task) = task.take() {
                task.detach();
            }
        }
        self.state = TransformState::Ended;
    }

    fn headers(&self) -> Option<&Headers> {
        None
    }
}
