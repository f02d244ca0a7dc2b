//! `buffer(max)`: eagerly pull up to `max` values ahead of consumer demand.
//!
//! Unlike `devices::buffer` (a byte-chunk device), this combinator works
//! over any reader and any element type: it runs a background pump task
//! that pulls upstream into a bounded FIFO so the downstream puller's
//! `read()` mostly just drains an already-full queue instead of waiting on
//! upstream each time.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use std::collections::VecDeque;

enum Slot<T> {
    Value(T),
    End,
    Err(StreamError),
}

/// Eagerly buffers up to `max` upstream values using a pump task driven by
/// `flume`, handing values from the producer task to its consumer.
pub struct BufferAhead<R, T> {
    state: State<R, T>,
}

enum State<R, T> {
    NotStarted(Option<R>, usize),
    Running {
        rx: flume::Receiver<Slot<T>>,
        task: Option<compio::runtime::JoinHandle<()>>,
    },
    Ended,
}

impl<R, T> BufferAhead<R, T> {
    pub fn new(upstream: R, max: usize) -> Self {
        Self {
            state: State::NotStarted(Some(upstream), max.max(1)),
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for BufferAhead<R, T>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if let State::NotStarted(upstream, max) = &mut self.state {
            let mut upstream = upstream.take().expect("not started implies present");
            let max = *max;
            let (tx, rx) = flume::bounded::<Slot<T>>(max);
            let task = compio::runtime::spawn(async move {
                loop {
                    match upstream.read().await {
                        Ok(Some(v)) => {
                            if tx.send_async(Slot::Value(v)).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            let _ = tx.send_async(Slot::End).await;
                            return;
                        }
                        Err(e) => {
                            let _ = tx.send_async(Slot::Err(e)).await;
                            return;
                        }
                    }
                }
            });
            self.state = State::Running {
                rx,
                task: Some(task),
            };
        }

        match &mut self.state {
            State::Running { rx, .. } => {
                match rx.recv_async().await {
                    Ok(Slot::Value(v)) => Ok(Some(v)),
                    Ok(Slot::End) => {
                        self.state = State::Ended;
                        Ok(None)
                    }
                    Ok(Slot::Err(e)) => {
                        self.state = State::Ended;
                        Err(e)
                    }
                    Err(_) => {
                        self.state = State::Ended;
                        Ok(None)
                    }
                }
            }
            State::Ended => Ok(None),
            State::NotStarted(..) => unreachable!("started above"),
        }
    }

    async fn stop(&mut self, _reason: StopReason) {
        if let State::Running { task, .. } = &mut self.state {
            if let Some(task) = task.take() {
                task.detach();
            }
        }
        self.state = State::Ended;
    }

    fn headers(&self) -> Option<&Headers> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn buffer_ahead_preserves_values_and_order() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..20).collect::<Vec<i32>>());
            let mut r = BufferAhead::new(upstream, 4);
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, (0..20).collect::<Vec<i32>>());
        });
    }

    #[test]
    fn buffer_ahead_surfaces_upstream_error() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut upstream: ArrayReader<i32> = ArrayReader::new(vec![1, 2]);
            upstream.stop(StopReason::Err(StreamError::msg("boom"))).await;
            let mut r = BufferAhead::new(upstream, 2);
            assert!(r.read().await.is_err());
        });
    }
}
