//! `tee(secondary)`: mirror every value read to a secondary writer.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use async_trait::async_trait;
use tracing::debug;

/// Reads from upstream, writes a copy to `secondary`, then returns the
/// value. If `secondary.write` fails, the error propagates downstream and
/// upstream is stopped with that error (spec §4.4.1 / §9 open question).
pub struct Tee<R, W> {
    upstream: R,
    secondary: W,
    ended: bool,
    drained: bool,
}

impl<R, W> Tee<R, W> {
    pub fn new(upstream: R, secondary: W) -> Self {
        Self {
            upstream,
            secondary,
            ended: false,
            drained: false,
        }
    }
}

#[async_trait]
impl<R, W, T> Reader<T> for Tee<R, W>
where
    R: Reader<T> + Send,
    W: Writer<T> + Send,
    T: Send + Clone + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        match self.upstream.read().await {
            Ok(Some(v)) => match self.secondary.write(Some(v.clone())).await {
                Ok(()) => Ok(Some(v)),
                Err(e) => {
                    self.ended = true;
                    debug!(error = %e, "[TEE] secondary writer refused a value, stopping upstream");
                    self.upstream.stop(StopReason::Err(e.clone())).await;
                    Err(e)
                }
            },
            Ok(None) => {
                self.ended = true;
                self.drained = true;
                let _ = self.secondary.write(None).await;
                Ok(None)
            }
            Err(e) => {
                self.ended = true;
                Err(e)
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.ended {
            return;
        }
        self.ended = true;
        debug!(?reason, drained = self.drained, "[TEE] stop");
        self.upstream.stop(reason.clone()).await;
        if self.drained {
            let _ = self.secondary.write(None).await;
        } else {
            self.secondary.stop(reason).await;
        }
    }

    fn headers(&self) -> Option<&Headers> {
        self.upstream.headers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{ArrayReader, ArrayWriter};
    use crate::writer::Accumulates;

    #[test]
    fn tee_mirrors_values_to_secondary() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2, 3]);
            let secondary = ArrayWriter::new();
            let mut r = Tee::new(upstream, secondary);
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![1, 2, 3]);
            assert_eq!(r.secondary.result(), vec![1, 2, 3]);
        });
    }

    #[test]
    fn tee_secondary_failure_propagates_and_stops_upstream() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![0, 1, 2, 3, 4, 5]);
            let secondary = crate::devices::GenericWriter::new(move |v: Option<i32>| async move {
                match v {
                    Some(3) => Err(StreamError::msg("secondary refused 3")),
                    _ => Ok(()),
                }
            });
            let mut r = Tee::new(upstream, secondary);
            let mut out = Vec::new();
            loop {
                match r.read().await {
                    Ok(Some(v)) => out.push(v),
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
            assert_eq!(out, vec![0, 1, 2]);
        });
    }
}
