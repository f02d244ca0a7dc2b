//! `limit(n, stopArg?)`: deliver at most `n` values, then stop upstream.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use tracing::trace;

/// Delivers at most `n` values from upstream, then stops upstream with
/// `stop_arg` (default `None`, per spec §8 scenario 1) and ends.
pub struct Limit<R> {
    upstream: R,
    remaining: usize,
    stop_arg: StopReason,
    ended: bool,
}

impl<R> Limit<R> {
    pub fn new(upstream: R, n: usize, stop_arg: StopReason) -> Self {
        Self {
            upstream,
            remaining: n,
            stop_arg,
            ended: false,
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Limit<R>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        if self.remaining == 0 {
            self.ended = true;
            self.upstream.stop(self.stop_arg.clone()).await;
            return Ok(None);
        }
        match self.upstream.read().await {
            Ok(Some(v)) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.ended = true;
                    trace!(stop_arg = ?self.stop_arg, "[LIMIT] reached bound, stopping upstream");
                    self.upstream.stop(self.stop_arg.clone()).await;
                }
                Ok(Some(v))
            }
            Ok(None) => {
                self.ended = true;
                Ok(None)
            }
            Err(e) => {
                self.ended = true;
                Err(e)
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        self.ended = true;
        self.upstream.stop(reason).await;
    }

    fn headers(&self) -> Option<&Headers> {
        self.upstream.headers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn limit_caps_output_and_stops_upstream_at_boundary() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..100).collect::<Vec<i32>>());
            let mut r = Limit::new(upstream, 5, StopReason::None);
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 2, 3, 4]);
        });
    }

    #[test]
    fn limit_stops_upstream_immediately_after_nth_value_not_on_next_read() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..10).collect::<Vec<i32>>());
            let mut r = Limit::new(upstream, 5, StopReason::None);
            for _ in 0..5 {
                r.read().await.unwrap();
            }
            // The stop already fired as a side effect of the 5th read, so a
            // 6th `read()` call just observes the already-ended state.
            assert_eq!(r.read().await.unwrap(), None);
        });
    }
}
