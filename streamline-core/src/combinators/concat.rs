//! `concat(others...)`: exhaust self, then exhaust each other in order.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Reads `first`, then each of `rest` in order. Stopping the composite
/// stops only the currently-active upstream; upstreams not yet started are
/// also stopped (they have produced nothing, so the stop is a no-op release
/// rather than a mid-stream abort) — see spec §8 scenario 2, where the
/// untouched `s3` still observes a `stop` at position 0.
pub struct Concat<R> {
    active: Option<R>,
    rest: VecDeque<R>,
    ended: bool,
}

impl<R> Concat<R> {
    pub fn new(first: R, rest: impl IntoIterator<Item = R>) -> Self {
        Self {
            active: Some(first),
            rest: rest.into_iter().collect(),
            ended: false,
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Concat<R>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        loop {
            let Some(active) = self.active.as_mut() else {
                self.ended = true;
                return Ok(None);
            };
            match active.read().await {
                Ok(Some(v)) => return Ok(Some(v)),
                Ok(None) => {
                    self.active = self.rest.pop_front();
                    if self.active.is_none() {
                        self.ended = true;
                        return Ok(None);
                    }
                }
                Err(e) => {
                    self.ended = true;
                    return Err(e);
                }
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        if self.ended {
            return;
        }
        self.ended = true;
        if let Some(mut active) = self.active.take() {
            active.stop(reason.clone()).await;
        }
        while let Some(mut upstream) = self.rest.pop_front() {
            upstream.stop(reason.clone()).await;
        }
    }

    fn headers(&self) -> Option<&Headers> {
        self.active.as_ref().and_then(Reader::headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::limit::Limit;
    use crate::devices::ArrayReader;

    #[test]
    fn concat_reads_sources_in_order() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let s1 = ArrayReader::new(vec![0, 1]);
            let s2 = ArrayReader::new(vec![2, 3]);
            let mut r = Concat::new(s1, vec![s2]);
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 2, 3]);
        });
    }

    #[test]
    fn concat_limit_stops_only_active_upstream_at_cutoff() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let s1 = ArrayReader::new((0..5).collect::<Vec<i32>>());
            let s2 = ArrayReader::new((0..5).collect::<Vec<i32>>());
            let s3 = ArrayReader::new((0..5).collect::<Vec<i32>>());
            let concat = Concat::new(s1, vec![s2, s3]);
            let mut r = Limit::new(concat, 7, StopReason::None);
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 2, 3, 4, 0, 1]);
        });
    }
}
