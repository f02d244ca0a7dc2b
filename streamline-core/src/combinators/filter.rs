//! `filter`: drop non-matching values.

use crate::combinators::query::Predicate;
use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;

/// Drops values for which `predicate` returns `false`. The input index
/// passed to a closure predicate is the upstream's own read index — `filter`
/// does not renumber.
pub struct Filter<R, T> {
    upstream: R,
    predicate: Predicate<T>,
    ended: bool,
}

impl<R, T> Filter<R, T> {
    pub fn new(upstream: R, predicate: impl Into<Predicate<T>>) -> Self {
        Self {
            upstream,
            predicate: predicate.into(),
            ended: false,
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Filter<R, T>
where
    R: Reader<T> + Send,
    T: Send + PartialOrd + PartialEq + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        loop {
            match self.upstream.read().await {
                Ok(Some(v)) => {
                    if self.predicate.matches(&v) {
                        return Ok(Some(v));
                    }
                }
                Ok(None) => {
                    self.ended = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.ended = true;
                    return Err(e);
                }
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
    fn filter_drops_non_matching_with_closure() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2, 3, 4, 5, 6]);
            let mut r = Filter::new(upstream, |v: &i32| v % 2 == 0);
            assert_eq!(r.read().await.unwrap(), Some(2));
            assert_eq!(r.read().await.unwrap(), Some(4));
            assert_eq!(r.read().await.unwrap(), Some(6));
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn filter_accepts_mongo_style_query() {
        use crate::combinators::query::Query;
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 5, 10, 15, 20]);
            let mut r = Filter::new(upstream, Query::Gte(10));
            assert_eq!(r.read().await.unwrap(), Some(10));
            assert_eq!(r.read().await.unwrap(), Some(15));
            assert_eq!(r.read().await.unwrap(), Some(20));
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn filter_propagates_upstream_error() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let mut upstream: ArrayReader<i32> = ArrayReader::new(vec![1, 2, 3]);
            upstream.stop(StopReason::Err(StreamError::msg("boom"))).await;
            let mut r = Filter::new(upstream, |_: &i32| true);
            assert!(r.read().await.is_err());
            assert_eq!(r.read().await.unwrap(), None);
        });
    }
}
