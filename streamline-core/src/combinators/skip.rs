//! `skip(n)`: consume and drop the first n values lazily on the first read.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;

pub struct Skip<R> {
    upstream: R,
    remaining: usize,
    skipped: bool,
}

impl<R> Skip<R> {
    pub fn new(upstream: R, n: usize) -> Self {
        Self {
            upstream,
            remaining: n,
            skipped: false,
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Skip<R>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if !self.skipped {
            self.skipped = true;
            while self.remaining > 0 {
                self.remaining -= 1;
                match self.upstream.read().await? {
                    Some(_) => {}
                    None => return Ok(None),
                }
            }
        }
        self.upstream.read().await
    }

    async fn stop(&mut self, reason: StopReason) {
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
    fn skip_drops_first_n_values_lazily() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..10).collect::<Vec<i32>>());
            let mut r = Skip::new(upstream, 2);
            assert_eq!(r.read().await.unwrap(), Some(2));
            assert_eq!(r.read().await.unwrap(), Some(3));
        });
    }

    #[test]
    fn skip_more_than_available_yields_end() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2]);
            let mut r = Skip::new(upstream, 5);
            assert_eq!(r.read().await.unwrap(), None);
        });
    }
}
