//! `map`: one-to-one transform.

use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use std::marker::PhantomData;

/// `fn` receives the value and its zero-based input index. Exceptions
/// from `fn` surface as the next `read()`'s error and stop upstream.
pub struct Map<R, F, T, U> {
    upstream: R,
    f: F,
    index: usize,
    ended: bool,
    _marker: PhantomData<fn(T) -> U>,
}

impl<R, F, T, U> Map<R, F, T, U> {
    pub fn new(upstream: R, f: F) -> Self {
        Self {
            upstream,
            f,
            index: 0,
            ended: false,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R, F, T, U> Reader<U> for Map<R, F, T, U>
where
    R: Reader<T> + Send,
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T, usize) -> Result<U, StreamError> + Send,
{
    async fn read(&mut self) -> Result<Option<U>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        match self.upstream.read().await {
            Ok(Some(v)) => {
                let idx = self.index;
                self.index += 1;
                match (self.f)(v, idx) {
                    Ok(u) => Ok(Some(u)),
                    Err(e) => {
                        self.ended = true;
                        self.upstream.stop(StopReason::Err(e.clone())).await;
                        Err(e)
                    }
                }
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
    fn map_applies_fn_with_input_index() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![10, 20, 30]);
            let mut r = Map::new(upstream, |v, i| Ok::<_, StreamError>((v, i)));
            assert_eq!(r.read().await.unwrap(), Some((10, 0)));
            assert_eq!(r.read().await.unwrap(), Some((20, 1)));
            assert_eq!(r.read().await.unwrap(), Some((30, 2)));
            assert_eq!(r.read().await.unwrap(), None);
        });
    }

    #[test]
    fn map_error_stops_upstream_and_surfaces() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new(vec![1, 2, 3]);
            let mut r = Map::new(upstream, |v: i32, _i| {
                if v == 2 {
                    Err(StreamError::msg("bad value"))
                } else {
                    Ok(v)
                }
            });
            assert_eq!(r.read().await.unwrap(), Some(1));
            assert!(r.read().await.is_err());
            assert_eq!(r.read().await.unwrap(), None);
        });
    }
}
