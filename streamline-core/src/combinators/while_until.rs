//! `while(pred)` / `until(pred, stopArg?)`: end the stream the first time
//! the predicate becomes false/true respectively.

use crate::combinators::query::Predicate;
use crate::error::StreamError;
use crate::headers::Headers;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;

/// Shared engine for `while`/`until`: both stop on the first value for
/// which `predicate.matches` disagrees with `continue_while`. `while`
/// continues while the predicate is true (`continue_while = true`);
/// `until` continues while it is false (`continue_while = false`).
pub struct PredicateGate<R, T> {
    upstream: R,
    predicate: Predicate<T>,
    continue_while: bool,
    stop_arg: StopReason,
    ended: bool,
}

impl<R, T> PredicateGate<R, T> {
    pub fn new(
        upstream: R,
        predicate: impl Into<Predicate<T>>,
        continue_while: bool,
        stop_arg: StopReason,
    ) -> Self {
        Self {
            upstream,
            predicate: predicate.into(),
            continue_while,
            stop_arg,
            ended: false,
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for PredicateGate<R, T>
where
    R: Reader<T> + Send,
    T: Send + PartialOrd + PartialEq + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        if self.ended {
            return Ok(None);
        }
        match self.upstream.read().await {
            Ok(Some(v)) => {
                let keep_going = self.predicate.matches(&v) == self.continue_while;
                if keep_going {
                    Ok(Some(v))
                } else {
                    self.ended = true;
                    self.upstream.stop(self.stop_arg.clone()).await;
                    Ok(None)
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

/// `while(pred)`: pass values through as long as `pred` holds, then end and
/// stop upstream with `stop_arg` (default `None`).
pub fn while_gate<R, T>(
    upstream: R,
    predicate: impl Into<Predicate<T>>,
    stop_arg: StopReason,
) -> PredicateGate<R, T> {
    PredicateGate::new(upstream, predicate, true, stop_arg)
}

/// `until(pred)`: pass values through until `pred` holds, then end and stop
/// upstream with `stop_arg` (default `None`).
pub fn until_gate<R, T>(
    upstream: R,
    predicate: impl Into<Predicate<T>>,
    stop_arg: StopReason,
) -> PredicateGate<R, T> {
    PredicateGate::new(upstream, predicate, false, stop_arg)
}
