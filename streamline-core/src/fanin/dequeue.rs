//! `dequeue()`: merge readers in order of value arrival.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use futures::future::{select_all, BoxFuture};

/// Pulls all not-yet-finished branches concurrently; whichever produces
/// first is returned first. `select_all` polls branches in index order, so
/// simultaneous readiness ties-break to the lowest branch index.
pub struct Dequeue<R> {
    branches: Vec<R>,
    ended: Vec<bool>,
}

impl<R> Dequeue<R> {
    pub fn new(branches: Vec<R>) -> Self {
        let n = branches.len();
        Self {
            branches,
            ended: vec![false; n],
        }
    }
}

#[async_trait]
impl<R, T> Reader<T> for Dequeue<R>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        loop {
            if self.ended.iter().all(|e| *e) {
                return Ok(None);
            }
            let ended = &self.ended;
            let futs: Vec<BoxFuture<'_, (usize, Result<Option<T>, StreamError>)>> = self
                .branches
                .iter_mut()
                .enumerate()
                .filter(|(i, _)| !ended[*i])
                .map(|(i, branch)| Box::pin(async move { (i, branch.read().await) }) as BoxFuture<'_, _>)
                .collect();
            let ((idx, result), _picked, _rest) = select_all(futs).await;
            match result {
                Ok(Some(v)) => return Ok(Some(v)),
                Ok(None) => {
                    self.ended[idx] = true;
                }
                Err(e) => {
                    self.ended[idx] = true;
                    for (j, branch) in self.branches.iter_mut().enumerate() {
                        if j != idx && !self.ended[j] {
                            branch.stop(StopReason::Err(e.clone())).await;
                            self.ended[j] = true;
                        }
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        for (i, branch) in self.branches.iter_mut().enumerate() {
            if !self.ended[i] {
                branch.stop(reason.clone()).await;
                self.ended[i] = true;
            }
        }
    }
}
