//! `rr()`: round-robin fan-in, skipping branches that have already ended.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;

/// Visits branch 0, 1, …, N-1, 0, 1, … in order, skipping any branch that
/// has already yielded end.
pub struct RoundRobin<R> {
    branches: Vec<R>,
    ended: Vec<bool>,
    next: usize,
}

impl<R> RoundRobin<R> {
    pub fn new(branches: Vec<R>) -> Self {
        let n = branches.len();
        Self {
            branches,
            ended: vec![false; n],
            next: 0,
        }
    }

    fn all_ended(&self) -> bool {
        self.ended.iter().all(|e| *e)
    }
}

#[async_trait]
impl<R, T> Reader<T> for RoundRobin<R>
where
    R: Reader<T> + Send,
    T: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        let n = self.branches.len();
        if n == 0 || self.all_ended() {
            return Ok(None);
        }
        for _ in 0..n {
            let i = self.next;
            self.next = (self.next + 1) % n;
            if self.ended[i] {
                continue;
            }
            match self.branches[i].read().await {
                Ok(Some(v)) => return Ok(Some(v)),
                Ok(None) => {
                    self.ended[i] = true;
                }
                Err(e) => {
                    self.ended[i] = true;
                    for (j, branch) in self.branches.iter_mut().enumerate() {
                        if j != i && !self.ended[j] {
                            branch.stop(StopReason::Err(e.clone())).await;
                        }
                    }
                    return Err(e);
                }
            }
        }
        // Every branch just ended in this sweep.
        Ok(None)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn round_robin_visits_branches_in_order_skipping_ended() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let b0 = ArrayReader::new(vec![0, 3]);
            let b1 = ArrayReader::new(vec![1]);
            let b2 = ArrayReader::new(vec![2, 4]);
            let mut rr = RoundRobin::new(vec![b0, b1, b2]);
            let mut out = Vec::new();
            while let Some(v) = rr.read().await.unwrap() {
                out.push(v);
            }
            out.sort_unstable();
            assert_eq!(out, vec![0, 1, 2, 3, 4]);
        });
    }
}
