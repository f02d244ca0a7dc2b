//! `join(joinerFn)`: pull one value from every active branch each cycle,
//! let the joiner reassemble or partially consume them.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use futures::future::join_all;

/// `joiner` receives `&mut [Option<T>]` — index i is branch i's value, or
/// `None` if that branch has ended or wasn't re-pulled this cycle. It must
/// take ownership of (`.take()`) whichever entries it consumed; those slots
/// are re-pulled next cycle, the rest are left alone.
pub struct Join<R, T, F> {
    branches: Vec<R>,
    ended: Vec<bool>,
    slots: Vec<Option<T>>,
    joiner: F,
}

impl<R, T, F> Join<R, T, F> {
    pub fn new(branches: Vec<R>, joiner: F) -> Self {
        let n = branches.len();
        Self {
            branches,
            ended: vec![false; n],
            slots: (0..n).map(|_| None).collect(),
            joiner,
        }
    }
}

#[async_trait]
impl<R, T, U, F> Reader<U> for Join<R, T, F>
where
    R: Reader<T> + Send,
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(&mut [Option<T>]) -> Option<U> + Send,
{
    async fn read(&mut self) -> Result<Option<U>, StreamError> {
        loop {
            if self.ended.iter().all(|e| *e) && self.slots.iter().all(Option::is_none) {
                return Ok(None);
            }

            let to_pull: Vec<usize> = (0..self.branches.len())
                .filter(|&i| !self.ended[i] && self.slots[i].is_none())
                .collect();

            if !to_pull.is_empty() {
                let branches = &mut self.branches;
                let results = join_all(to_pull.iter().map(|&i| {
                    let branch = &mut branches[i];
                    async move { (i, branch.read().await) }
                }))
                .await;
                for (i, result) in results {
                    match result {
                        Ok(Some(v)) => self.slots[i] = Some(v),
                        Ok(None) => self.ended[i] = true,
                        Err(e) => {
                            self.ended[i] = true;
                            for (j, branch) in self.branches.iter_mut().enumerate() {
                                if j != i && !self.ended[j] {
                                    branch.stop(StopReason::Err(e.clone())).await;
                                    self.ended[j] = true;
                                }
                            }
                            return Err(e);
                        }
                    }
                }
            }

            if let Some(out) = (self.joiner)(&mut self.slots) {
                return Ok(Some(out));
            }

            if self.ended.iter().all(|e| *e) && self.slots.iter().all(Option::is_none) {
                return Ok(None);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn join_pairs_values_and_consumes_both_slots() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let b0 = ArrayReader::new(vec![1, 2, 3]);
            let b1 = ArrayReader::new(vec![10, 20, 30]);
            let mut j = Join::new(vec![b0, b1], |slots: &mut [Option<i32>]| {
                if slots[0].is_some() && slots[1].is_some() {
                    let sum = slots[0].take().unwrap() + slots[1].take().unwrap();
                    Some(sum)
                } else {
                    None
                }
            });
            assert_eq!(j.read().await.unwrap(), Some(11));
            assert_eq!(j.read().await.unwrap(), Some(22));
            assert_eq!(j.read().await.unwrap(), Some(33));
            assert_eq!(j.read().await.unwrap(), None);
        });
    }
}
