//! `fork(consumers)`: N-way `dup`, with one queue per consumer branch.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_lock::Mutex;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

struct Branch<T> {
    queue: VecDeque<T>,
    closed: Option<StopReason>,
}

impl<T> Branch<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            closed: None,
        }
    }
}

struct Shared<R, T> {
    upstream: Option<R>,
    branches: Vec<Branch<T>>,
    upstream_ended: bool,
}

impl<R, T> Shared<R, T>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    async fn pump_once(&mut self) -> Result<(), StreamError> {
        if self.upstream_ended {
            return Ok(());
        }
        let Some(upstream) = self.upstream.as_mut() else {
            return Ok(());
        };
        match upstream.read().await {
            Ok(Some(v)) => {
                for branch in &mut self.branches {
                    if branch.closed.is_none() {
                        branch.queue.push_back(v.clone());
                    }
                }
                Ok(())
            }
            Ok(None) => {
                self.upstream_ended = true;
                for branch in &mut self.branches {
                    if branch.closed.is_none() {
                        branch.closed = Some(StopReason::None);
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.upstream_ended = true;
                for branch in &mut self.branches {
                    if branch.closed.is_none() {
                        branch.closed = Some(StopReason::Err(e.clone()));
                    }
                }
                Err(e)
            }
        }
    }
}

/// A single branch handle produced by `fork`, indexing into the shared
/// per-consumer queue registry.
pub struct ForkBranch<R, T> {
    shared: Arc<Mutex<Shared<R, T>>>,
    index: usize,
}

#[async_trait]
impl<R, T> Reader<T> for ForkBranch<R, T>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        loop {
            let mut shared = self.shared.lock().await;
            if let Some(v) = shared.branches[self.index].queue.pop_front() {
                // Look one step ahead once this branch's own queue runs dry,
                // so every other branch already has this value's neighbor
                // buffered before a stop on this branch can land (spec §8
                // scenario 3 / §5 ordering guarantee 3, generalized from
                // `dup`'s two-way case to fork's N-way one).
                if shared.branches[self.index].queue.is_empty() && shared.branches[self.index].closed.is_none() {
                    let _ = shared.pump_once().await;
                }
                return Ok(Some(v));
            }
            if let Some(reason) = shared.branches[self.index].closed.clone() {
                return match reason {
                    StopReason::Err(e) => Err(e),
                    _ => Ok(None),
                };
            }
            let _ = shared.pump_once().await;
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        let mut shared = self.shared.lock().await;
        if shared.branches[self.index].closed.is_some() {
            return;
        }
        trace!(branch = self.index, ?reason, "[FORK] branch stop");
        match &reason {
            StopReason::None => {
                shared.branches[self.index].closed = Some(StopReason::None);
                let all_closed = shared.branches.iter().all(|b| b.closed.is_some());
                if all_closed {
                    if let Some(mut upstream) = shared.upstream.take() {
                        debug!("[FORK] all branches closed, stopping upstream");
                        upstream.stop(StopReason::None).await;
                    }
                }
            }
            StopReason::Silent => {
                for branch in &mut shared.branches {
                    if branch.closed.is_none() {
                        branch.closed = Some(StopReason::Silent);
                    }
                }
                if let Some(mut upstream) = shared.upstream.take() {
                    debug!("[FORK] silent stop, closing peers and stopping upstream");
                    upstream.stop(StopReason::Silent).await;
                }
            }
            StopReason::Err(e) => {
                for branch in &mut shared.branches {
                    if branch.closed.is_none() {
                        branch.closed = Some(StopReason::Err(e.clone()));
                    }
                }
                if let Some(mut upstream) = shared.upstream.take() {
                    debug!(error = %e, "[FORK] error stop, aborting peers and upstream");
                    upstream.stop(StopReason::Err(e.clone())).await;
                }
            }
        }
    }
}

/// `fork(consumers)`: build `consumers.len()` per-branch queues eagerly,
/// pull upstream lazily, and apply each consumer function to its private
/// raw branch reader. Returns the transformed readers in order.
pub fn fork<R, T, F, O>(upstream: R, consumers: Vec<F>) -> Vec<O>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
    F: FnOnce(ForkBranch<R, T>) -> O,
{
    let n = consumers.len();
    debug!(branches = n, "[FORK] creating {}-way fork over upstream", n);
    let shared = Arc::new(Mutex::new(Shared {
        upstream: Some(upstream),
        branches: (0..n).map(|_| Branch::new()).collect(),
        upstream_ended: false,
    }));
    consumers
        .into_iter()
        .enumerate()
        .map(|(index, consumer)| {
            consumer(ForkBranch {
                shared: shared.clone(),
                index,
            })
        })
        .collect()
}

/// The aggregate `fork` returns: the transformed per-branch readers plus
/// the fan-in operators that can merge them back into one reader.
pub struct ForkAggregate<O> {
    readers: Vec<O>,
}

impl<O> ForkAggregate<O> {
    #[must_use]
    pub fn new(readers: Vec<O>) -> Self {
        Self { readers }
    }

    #[must_use]
    pub fn readers(self) -> Vec<O> {
        self.readers
    }

    #[must_use]
    pub fn dequeue(self) -> crate::fanin::Dequeue<O> {
        crate::fanin::Dequeue::new(self.readers)
    }

    #[must_use]
    pub fn rr(self) -> crate::fanin::RoundRobin<O> {
        crate::fanin::RoundRobin::new(self.readers)
    }

    pub fn join<T, U, F>(self, joiner: F) -> crate::fanin::Join<O, T, F>
    where
        O: Reader<T>,
        F: FnMut(&mut [Option<T>]) -> Option<U> + Send,
    {
        crate::fanin::Join::new(self.readers, joiner)
    }
}

/// `fork` that returns the aggregate directly, matching spec §4.4.3.
pub fn fork_aggregate<R, T, F, O>(upstream: R, consumers: Vec<F>) -> ForkAggregate<O>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
    F: FnOnce(ForkBranch<R, T>) -> O,
{
    ForkAggregate::new(fork(upstream, consumers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::ArrayReader;

    #[test]
    fn fork_dispatches_to_every_branch() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..4).collect::<Vec<i32>>());
            let branches = fork(upstream, vec![|r| r, |r| r, |r| r]);
            let mut outs = Vec::new();
            for mut b in branches {
                let mut out = Vec::new();
                while let Some(v) = b.read().await.unwrap() {
                    out.push(v);
                }
                outs.push(out);
            }
            assert_eq!(outs, vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3], vec![0, 1, 2, 3]]);
        });
    }

    #[test]
    fn fork_branch_error_stop_surfaces_on_others() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..4).collect::<Vec<i32>>());
            let mut branches = fork(upstream, vec![|r| r, |r| r]);
            let mut b1 = branches.pop().unwrap();
            let mut b0 = branches.pop().unwrap();
            assert_eq!(b0.read().await.unwrap(), Some(0));
            // b0's own queue ran dry delivering 0, which looks one value
            // ahead for every branch, so b1 already has 0 and 1 buffered.
            b0.stop(StopReason::Err(StreamError::msg("bad branch"))).await;
            assert_eq!(b1.read().await.unwrap(), Some(0));
            assert_eq!(b1.read().await.unwrap(), Some(1));
            assert!(b1.read().await.is_err());
        });
    }
}
