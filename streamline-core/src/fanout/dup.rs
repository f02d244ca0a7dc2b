//! `dup()`: two readers sharing one upstream via independent unbounded
//! queues and a single shared puller.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use async_lock::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-branch state: its queue plus whether it has been stopped and with
/// what reason.
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

/// Shared state behind both `dup` branches: the upstream reader plus each
/// branch's queue. Protected by a single `async-lock::Mutex` since the
/// single-threaded executor means no true contention, only interleaving.
struct Shared<R, T> {
    upstream: Option<R>,
    branches: [Branch<T>; 2],
    upstream_ended: bool,
}

pub struct DupBranch<R, T> {
    shared: Arc<Mutex<Shared<R, T>>>,
    index: usize,
}

/// Build two readers sharing a single upstream. Each maintains its own
/// unbounded queue; the shared puller advances upstream whenever either
/// queue is empty and that branch is still open.
pub fn dup<R, T>(upstream: R) -> (DupBranch<R, T>, DupBranch<R, T>)
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    debug!("[DUP] creating 2-way dup over upstream");
    let shared = Arc::new(Mutex::new(Shared {
        upstream: Some(upstream),
        branches: [Branch::new(), Branch::new()],
        upstream_ended: false,
    }));
    (
        DupBranch {
            shared: shared.clone(),
            index: 0,
        },
        DupBranch { shared, index: 1 },
    )
}

impl<R, T> Shared<R, T>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    /// Pull exactly one upstream value (if upstream is still alive and not
    /// yet ended) and fan it out to every still-open branch's queue.
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

#[async_trait]
impl<R, T> Reader<T> for DupBranch<R, T>
where
    R: Reader<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        loop {
            let mut shared = self.shared.lock().await;
            if let Some(v) = shared.branches[self.index].queue.pop_front() {
                // Look one step ahead once this branch's own queue runs dry,
                // so the peer already has this value's neighbor buffered
                // before a stop on this branch can land (spec §8 scenario 3,
                // §5 ordering guarantee 3: values queued to a branch before a
                // peer's stop are still delivered to it).
                if shared.branches[self.index].queue.is_empty() && shared.branches[self.index].closed.is_none() {
                    let _ = shared.pump_once().await;
                }
                return Ok(Some(v));
            }
            // Queue empty: check for a terminal state queued after drain.
            if let Some(reason) = shared.branches[self.index].closed.clone() {
                return match reason {
                    StopReason::Err(e) => Err(e),
                    _ => Ok(None),
                };
            }
            // Nothing buffered and branch still open: pump upstream once.
            // Errors from pump_once land in `closed` for every open branch,
            // including this one, so loop back around to observe it.
            let _ = shared.pump_once().await;
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        let mut shared = self.shared.lock().await;
        if shared.branches[self.index].closed.is_some() {
            return;
        }
        trace!(branch = self.index, ?reason, "[DUP] branch stop");
        match &reason {
            StopReason::None => {
                shared.branches[self.index].closed = Some(StopReason::None);
                let all_closed = shared.branches.iter().all(|b| b.closed.is_some());
                if all_closed {
                    if let Some(mut upstream) = shared.upstream.take() {
                        debug!("[DUP] all branches closed, stopping upstream");
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
                    debug!("[DUP] silent stop, closing peer and stopping upstream");
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
                    debug!(error = %e, "[DUP] error stop, aborting peer and upstream");
                    upstream.stop(StopReason::Err(e.clone())).await;
                }
            }
        }
    }
}
