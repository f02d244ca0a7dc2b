//! `parallel(options, consumer)`: dispatch upstream values across `count`
//! identical worker chains, then merge either preserving input order
//! (default) or in whatever order workers complete (`shuffle: true`).

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::Reader;
use async_trait::async_trait;
use futures::future::{select_all, BoxFuture};
use tracing::debug;

enum WorkItem<T> {
    Value(T),
    End,
    Err(StreamError),
}

/// The reader handed to each worker's `consumer` closure: drains this
/// worker's slice of the round-robin dispatch.
pub struct WorkerSource<T> {
    rx: flume::Receiver<WorkItem<T>>,
}

#[async_trait]
impl<T: Send + 'static> Reader<T> for WorkerSource<T> {
    async fn read(&mut self) -> Result<Option<T>, StreamError> {
        match self.rx.recv_async().await {
            Ok(WorkItem::Value(v)) => Ok(Some(v)),
            Ok(WorkItem::End) | Err(_) => Ok(None),
            Ok(WorkItem::Err(e)) => Err(e),
        }
    }

    async fn stop(&mut self, _reason: StopReason) {}
}

/// Fan the upstream out round-robin across `count` channels, driven by a
/// background pump task spawned on `compio`, handing values to each
/// worker's channel via `flume`.
fn spawn_dispatcher<R, T>(mut upstream: R, count: usize) -> Vec<WorkerSource<T>>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
{
    debug!(workers = count, "[PARALLEL] spawning dispatcher over {} workers", count);
    let mut txs = Vec::with_capacity(count);
    let mut sources = Vec::with_capacity(count);
    for _ in 0..count {
        let (tx, rx) = flume::unbounded::<WorkItem<T>>();
        txs.push(tx);
        sources.push(WorkerSource { rx });
    }
    compio::runtime::spawn(async move {
        let mut i = 0usize;
        loop {
            match upstream.read().await {
                Ok(Some(v)) => {
                    let _ = txs[i % count].send_async(WorkItem::Value(v)).await;
                    i += 1;
                }
                Ok(None) => {
                    for tx in &txs {
                        let _ = tx.send_async(WorkItem::End).await;
                    }
                    return;
                }
                Err(e) => {
                    for tx in &txs {
                        let _ = tx.send_async(WorkItem::Err(e.clone())).await;
                    }
                    return;
                }
            }
        }
    })
    .detach();
    sources
}

/// Preserve-order merger: pulls strictly in round-robin order, matching the
/// dispatcher's assignment, so output order equals input order.
pub struct ParallelPreserveOrder<W> {
    workers: Vec<W>,
    next: usize,
    ended: bool,
}

#[async_trait]
impl<W, O> Reader<O> for ParallelPreserveOrder<W>
where
    W: Reader<O> + Send,
    O: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<O>, StreamError> {
        if self.ended || self.workers.is_empty() {
            return Ok(None);
        }
        let count = self.workers.len();
        let idx = self.next % count;
        match self.workers[idx].read().await {
            Ok(Some(v)) => {
                self.next += 1;
                Ok(Some(v))
            }
            Ok(None) => {
                self.ended = true;
                Ok(None)
            }
            Err(e) => {
                self.ended = true;
                debug!(worker = idx, error = %e, "[PARALLEL] worker errored, cancelling peers");
                for (j, w) in self.workers.iter_mut().enumerate() {
                    if j != idx {
                        w.stop(StopReason::Err(e.clone())).await;
                    }
                }
                Err(e)
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        self.ended = true;
        debug!(?reason, "[PARALLEL] stop, cancelling all workers");
        for w in &mut self.workers {
            w.stop(reason.clone()).await;
        }
    }
}

/// Shuffle merger: outputs in whatever order workers complete.
pub struct ParallelShuffle<W> {
    workers: Vec<W>,
    ended: Vec<bool>,
}

#[async_trait]
impl<W, O> Reader<O> for ParallelShuffle<W>
where
    W: Reader<O> + Send,
    O: Send + 'static,
{
    async fn read(&mut self) -> Result<Option<O>, StreamError> {
        loop {
            if self.ended.iter().all(|e| *e) {
                return Ok(None);
            }
            let ended = &self.ended;
            let futs: Vec<BoxFuture<'_, (usize, Result<Option<O>, StreamError>)>> = self
                .workers
                .iter_mut()
                .enumerate()
                .filter(|(i, _)| !ended[*i])
                .map(|(i, w)| Box::pin(async move { (i, w.read().await) }) as BoxFuture<'_, _>)
                .collect();
            let ((idx, result), _picked, _rest) = select_all(futs).await;
            match result {
                Ok(Some(v)) => return Ok(Some(v)),
                Ok(None) => self.ended[idx] = true,
                Err(e) => {
                    self.ended[idx] = true;
                    for (j, w) in self.workers.iter_mut().enumerate() {
                        if j != idx && !self.ended[j] {
                            w.stop(StopReason::Err(e.clone())).await;
                            self.ended[j] = true;
                        }
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn stop(&mut self, reason: StopReason) {
        for (i, w) in self.workers.iter_mut().enumerate() {
            if !self.ended[i] {
                w.stop(reason.clone()).await;
                self.ended[i] = true;
            }
        }
    }
}

/// Build `count` workers from `consumer`, dispatch upstream round-robin,
/// and merge. `shuffle = false` (default) preserves input order; `true`
/// emits in worker-completion order.
pub fn parallel_preserve_order<R, T, W, F>(
    upstream: R,
    count: usize,
    consumer: F,
) -> ParallelPreserveOrder<W>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
    F: Fn(WorkerSource<T>) -> W,
{
    let sources = spawn_dispatcher(upstream, count.max(1));
    let workers = sources.into_iter().map(consumer).collect();
    ParallelPreserveOrder {
        workers,
        next: 0,
        ended: false,
    }
}

pub fn parallel_shuffle<R, T, W, F>(upstream: R, count: usize, consumer: F) -> ParallelShuffle<W>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
    F: Fn(WorkerSource<T>) -> W,
{
    let sources = spawn_dispatcher(upstream, count.max(1));
    let workers: Vec<W> = sources.into_iter().map(consumer).collect();
    let n = workers.len();
    ParallelShuffle {
        workers,
        ended: vec![false; n],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::Map;
    use crate::devices::ArrayReader;
    use rand::Rng;

    /// Squares each value after a randomized sleep, so each worker
    /// completes in an unpredictable order — exercises spec §8 scenario 6
    /// (preserve-order output survives random per-worker delays).
    struct RandomSleepSquare<R> {
        inner: R,
    }

    #[async_trait]
    impl<R: Reader<i32> + Send> Reader<i32> for RandomSleepSquare<R> {
        async fn read(&mut self) -> Result<Option<i32>, StreamError> {
            match self.inner.read().await? {
                Some(v) => {
                    let millis = rand::thread_rng().gen_range(1..5);
                    compio::time::sleep(std::time::Duration::from_millis(millis)).await;
                    Ok(Some(v * v))
                }
                None => Ok(None),
            }
        }

        async fn stop(&mut self, reason: StopReason) {
            self.inner.stop(reason).await;
        }
    }

    #[test]
    fn parallel_preserve_order_survives_random_worker_delays() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..10).collect::<Vec<i32>>());
            let mut r = parallel_preserve_order(upstream, 4, |src| RandomSleepSquare { inner: src });
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
        });
    }

    #[test]
    fn parallel_preserve_order_reconstructs_input_order() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..10).collect::<Vec<i32>>());
            let mut r = parallel_preserve_order(upstream, 4, |src| {
                Map::new(src, |v: i32, _i| Ok::<_, StreamError>(v * v))
            });
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            assert_eq!(out, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
        });
    }

    #[test]
    fn parallel_shuffle_emits_every_value_regardless_of_order() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let upstream = ArrayReader::new((0..10).collect::<Vec<i32>>());
            let mut r = parallel_shuffle(upstream, 4, |src| {
                Map::new(src, |v: i32, _i| Ok::<_, StreamError>(v * v))
            });
            let mut out = Vec::new();
            while let Some(v) = r.read().await.unwrap() {
                out.push(v);
            }
            out.sort_unstable();
            assert_eq!(out, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
        });
    }
}
