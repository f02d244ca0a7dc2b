//! Bridges from the pull `Reader`/`Writer` contracts to `futures::Stream`
//! and `futures::Sink`, for call sites already wired against the push
//! ecosystem (combinators from `StreamExt`/`SinkExt`, `select!`, etc.)
//!
//! Rather than hand-implement `poll_next`/`poll_ready` against an
//! `async_trait` reader (which would need a self-referential future held
//! across poll calls), both bridges are built on `futures::stream::unfold`
//! / `futures::sink::unfold`: each poll drives the *whole* `read()`/
//! `write()` future to completion through a boxed, `Unpin`-friendly state
//! machine that `unfold` already manages correctly.

use crate::pause::PauseHandle;
use futures::sink::{self, Sink};
use futures::stream::{self, Stream};
use streamline_core::error::StreamError;
use streamline_core::stop::StopReason;
use streamline_core::{Reader, Writer};
use tracing::debug;

/// Internal state carried between `unfold` polls: the reader plus the
/// pause gate it checks before every pull, plus whether it has already
/// ended (so end-stickiness holds even if the caller keeps polling).
struct ReaderState<R> {
    reader: R,
    pause: Option<PauseHandle>,
    ended: bool,
}

/// Wrap a reader as a `Stream<Item = Result<T, StreamError>>`.
pub fn reader_stream<R, T>(reader: R) -> impl Stream<Item = Result<T, StreamError>>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
{
    reader_stream_with_pause(reader, None)
}

/// Same as [`reader_stream`], but checks `pause` before every pull; while
/// paused, the stream parks instead of calling `read()`.
pub fn reader_stream_with_pause<R, T>(
    reader: R,
    pause: Option<PauseHandle>,
) -> impl Stream<Item = Result<T, StreamError>>
where
    R: Reader<T> + Send + 'static,
    T: Send + 'static,
{
    let state = ReaderState {
        reader,
        pause,
        ended: false,
    };
    stream::unfold(state, |mut state| async move {
        if state.ended {
            return None;
        }
        if let Some(pause) = &state.pause {
            pause.wait_until_resumed().await;
        }
        match state.reader.read().await {
            Ok(Some(value)) => Some((Ok(value), state)),
            Ok(None) => {
                state.ended = true;
                None
            }
            Err(e) => {
                state.ended = true;
                Some((Err(e), state))
            }
        }
    })
}

/// Wrap a writer as a `Sink<Option<T>, Error = StreamError>`. Sending
/// `Some(v)` is `write(Some(v))`; sending `None` is `write(None)` — the
/// writer's own end signal — and after that every further send fails with
/// [`StreamError::WriteAfterEnd`], same as driving the writer directly.
/// Modeled over `Option<T>` rather than bare `T` since `futures::sink`
/// gives no hook for "translate stream close into one last write"; the
/// caller sends the `None` itself, same as any other value.
pub fn writer_sink<W, T>(writer: W) -> impl Sink<Option<T>, Error = StreamError>
where
    W: Writer<T> + Send + 'static,
    T: Send + 'static,
{
    sink::unfold(writer, |mut writer, value: Option<T>| async move {
        writer.write(value).await?;
        Ok::<_, StreamError>(writer)
    })
}

/// Drive `writer.stop(reason)` then drop it. Not part of the `Sink`
/// contract (there is no `StopReason` in `Sink::close`'s signature), so
/// exposed as a free function for callers that need the distinction
/// between a clean end and an aborted one.
pub async fn stop_writer<W, T>(mut writer: W, reason: StopReason)
where
    W: Writer<T> + Send,
    T: Send,
{
    debug!(?reason, "[NODIFY] stopping sink-side writer");
    writer.stop(reason).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use streamline_core::devices::{ArrayReader, ArrayWriter};

    #[test]
    fn reader_stream_yields_values_then_ends() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3]);
            let mut stream = Box::pin(reader_stream(reader));
            assert_eq!(stream.next().await, Some(Ok(1)));
            assert_eq!(stream.next().await, Some(Ok(2)));
            assert_eq!(stream.next().await, Some(Ok(3)));
            assert_eq!(stream.next().await, None);
            assert_eq!(stream.next().await, None);
        });
    }

    #[test]
    fn reader_stream_surfaces_error_then_ends() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            struct Failing;

            #[async_trait::async_trait]
            impl Reader<i32> for Failing {
                async fn read(&mut self) -> Result<Option<i32>, StreamError> {
                    Err(StreamError::protocol("boom"))
                }
                async fn stop(&mut self, _reason: StopReason) {}
            }

            let mut stream = Box::pin(reader_stream(Failing));
            let first = stream.next().await.unwrap();
            assert!(first.is_err());
            assert_eq!(stream.next().await, None);
        });
    }

    #[test]
    fn reader_stream_pause_blocks_until_resumed() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2]);
            let pause = PauseHandle::new();
            pause.pause();
            let mut stream = Box::pin(reader_stream_with_pause(reader, Some(pause.clone())));

            let waiter = compio::runtime::spawn(async move { stream.next().await });
            compio::time::sleep(std::time::Duration::from_millis(20)).await;
            pause.resume();
            let first = waiter.await.unwrap();
            assert_eq!(first, Some(Ok(1)));
        });
    }

    #[test]
    fn writer_sink_forwards_values_and_close() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let writer = ArrayWriter::new();
            let mut sink = Box::pin(writer_sink(writer));
            sink.send(Some(1)).await.unwrap();
            sink.send(Some(2)).await.unwrap();
            sink.send(None).await.unwrap();
            assert!(sink.send(Some(3)).await.is_err());
        });
    }
}
