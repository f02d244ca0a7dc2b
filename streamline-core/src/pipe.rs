//! Terminal drivers: `pipe` and the reducer family (`each`/`forEach`,
//! `reduce`, `every`/`some`/`find`, `toArray`, `readAll`, `compare`).
//!
//! These are free functions generic over `Reader`/`Writer`, not methods
//! hung off a prototype — matching the re-architecting note in spec §9
//! against prototype decoration.

use crate::error::StreamError;
use crate::stop::StopReason;
use crate::{Reader, Writer};
use std::cmp::Ordering;

/// Drives `writer.write(read())` until upstream ends, then `write(None)`.
/// Returns the writer.
///
/// If `writer.write` raises [`StreamError::StopSignal`] with a `None`/
/// `Silent` reason, that's a graceful early stop (spec §4.6/§7): upstream
/// is stopped with that reason and the writer is returned normally,
/// swallowing the signal rather than surfacing it to the caller. Any
/// other error — including a `StopSignal` carrying `Err(e)` — stops
/// upstream with `Err(e)` and propagates to the caller.
pub async fn pipe<R, W, T>(mut reader: R, mut writer: W) -> Result<W, StreamError>
where
    R: Reader<T> + Send,
    W: Writer<T> + Send,
    T: Send,
{
    loop {
        match reader.read().await {
            Ok(Some(v)) => {
                if let Err(e) = writer.write(Some(v)).await {
                    match e {
                        StreamError::StopSignal(reason) if !matches!(reason, StopReason::Err(_)) => {
                            reader.stop(reason).await;
                            return Ok(writer);
                        }
                        other => {
                            reader.stop(StopReason::Err(other.clone())).await;
                            return Err(other);
                        }
                    }
                }
            }
            Ok(None) => {
                let _ = writer.write(None).await;
                return Ok(writer);
            }
            Err(e) => {
                let _ = writer.write(None).await;
                return Err(e);
            }
        }
    }
}

/// `each`/`forEach`: pulls to exhaustion invoking `f(value, input_index)`;
/// returns the count of values seen.
pub async fn each<R, T, F>(mut reader: R, mut f: F) -> Result<usize, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
    F: FnMut(T, usize),
{
    let mut index = 0;
    loop {
        match reader.read().await? {
            Some(v) => {
                f(v, index);
                index += 1;
            }
            None => return Ok(index),
        }
    }
}

/// `reduce(fn, init)`: strictly sequential left fold.
pub async fn reduce<R, T, A, F>(mut reader: R, init: A, mut f: F) -> Result<A, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
    F: FnMut(A, T, usize) -> A,
{
    let mut acc = init;
    let mut index = 0;
    while let Some(v) = reader.read().await? {
        acc = f(acc, v, index);
        index += 1;
    }
    Ok(acc)
}

/// `every(pred)`: short-circuits and stops upstream with `None` on the
/// first value for which `pred` is false.
pub async fn every<R, T, F>(mut reader: R, mut pred: F) -> Result<bool, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
    F: FnMut(&T) -> bool,
{
    while let Some(v) = reader.read().await? {
        if !pred(&v) {
            reader.stop(StopReason::None).await;
            return Ok(false);
        }
    }
    Ok(true)
}

/// `some(pred)`: short-circuits and stops upstream with `None` on the
/// first value for which `pred` is true.
pub async fn some<R, T, F>(mut reader: R, mut pred: F) -> Result<bool, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
    F: FnMut(&T) -> bool,
{
    while let Some(v) = reader.read().await? {
        if pred(&v) {
            reader.stop(StopReason::None).await;
            return Ok(true);
        }
    }
    Ok(false)
}

/// `find(pred)`: returns the first matching value, stopping upstream with
/// `None` as soon as it's found.
pub async fn find<R, T, F>(mut reader: R, mut pred: F) -> Result<Option<T>, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
    F: FnMut(&T) -> bool,
{
    while let Some(v) = reader.read().await? {
        if pred(&v) {
            reader.stop(StopReason::None).await;
            return Ok(Some(v));
        }
    }
    Ok(None)
}

/// `toArray()`: materialize the entire stream into a `Vec`.
pub async fn to_array<R, T>(mut reader: R) -> Result<Vec<T>, StreamError>
where
    R: Reader<T> + Send,
    T: Send,
{
    let mut out = Vec::new();
    while let Some(v) = reader.read().await? {
        out.push(v);
    }
    Ok(out)
}

/// `readAll()` over a string-chunk reader: concatenates chunks into one
/// `String`.
pub async fn read_all_string<R>(mut reader: R) -> Result<String, StreamError>
where
    R: Reader<String> + Send,
{
    let mut out = String::new();
    while let Some(chunk) = reader.read().await? {
        out.push_str(&chunk);
    }
    Ok(out)
}

/// `readAll()` over a byte-chunk reader: concatenates chunks into one
/// `Bytes`.
pub async fn read_all_bytes<R>(mut reader: R) -> Result<bytes::Bytes, StreamError>
where
    R: Reader<bytes::Bytes> + Send,
{
    let mut out = bytes::BytesMut::new();
    while let Some(chunk) = reader.read().await? {
        out.extend_from_slice(&chunk);
    }
    Ok(out.freeze())
}

/// `compare(other)`: lock-step pull from both readers; returns −1/0/+1 on
/// first difference, or on a length mismatch (whichever reader still has
/// values once the other ends).
pub async fn compare<R1, R2, T>(mut a: R1, mut b: R2) -> Result<Ordering, StreamError>
where
    R1: Reader<T> + Send,
    R2: Reader<T> + Send,
    T: Send + PartialOrd,
{
    loop {
        let (va, vb) = (a.read().await?, b.read().await?);
        match (va, vb) {
            (Some(x), Some(y)) => match x.partial_cmp(&y) {
                Some(Ordering::Equal) => {}
                Some(other) => return Ok(other),
                None => return Ok(Ordering::Equal),
            },
            (Some(_), None) => return Ok(Ordering::Greater),
            (None, Some(_)) => return Ok(Ordering::Less),
            (None, None) => return Ok(Ordering::Equal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{ArrayReader, ArrayWriter};
    use crate::writer::Accumulates;

    #[test]
    fn pipe_drives_writer_to_exhaustion() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3]);
            let writer = ArrayWriter::new();
            let writer = pipe(reader, writer).await.unwrap();
            assert_eq!(writer.result(), vec![1, 2, 3]);
        });
    }

    #[test]
    fn each_invokes_with_input_index() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec!["a", "b", "c"]);
            let mut seen = Vec::new();
            let count = each(reader, |v, i| seen.push((v, i))).await.unwrap();
            assert_eq!(count, 3);
            assert_eq!(seen, vec![("a", 0), ("b", 1), ("c", 2)]);
        });
    }

    #[test]
    fn reduce_folds_left_to_right() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3, 4]);
            let sum = reduce(reader, 0, |acc, v, _i| acc + v).await.unwrap();
            assert_eq!(sum, 10);
        });
    }

    #[test]
    fn every_short_circuits_on_first_failure() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![2, 4, 5, 6]);
            assert!(!every(reader, |v: &i32| v % 2 == 0).await.unwrap());
        });
    }

    #[test]
    fn some_short_circuits_on_first_match() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 3, 4, 5]);
            assert!(some(reader, |v: &i32| v % 2 == 0).await.unwrap());
        });
    }

    #[test]
    fn find_returns_first_match() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 3, 4, 5]);
            assert_eq!(find(reader, |v: &i32| v % 2 == 0).await.unwrap(), Some(4));
        });
    }

    #[test]
    fn to_array_materializes_values() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3]);
            assert_eq!(to_array(reader).await.unwrap(), vec![1, 2, 3]);
        });
    }

    #[test]
    fn compare_detects_first_difference() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let a = ArrayReader::new(vec![1, 2, 3]);
            let b = ArrayReader::new(vec![1, 2, 4]);
            assert_eq!(compare(a, b).await.unwrap(), Ordering::Less);
        });
    }

    #[test]
    fn read_all_string_concatenates_chunks() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = crate::devices::StringReader::new("hello world").with_chunk_size(4);
            assert_eq!(read_all_string(reader).await.unwrap(), "hello world");
        });
    }

    #[test]
    fn read_all_bytes_concatenates_chunks() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader =
                crate::devices::BufferReader::new(bytes::Bytes::from_static(b"hello world")).with_chunk_size(4);
            assert_eq!(
                read_all_bytes(reader).await.unwrap(),
                bytes::Bytes::from_static(b"hello world")
            );
        });
    }

    #[test]
    fn compare_detects_length_mismatch() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let a = ArrayReader::new(vec![1, 2]);
            let b = ArrayReader::new(vec![1, 2, 3]);
            assert_eq!(compare(a, b).await.unwrap(), Ordering::Less);
        });
    }

    /// A writer that accepts the first `n` values then signals a graceful
    /// early stop instead of erroring, to exercise `pipe`'s `StopSignal`
    /// handling.
    struct StopsAfter<T> {
        items: Vec<T>,
        remaining: usize,
        reason: StopReason,
    }

    #[async_trait::async_trait]
    impl<T: Send> Writer<T> for StopsAfter<T> {
        async fn write(&mut self, value: Option<T>) -> Result<(), StreamError> {
            match value {
                Some(v) if self.remaining > 0 => {
                    self.items.push(v);
                    self.remaining -= 1;
                    Ok(())
                }
                Some(_) => Err(StreamError::stop_signal(self.reason.clone())),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn pipe_swallows_writer_silent_stop_signal() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3, 4, 5]);
            let writer = StopsAfter {
                items: Vec::new(),
                remaining: 3,
                reason: StopReason::Silent,
            };
            let writer = pipe(reader, writer).await.unwrap();
            assert_eq!(writer.items, vec![1, 2, 3]);
        });
    }

    #[test]
    fn pipe_propagates_writer_error_stop_signal() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            let reader = ArrayReader::new(vec![1, 2, 3]);
            let writer = StopsAfter {
                items: Vec::new(),
                remaining: 1,
                reason: StopReason::Err(StreamError::msg("writer refused")),
            };
            let err = pipe(reader, writer).await.unwrap_err();
            assert!(matches!(err, StreamError::StopSignal(StopReason::Err(_))));
        });
    }

    #[test]
    fn read_all_of_concat_equals_concatenated_read_alls() {
        compio::runtime::Runtime::new().unwrap().block_on(async {
            use crate::combinators::Concat;
            use crate::devices::StringReader;

            let r1 = StringReader::new("abc");
            let r2 = StringReader::new("def");
            let concatenated = Concat::new(StringReader::new("abc"), vec![StringReader::new("def")]);
            let whole = read_all_string(concatenated).await.unwrap();
            let expected = format!(
                "{}{}",
                read_all_string(r1).await.unwrap(),
                read_all_string(r2).await.unwrap()
            );
            assert_eq!(whole, expected);
        });
    }
}
