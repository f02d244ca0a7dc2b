//! RAII guard enforcing exactly-once resource release on stop/end.
//!
//! # The problem
//!
//! A reader/writer owns an underlying resource (a socket, a cancel token,
//! a fan-out branch's queue slot) that must be released exactly once,
//! whether the stream terminates by reaching `end`, by an explicit `stop`,
//! or by simply being dropped mid-stream (e.g. the future driving it is
//! cancelled). Calling the release logic twice is a bug; forgetting to
//! call it at all leaks the resource.
//!
//! # The solution
//!
//! `ReleaseGuard` wraps a release closure in an `Option`. `release_now`
//! takes the closure and runs it, so a second call is a no-op. `Drop` runs
//! the same path, so a guard that's merely dropped (stream abandoned
//! without an explicit stop) still releases its resource exactly once.
//!
//! # Example
//!
//! ```
//! use streamline_core::release::ReleaseGuard;
//!
//! let mut released = false;
//! {
//!     let mut guard = ReleaseGuard::new(|| released = true);
//!     guard.release_now();
//!     guard.release_now(); // no-op, already released
//! }
//! assert!(released);
//! ```

/// A guard that runs its release closure exactly once, on the first of
/// `release_now()` or drop.
pub struct ReleaseGuard<F: FnOnce()> {
    release: Option<F>,
}

impl<F: FnOnce()> ReleaseGuard<F> {
    /// Arm the guard with the closure to run on release.
    #[inline]
    pub fn new(release: F) -> Self {
        Self {
            release: Some(release),
        }
    }

    /// Run the release closure now, if it hasn't run yet.
    #[inline]
    pub fn release_now(&mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }

    /// Whether the release closure has already run.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl<F: FnOnce()> Drop for ReleaseGuard<F> {
    fn drop(&mut self) {
        self.release_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn releases_on_drop_if_not_called() {
        let released = Cell::new(false);
        {
            let _guard = ReleaseGuard::new(|| released.set(true));
        }
        assert!(released.get());
    }

    #[test]
    fn release_now_is_idempotent() {
        let count = Cell::new(0);
        let mut guard = ReleaseGuard::new(|| count.set(count.get() + 1));
        guard.release_now();
        guard.release_now();
        drop(guard);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn explicit_release_then_drop_runs_once() {
        let count = Cell::new(0);
        {
            let mut guard = ReleaseGuard::new(|| count.set(count.get() + 1));
            guard.release_now();
        }
        assert_eq!(count.get(), 1);
    }
}
