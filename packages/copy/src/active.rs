//! In-flight copy accounting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mutex-guarded count of copies in flight.
#[derive(Debug, Default)]
pub(crate) struct ActiveCopies {
    count: Mutex<usize>,
    idle: Condvar,
}

impl ActiveCopies {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> usize {
        *self.lock()
    }

    /// Count a copy that is about to be handed to a worker.
    pub(crate) fn increment(&self) {
        *self.lock() += 1;
    }

    pub(crate) fn decrement(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    /// Count a copy for the lifetime of the returned guard.
    pub(crate) fn enter(&self) -> ActiveGuard<'_> {
        self.increment();
        ActiveGuard(self)
    }

    /// Take over a count made earlier with [`Self::increment`].
    pub(crate) const fn adopt(&self) -> ActiveGuard<'_> {
        ActiveGuard(self)
    }

    /// Block until nothing is in flight. Returns `false` on timeout.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .idle
            .wait_timeout_while(guard, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *guard == 0
    }
}

/// Decrements the in-flight count when dropped, including on unwind.
pub(crate) struct ActiveGuard<'a>(&'a ActiveCopies);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.decrement();
    }
}
