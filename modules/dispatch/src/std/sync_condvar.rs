use std::{sync::Condvar, time::Duration};

use super::StdSyncMutexGuard;

/// Condition variable paired with [`StdSyncMutex`](crate::std::StdSyncMutex), ignoring poisoning.
#[derive(Debug, Default)]
pub struct StdSyncCondvar(Condvar);

impl StdSyncCondvar {
  /// Creates a condition variable.
  #[must_use]
  pub const fn new() -> Self {
    Self(Condvar::new())
  }

  /// Blocks until notified. Spurious wake-ups are possible.
  pub fn wait<'a, T>(&self, guard: StdSyncMutexGuard<'a, T>) -> StdSyncMutexGuard<'a, T> {
    match self.0.wait(guard.guard) {
      | Ok(guard) => StdSyncMutexGuard { guard },
      | Err(poisoned) => StdSyncMutexGuard { guard: poisoned.into_inner() },
    }
  }

  /// Blocks until notified or until `timeout` elapses. The flag is `true` on timeout.
  pub fn wait_timeout<'a, T>(
    &self,
    guard: StdSyncMutexGuard<'a, T>,
    timeout: Duration,
  ) -> (StdSyncMutexGuard<'a, T>, bool) {
    match self.0.wait_timeout(guard.guard, timeout) {
      | Ok((guard, result)) => (StdSyncMutexGuard { guard }, result.timed_out()),
      | Err(poisoned) => {
        let (guard, result) = poisoned.into_inner();
        (StdSyncMutexGuard { guard }, result.timed_out())
      },
    }
  }

  /// Wakes one waiter.
  pub fn notify_one(&self) {
    self.0.notify_one();
  }

  /// Wakes every waiter.
  pub fn notify_all(&self) {
    self.0.notify_all();
  }
}
