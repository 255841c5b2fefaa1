use std::{
  collections::VecDeque,
  sync::Arc,
  time::{Duration, Instant},
};

use super::{StdSyncCondvar, StdSyncMutex, StdSyncMutexGuard};

#[cfg(test)]
mod tests;

/// Counting semaphore for blocking hand-off between threads.
///
/// Waiters are served in arrival order: a `signal` releases the longest-waiting thread, and a
/// thread arriving while others wait queues behind them even if a permit is available. A waiter
/// that times out leaves the line without consuming a permit.
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct Semaphore {
  inner: Arc<SemaphoreInner>,
}

#[derive(Debug, Default)]
struct SemaphoreInner {
  state:   StdSyncMutex<SemaphoreState>,
  condvar: StdSyncCondvar,
}

#[derive(Debug, Default)]
struct SemaphoreState {
  count:       usize,
  next_ticket: u64,
  waiters:     VecDeque<u64>,
}

impl SemaphoreState {
  fn try_acquire_as(&mut self, ticket: u64) -> bool {
    if self.count > 0 && self.waiters.front() == Some(&ticket) {
      self.waiters.pop_front();
      self.count -= 1;
      true
    } else {
      false
    }
  }

  fn has_contended_permit(&self) -> bool {
    self.count > 0 && !self.waiters.is_empty()
  }
}

impl Semaphore {
  /// Creates a semaphore holding `count` permits.
  #[must_use]
  pub fn new(count: usize) -> Self {
    let state = SemaphoreState { count, ..SemaphoreState::default() };
    Self { inner: Arc::new(SemaphoreInner { state: StdSyncMutex::new(state), condvar: StdSyncCondvar::new() }) }
  }

  /// Blocks until a permit is available, then takes it.
  pub fn wait(&self) {
    let mut state = self.inner.state.lock();
    if state.waiters.is_empty() && state.count > 0 {
      state.count -= 1;
      return;
    }
    let ticket = Self::enqueue(&mut state);
    loop {
      if state.try_acquire_as(ticket) {
        self.pass_on(&state);
        return;
      }
      state = self.inner.condvar.wait(state);
    }
  }

  /// Blocks until a permit is available or `timeout` elapses.
  ///
  /// Returns `true` when a permit was taken.
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let mut state = self.inner.state.lock();
    if state.waiters.is_empty() && state.count > 0 {
      state.count -= 1;
      return true;
    }
    let ticket = Self::enqueue(&mut state);
    loop {
      if state.try_acquire_as(ticket) {
        self.pass_on(&state);
        return true;
      }
      let now = Instant::now();
      if now >= deadline {
        state.waiters.retain(|waiting| *waiting != ticket);
        self.pass_on(&state);
        return false;
      }
      state = self.inner.condvar.wait_timeout(state, deadline - now).0;
    }
  }

  /// Adds a permit, releasing the longest-waiting thread if any.
  pub fn signal(&self) {
    let mut state = self.inner.state.lock();
    state.count += 1;
    if !state.waiters.is_empty() {
      self.inner.condvar.notify_all();
    }
  }

  /// Returns the number of permits not yet taken.
  #[must_use]
  pub fn available(&self) -> usize {
    self.inner.state.lock().count
  }

  fn enqueue(state: &mut StdSyncMutexGuard<'_, SemaphoreState>) -> u64 {
    let ticket = state.next_ticket;
    state.next_ticket += 1;
    state.waiters.push_back(ticket);
    ticket
  }

  fn pass_on(&self, state: &SemaphoreState) {
    if state.has_contended_permit() {
      self.inner.condvar.notify_all();
    }
  }
}
