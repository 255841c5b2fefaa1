use std::{any::Any, sync::Arc, time::Duration};

use super::{StdSyncCondvar, StdSyncMutex};


/// Payload of a panic caught while running a work item.
pub(crate) type PanicPayload = Box<dyn Any + Send + 'static>;

/// Count-down latch used by the awaiting submission forms.
///
/// Besides counting completions it keeps the first panic payload reported by the work it tracks,
/// so the waiting thread can re-raise it.
#[derive(Clone, Debug)]
pub struct CompletionLatch {
  inner: Arc<LatchInner>,
}

#[derive(Debug)]
struct LatchInner {
  state:   StdSyncMutex<LatchState>,
  condvar: StdSyncCondvar,
}

#[derive(Debug)]
struct LatchState {
  remaining: usize,
  panic:     Option<PanicPayload>,
}

impl CompletionLatch {
  /// Creates a latch that opens after `count` completions.
  #[must_use]
  pub fn new(count: usize) -> Self {
    let state = LatchState { remaining: count, panic: None };
    Self { inner: Arc::new(LatchInner { state: StdSyncMutex::new(state), condvar: StdSyncCondvar::new() }) }
  }

  /// Records one completion.
  pub fn count_down(&self) {
    self.finish(None);
  }

  /// Records one completion whose body panicked. Only the first payload is kept.
  pub(crate) fn count_down_panicked(&self, payload: PanicPayload) {
    self.finish(Some(payload));
  }

  /// Returns the number of completions still expected.
  #[must_use]
  pub fn remaining(&self) -> usize {
    self.inner.state.lock().remaining
  }

  /// Blocks until the latch opens.
  ///
  /// # Panics
  ///
  /// Re-raises the first panic reported through the latch.
  pub fn wait(&self) {
    let mut state = self.inner.state.lock();
    while state.remaining > 0 {
      state = self.inner.condvar.wait(state);
    }
    if let Some(payload) = state.panic.take() {
      drop(state);
      std::panic::resume_unwind(payload);
    }
  }

  /// Blocks until the latch opens or `timeout` elapses. Returns `true` when the latch opened.
  ///
  /// A panic payload stays recorded for a later [`CompletionLatch::wait`].
  #[must_use]
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    let mut state = self.inner.state.lock();
    while state.remaining > 0 {
      let now = std::time::Instant::now();
      if now >= deadline {
        return false;
      }
      state = self.inner.condvar.wait_timeout(state, deadline - now).0;
    }
    true
  }

  fn finish(&self, payload: Option<PanicPayload>) {
    let mut state = self.inner.state.lock();
    assert!(state.remaining > 0, "CompletionLatch counted down more times than its count");
    if state.panic.is_none() {
      state.panic = payload;
    }
    state.remaining -= 1;
    if state.remaining == 0 {
      self.inner.condvar.notify_all();
    }
  }
}
