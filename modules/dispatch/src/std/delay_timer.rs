use std::{
  cmp::Reverse,
  collections::BinaryHeap,
  sync::Arc,
  thread,
  time::Instant,
};

use tracing::{debug, error};

use super::{Queue, StdSyncCondvar, StdSyncMutex, TRACING_TARGET, delay_entry::DelayEntry};
use crate::core::WorkItem;


const TIMER_THREAD_NAME: &str = "lanes-delay-timer";

/// Deadline timer that hands delayed work items to their queues.
///
/// One background thread serves every queue sharing the timer. It starts with the first scheduled
/// item, sleeps until the earliest deadline, and submits due items in deadline order. Once every
/// handle is dropped the thread releases the remaining items at their deadlines and exits.
#[derive(Clone, Debug)]
pub struct DelayTimer {
  handle: Arc<TimerHandle>,
}

#[derive(Debug)]
struct TimerHandle {
  shared: Arc<TimerShared>,
}

#[derive(Debug, Default)]
struct TimerShared {
  state:   StdSyncMutex<TimerState>,
  condvar: StdSyncCondvar,
}

#[derive(Debug, Default)]
struct TimerState {
  entries:       BinaryHeap<Reverse<DelayEntry>>,
  next_sequence: u64,
  thread_alive:  bool,
  closed:        bool,
}

impl DelayTimer {
  /// Creates a timer. No thread is started until something is scheduled.
  #[must_use]
  pub fn new() -> Self {
    Self { handle: Arc::new(TimerHandle { shared: Arc::new(TimerShared::default()) }) }
  }

  /// Submits `item` to `queue` no earlier than `deadline`.
  pub fn schedule(&self, deadline: Instant, queue: Queue, item: WorkItem) {
    let shared = &self.handle.shared;
    let mut state = shared.state.lock();
    let sequence = state.next_sequence;
    state.next_sequence += 1;
    state.entries.push(Reverse(DelayEntry::new(deadline, sequence, queue, item)));
    if state.thread_alive {
      shared.condvar.notify_one();
      return;
    }
    let runner = Arc::clone(shared);
    match thread::Builder::new().name(TIMER_THREAD_NAME.into()).spawn(move || runner.run()) {
      | Ok(_) => {
        state.thread_alive = true;
        debug!(target: TRACING_TARGET, "delay timer thread started");
      },
      | Err(error) => {
        error!(target: TRACING_TARGET, %error, pending = state.entries.len(), "failed to spawn delay timer thread");
      },
    }
  }

  /// Returns the number of items waiting for their deadline.
  #[must_use]
  pub fn pending(&self) -> usize {
    self.handle.shared.state.lock().entries.len()
  }
}

impl Default for DelayTimer {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for TimerHandle {
  fn drop(&mut self) {
    let mut state = self.shared.state.lock();
    state.closed = true;
    self.shared.condvar.notify_all();
  }
}

impl TimerShared {
  fn run(self: Arc<Self>) {
    let mut state = self.state.lock();
    loop {
      let now = Instant::now();
      let mut due = Vec::new();
      while state.entries.peek().is_some_and(|Reverse(entry)| entry.deadline() <= now) {
        if let Some(Reverse(entry)) = state.entries.pop() {
          due.push(entry);
        }
      }
      if !due.is_empty() {
        drop(state);
        for entry in due {
          entry.fire();
        }
        state = self.state.lock();
        continue;
      }
      let next_deadline = state.entries.peek().map(|Reverse(entry)| entry.deadline());
      state = match next_deadline {
        | Some(deadline) => self.condvar.wait_timeout(state, deadline.saturating_duration_since(now)).0,
        | None if state.closed => {
          state.thread_alive = false;
          debug!(target: TRACING_TARGET, "delay timer thread exiting");
          return;
        },
        | None => self.condvar.wait(state),
      };
    }
  }
}
