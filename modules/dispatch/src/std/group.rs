use std::{
  mem,
  sync::Arc,
  time::{Duration, Instant},
};

use super::{GroupLease, Queue, StdSyncCondvar, StdSyncMutex, group_notification::GroupNotification};
use crate::core::WorkItem;


/// Join counter over a batch of work items, possibly spread across several queues.
///
/// Each [`Group::enter`] must be balanced by exactly one [`Group::leave`]. When the count drops to
/// zero, blocked waiters are released and every registered notification is submitted to its queue
/// once. The group can be reused afterwards.
#[derive(Clone, Debug, Default)]
pub struct Group {
  inner: Arc<GroupInner>,
}

#[derive(Debug, Default)]
struct GroupInner {
  state:   StdSyncMutex<GroupState>,
  condvar: StdSyncCondvar,
}

#[derive(Debug, Default)]
struct GroupState {
  outstanding:   usize,
  generation:    u64,
  notifications: Vec<GroupNotification>,
}

impl Group {
  /// Creates an empty group.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Records one more outstanding work item.
  pub fn enter(&self) {
    self.inner.state.lock().outstanding += 1;
  }

  /// Enters the group and returns a lease that leaves it on drop.
  pub fn lease(&self) -> GroupLease {
    self.enter();
    GroupLease::new(self.clone())
  }

  /// Marks one outstanding work item as finished.
  ///
  /// # Panics
  ///
  /// Panics when called more times than [`Group::enter`].
  pub fn leave(&self) {
    let fired = {
      let mut state = self.inner.state.lock();
      assert!(state.outstanding > 0, "Group::leave called more times than Group::enter");
      state.outstanding -= 1;
      if state.outstanding > 0 {
        return;
      }
      state.generation = state.generation.wrapping_add(1);
      self.inner.condvar.notify_all();
      mem::take(&mut state.notifications)
    };
    for notification in fired {
      notification.fire();
    }
  }

  /// Blocks until the outstanding count reaches zero. Returns immediately when it already is.
  pub fn wait(&self) {
    let mut state = self.inner.state.lock();
    let generation = state.generation;
    while state.outstanding > 0 && state.generation == generation {
      state = self.inner.condvar.wait(state);
    }
  }

  /// Blocks until the outstanding count reaches zero or `timeout` elapses.
  ///
  /// Returns `true` when the group drained, `false` on timeout.
  #[must_use]
  pub fn wait_timeout(&self, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let mut state = self.inner.state.lock();
    let generation = state.generation;
    while state.outstanding > 0 && state.generation == generation {
      let now = Instant::now();
      if now >= deadline {
        return false;
      }
      state = self.inner.condvar.wait_timeout(state, deadline - now).0;
    }
    true
  }

  /// Submits `f` to `queue` once the group drains, or right away if it is already empty.
  pub fn notify<F>(&self, queue: &Queue, f: F)
  where
    F: FnOnce() + Send + 'static, {
    self.notify_item(queue, WorkItem::new(f));
  }

  /// Returns the number of outstanding work items.
  #[must_use]
  pub fn outstanding(&self) -> usize {
    self.inner.state.lock().outstanding
  }

  pub(crate) fn notify_item(&self, queue: &Queue, item: WorkItem) {
    let notification = GroupNotification::new(queue.clone(), item);
    let immediate = {
      let mut state = self.inner.state.lock();
      if state.outstanding > 0 {
        state.notifications.push(notification);
        None
      } else {
        Some(notification)
      }
    };
    if let Some(notification) = immediate {
      notification.fire();
    }
  }
}
