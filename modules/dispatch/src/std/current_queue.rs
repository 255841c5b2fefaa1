use std::cell::Cell;

use crate::core::QueueId;

thread_local! {
  static CURRENT_QUEUE: Cell<Option<QueueId>> = const { Cell::new(None) };
}

/// Returns the queue the calling thread is running work for, if any.
pub(crate) fn current_queue() -> Option<QueueId> {
  CURRENT_QUEUE.with(Cell::get)
}

/// Marks the calling thread as running work for a queue until dropped.
pub(crate) struct CurrentQueueScope {
  previous: Option<QueueId>,
}

impl CurrentQueueScope {
  pub(crate) fn enter(id: QueueId) -> Self {
    let previous = CURRENT_QUEUE.with(|current| current.replace(Some(id)));
    Self { previous }
  }
}

impl Drop for CurrentQueueScope {
  fn drop(&mut self) {
    CURRENT_QUEUE.with(|current| current.set(self.previous));
  }
}
