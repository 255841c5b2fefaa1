use super::Queue;
use crate::core::WorkItem;

/// Work item waiting for a group to drain, together with the queue it runs on.
#[derive(Debug)]
pub(crate) struct GroupNotification {
  queue: Queue,
  item:  WorkItem,
}

impl GroupNotification {
  pub(crate) const fn new(queue: Queue, item: WorkItem) -> Self {
    Self { queue, item }
  }

  pub(crate) fn fire(self) {
    self.queue.submit_item(self.item);
  }
}
