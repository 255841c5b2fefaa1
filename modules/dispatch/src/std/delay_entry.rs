use std::{cmp::Ordering, time::Instant};

use super::Queue;
use crate::core::WorkItem;

/// Delayed work item waiting in the timer heap. Ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub(crate) struct DelayEntry {
  deadline: Instant,
  sequence: u64,
  queue:    Queue,
  item:     WorkItem,
}

impl DelayEntry {
  pub(crate) const fn new(deadline: Instant, sequence: u64, queue: Queue, item: WorkItem) -> Self {
    Self { deadline, sequence, queue, item }
  }

  pub(crate) const fn deadline(&self) -> Instant {
    self.deadline
  }

  /// Hands the item to its queue's normal submission path.
  pub(crate) fn fire(self) {
    self.queue.submit_item(self.item);
  }
}

impl PartialEq for DelayEntry {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for DelayEntry {}

impl PartialOrd for DelayEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for DelayEntry {
  fn cmp(&self, other: &Self) -> Ordering {
    self.deadline.cmp(&other.deadline).then_with(|| self.sequence.cmp(&other.sequence))
  }
}
