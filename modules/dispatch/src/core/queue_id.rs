use core::fmt;

use portable_atomic::{AtomicU64, Ordering};


static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a queue.
///
/// Two queue handles refer to the same queue exactly when their ids are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(u64);

impl QueueId {
  /// Allocates a process-unique identifier.
  #[must_use]
  pub fn allocate() -> Self {
    Self(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// Returns the raw value.
  #[must_use]
  pub const fn value(self) -> u64 {
    self.0
  }
}

impl fmt::Display for QueueId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "queue#{}", self.0)
  }
}
