use alloc::boxed::Box;
use core::fmt;


/// Single unit of executable work.
///
/// The body is opaque to the queues: they only guarantee how many times it runs and when,
/// relative to barriers and groups.
pub struct WorkItem {
  body: Box<dyn FnOnce() + Send + 'static>,
}

impl WorkItem {
  /// Wraps a closure.
  #[must_use]
  pub fn new<F>(body: F) -> Self
  where
    F: FnOnce() + Send + 'static, {
    Self { body: Box::new(body) }
  }

  /// Consumes the item and invokes its body on the calling thread.
  pub fn run(self) {
    (self.body)();
  }
}

impl fmt::Debug for WorkItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WorkItem").finish_non_exhaustive()
  }
}
