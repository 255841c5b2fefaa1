/// Concurrency mode of a queue, fixed at creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QueueMode {
  /// One job at a time, in submission order.
  #[default]
  Serial,
  /// Plain jobs may run simultaneously; barriers drain the queue.
  Concurrent,
}

impl QueueMode {
  /// Returns `true` for [`QueueMode::Serial`].
  #[must_use]
  pub const fn is_serial(self) -> bool {
    matches!(self, QueueMode::Serial)
  }
}
