use core::fmt;

/// Scheduling priority hint carried by a queue configuration.
///
/// Worker threads are plain OS threads, so the hint is informational: it names the class a queue
/// belongs to and selects the matching global queue in a registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueuePriority {
  /// Work the user is waiting on.
  High,
  /// Regular work.
  #[default]
  Default,
  /// Work that can yield to everything else.
  Low,
  /// Maintenance work with no latency expectations.
  Background,
}

impl QueuePriority {
  /// All priority classes, highest first.
  pub const ALL: [QueuePriority; 4] =
    [QueuePriority::High, QueuePriority::Default, QueuePriority::Low, QueuePriority::Background];

  /// Returns the lowercase name used in labels.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      | QueuePriority::High => "high",
      | QueuePriority::Default => "default",
      | QueuePriority::Low => "low",
      | QueuePriority::Background => "background",
    }
  }
}

impl fmt::Display for QueuePriority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
