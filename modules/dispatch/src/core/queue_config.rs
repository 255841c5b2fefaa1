use alloc::string::String;
use core::{num::NonZeroUsize, time::Duration};

use super::{QueueMode, QueuePriority};


const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(1);

/// Static description of a queue: label, concurrency mode, worker-count hint and priority hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueConfig {
  label:        String,
  mode:         QueueMode,
  worker_limit: Option<NonZeroUsize>,
  priority:     QueuePriority,
  keep_alive:   Duration,
}

impl QueueConfig {
  /// Creates a configuration with the given label and mode.
  #[must_use]
  pub fn new(label: impl Into<String>, mode: QueueMode) -> Self {
    Self {
      label: label.into(),
      mode,
      worker_limit: None,
      priority: QueuePriority::Default,
      keep_alive: DEFAULT_KEEP_ALIVE,
    }
  }

  /// Creates a serial queue configuration.
  #[must_use]
  pub fn serial(label: impl Into<String>) -> Self {
    Self::new(label, QueueMode::Serial)
  }

  /// Creates a concurrent queue configuration.
  #[must_use]
  pub fn concurrent(label: impl Into<String>) -> Self {
    Self::new(label, QueueMode::Concurrent)
  }

  /// Caps the number of worker threads. Ignored by serial queues, which always use one.
  #[must_use]
  pub const fn with_worker_limit(mut self, limit: NonZeroUsize) -> Self {
    self.worker_limit = Some(limit);
    self
  }

  /// Sets the priority hint.
  #[must_use]
  pub const fn with_priority(mut self, priority: QueuePriority) -> Self {
    self.priority = priority;
    self
  }

  /// Sets how long an idle worker lingers before its thread exits.
  #[must_use]
  pub const fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
    self.keep_alive = keep_alive;
    self
  }

  /// Returns the label.
  #[must_use]
  pub fn label(&self) -> &str {
    &self.label
  }

  /// Returns the concurrency mode.
  #[must_use]
  pub const fn mode(&self) -> QueueMode {
    self.mode
  }

  /// Returns the configured worker-count hint, if any.
  #[must_use]
  pub const fn worker_limit(&self) -> Option<NonZeroUsize> {
    self.worker_limit
  }

  /// Returns the priority hint.
  #[must_use]
  pub const fn priority(&self) -> QueuePriority {
    self.priority
  }

  /// Returns the idle keep-alive of worker threads.
  #[must_use]
  pub const fn keep_alive(&self) -> Duration {
    self.keep_alive
  }

  /// Resolves the number of worker threads the queue may use.
  ///
  /// Serial queues always resolve to one. Concurrent queues use the configured hint, or
  /// `fallback` when none was set.
  #[must_use]
  pub fn effective_worker_limit(&self, fallback: NonZeroUsize) -> NonZeroUsize {
    match self.mode {
      | QueueMode::Serial => NonZeroUsize::MIN,
      | QueueMode::Concurrent => self.worker_limit.unwrap_or(fallback),
    }
  }
}
