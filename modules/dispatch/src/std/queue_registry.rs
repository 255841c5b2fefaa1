use std::num::NonZeroUsize;

use ahash::RandomState;
use hashbrown::{HashMap, hash_map::Entry};
use tracing::debug;

use super::{DelayTimer, Queue, StdSyncMutex, TRACING_TARGET};
use crate::core::{QueueConfig, QueuePriority, QueueRegistryError};


/// Label of the serial queue registered by [`QueueRegistry::with_defaults`].
pub const MAIN_QUEUE_LABEL: &str = "main";

/// Registry that resolves queue labels to queues.
///
/// Built explicitly at start-up and passed to whoever needs named queues. Every queue created
/// through a registry shares the registry's [`DelayTimer`].
#[derive(Debug)]
pub struct QueueRegistry {
  entries: StdSyncMutex<HashMap<String, Queue, RandomState>>,
  timer:   DelayTimer,
}

impl QueueRegistry {
  /// Creates an empty registry.
  #[must_use]
  pub fn new() -> Self {
    Self { entries: StdSyncMutex::new(HashMap::with_hasher(RandomState::new())), timer: DelayTimer::new() }
  }

  /// Creates a registry holding the standard table of queues:
  ///
  /// | label | mode | worker hint | priority |
  /// | --- | --- | --- | --- |
  /// | `main` | serial | 1 | high |
  /// | `global.high` | concurrent | available parallelism | high |
  /// | `global.default` | concurrent | available parallelism | default |
  /// | `global.low` | concurrent | available parallelism | low |
  /// | `global.background` | concurrent | 1 | background |
  #[must_use]
  pub fn with_defaults() -> Self {
    let registry = Self::new();
    let mut configs = vec![QueueConfig::serial(MAIN_QUEUE_LABEL).with_priority(QueuePriority::High)];
    configs.extend(QueuePriority::ALL.into_iter().map(Self::default_global_config));
    let mut entries = registry.entries.lock();
    for config in configs {
      let label = config.label().to_owned();
      entries.entry(label).or_insert_with(|| Queue::with_timer(config, registry.timer.clone()));
    }
    drop(entries);
    registry
  }

  /// Returns the label of the global queue for `priority`.
  #[must_use]
  pub fn global_label(priority: QueuePriority) -> String {
    format!("global.{}", priority.as_str())
  }

  /// Creates a queue from `config` and registers it under its label.
  ///
  /// # Errors
  ///
  /// Returns [`QueueRegistryError::DuplicateLabel`] when the label is already registered.
  pub fn register(&self, config: QueueConfig) -> Result<Queue, QueueRegistryError> {
    let mut entries = self.entries.lock();
    match entries.entry(config.label().to_owned()) {
      | Entry::Occupied(entry) => Err(QueueRegistryError::duplicate(entry.key().as_str())),
      | Entry::Vacant(entry) => {
        debug!(target: TRACING_TARGET, queue = config.label(), mode = ?config.mode(), "queue registered");
        let queue = Queue::with_timer(config, self.timer.clone());
        Ok(entry.insert(queue).clone())
      },
    }
  }

  /// Resolves the queue registered under `label`.
  ///
  /// # Errors
  ///
  /// Returns [`QueueRegistryError::UnknownLabel`] when the label has not been registered.
  pub fn resolve(&self, label: &str) -> Result<Queue, QueueRegistryError> {
    self.lookup(label).ok_or_else(|| QueueRegistryError::unknown(label))
  }

  /// Resolves the `main` serial queue.
  ///
  /// # Errors
  ///
  /// Returns [`QueueRegistryError::MissingMain`] when the registry was not built with defaults.
  pub fn main(&self) -> Result<Queue, QueueRegistryError> {
    self.lookup(MAIN_QUEUE_LABEL).ok_or(QueueRegistryError::MissingMain)
  }

  /// Resolves the global concurrent queue for `priority`.
  ///
  /// # Errors
  ///
  /// Returns [`QueueRegistryError::MissingGlobal`] when the registry was not built with defaults.
  pub fn global(&self, priority: QueuePriority) -> Result<Queue, QueueRegistryError> {
    self.lookup(&Self::global_label(priority)).ok_or(QueueRegistryError::MissingGlobal { priority })
  }

  /// Returns every registered label, sorted.
  #[must_use]
  pub fn labels(&self) -> Vec<String> {
    let mut labels: Vec<String> = self.entries.lock().keys().cloned().collect();
    labels.sort_unstable();
    labels
  }

  /// Returns the timer shared by the registered queues.
  #[must_use]
  pub const fn timer(&self) -> &DelayTimer {
    &self.timer
  }

  fn lookup(&self, label: &str) -> Option<Queue> {
    self.entries.lock().get(label).cloned()
  }

  fn default_global_config(priority: QueuePriority) -> QueueConfig {
    let config = QueueConfig::concurrent(Self::global_label(priority)).with_priority(priority);
    match priority {
      | QueuePriority::Background => config.with_worker_limit(NonZeroUsize::MIN),
      | _ => config,
    }
  }
}

impl Default for QueueRegistry {
  fn default() -> Self {
    Self::new()
  }
}
