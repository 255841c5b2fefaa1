use alloc::string::String;
use core::fmt;

use super::QueuePriority;


/// Failure to register or look up a queue in a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueRegistryError {
  /// Another queue already uses the label.
  DuplicateLabel {
    /// Label that was registered twice.
    label: String,
  },
  /// No queue is registered under the label.
  UnknownLabel {
    /// Label that was looked up.
    label: String,
  },
  /// The registry holds no `main` queue.
  MissingMain,
  /// The registry holds no global queue for the priority.
  MissingGlobal {
    /// Priority whose global queue was requested.
    priority: QueuePriority,
  },
}

impl QueueRegistryError {
  /// Creates a [`QueueRegistryError::DuplicateLabel`].
  #[must_use]
  pub fn duplicate(label: impl Into<String>) -> Self {
    Self::DuplicateLabel { label: label.into() }
  }

  /// Creates a [`QueueRegistryError::UnknownLabel`].
  #[must_use]
  pub fn unknown(label: impl Into<String>) -> Self {
    Self::UnknownLabel { label: label.into() }
  }
}

impl fmt::Display for QueueRegistryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::DuplicateLabel { label } => write!(f, "a queue labeled `{label}` is already registered"),
      | Self::UnknownLabel { label } => write!(f, "no queue labeled `{label}` is registered"),
      | Self::MissingMain => f.write_str("the main queue is not registered; build the registry with defaults"),
      | Self::MissingGlobal { priority } => write!(f, "no global queue is registered for {priority} priority"),
    }
  }
}

impl core::error::Error for QueueRegistryError {}
