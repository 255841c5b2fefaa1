//! Errors returned by the awaiting submission forms.

use alloc::string::String;
use core::fmt;

#[cfg(test)]
mod tests;

/// Error conditions reported synchronously by a queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
  /// No worker thread could be started to run the job.
  RejectedExecution,
  /// The caller would wait on a job that can only run after the caller itself finishes.
  ReentrantAwait {
    /// Label of the queue the caller is running on.
    label: String,
  },
}

impl DispatchError {
  /// Creates a reentrant-await error for the given queue label.
  #[must_use]
  pub fn reentrant_await(label: impl Into<String>) -> Self {
    Self::ReentrantAwait { label: label.into() }
  }
}

impl fmt::Display for DispatchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | DispatchError::RejectedExecution => f.write_str("rejected execution"),
      | DispatchError::ReentrantAwait { label } => {
        write!(f, "awaiting on queue '{}' from its own worker would deadlock", label)
      },
    }
  }
}

impl core::error::Error for DispatchError {}
