use std::sync::Mutex;

use super::StdSyncMutexGuard;


/// Mutex wrapper backed by [`std::sync::Mutex`] that recovers from poisoning.
///
/// Work item bodies run outside every lock, so a poisoned lock only means a panic unwound
/// through bookkeeping code that leaves the protected state consistent.
#[derive(Debug, Default)]
pub struct StdSyncMutex<T>(Mutex<T>);

impl<T> StdSyncMutex<T> {
  /// Creates a new mutex-protected value.
  #[must_use]
  pub const fn new(value: T) -> Self {
    Self(Mutex::new(value))
  }

  /// Locks the mutex, ignoring poisoning.
  pub fn lock(&self) -> StdSyncMutexGuard<'_, T> {
    match self.0.lock() {
      | Ok(guard) => StdSyncMutexGuard { guard },
      | Err(poisoned) => StdSyncMutexGuard { guard: poisoned.into_inner() },
    }
  }

  /// Consumes the mutex and returns the inner value.
  pub fn into_inner(self) -> T {
    match self.0.into_inner() {
      | Ok(value) => value,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }
}
