use super::job::Job;
use crate::core::{AdmissionQueue, QueueMode};

/// Mutable state of a queue, guarded by the queue lock.
#[derive(Debug)]
pub(crate) struct QueueState {
  pub(crate) admission: AdmissionQueue<Job>,
  /// Live worker threads, including those still starting.
  pub(crate) workers:   usize,
  /// Workers parked on the condition variable.
  pub(crate) idle:      usize,
  /// Workers spawned that have not yet taken the lock.
  pub(crate) starting:  usize,
  pub(crate) spawned:   u64,
}

impl QueueState {
  pub(crate) const fn new(mode: QueueMode) -> Self {
    Self { admission: AdmissionQueue::new(mode), workers: 0, idle: 0, starting: 0, spawned: 0 }
  }
}
