use alloc::collections::VecDeque;

use super::{JobKind, QueueMode};


/// FIFO admission state machine shared by every queue.
///
/// Decides which pending job may start next:
///
/// - serial: the head, and only while nothing is running;
/// - concurrent: a plain head unless a barrier is running, or a barrier head once nothing is running.
///
/// Jobs are only ever taken from the head, so everything behind a waiting barrier waits with it.
/// Callers must report every admitted job back through [`AdmissionQueue::complete`].
#[derive(Debug)]
pub struct AdmissionQueue<T> {
  mode:            QueueMode,
  pending:         VecDeque<(JobKind, T)>,
  running:         usize,
  barrier_running: bool,
}

impl<T> AdmissionQueue<T> {
  /// Creates an empty admission queue.
  #[must_use]
  pub const fn new(mode: QueueMode) -> Self {
    Self { mode, pending: VecDeque::new(), running: 0, barrier_running: false }
  }

  /// Returns the concurrency mode.
  #[must_use]
  pub const fn mode(&self) -> QueueMode {
    self.mode
  }

  /// Appends a job.
  pub fn push(&mut self, kind: JobKind, job: T) {
    self.pending.push_back((kind, job));
  }

  /// Removes the most recently pushed job if it has not been admitted yet.
  pub fn retract_last(&mut self) -> Option<(JobKind, T)> {
    self.pending.pop_back()
  }

  /// Takes the next admissible job, marking it as running.
  pub fn admit(&mut self) -> Option<(JobKind, T)> {
    if !self.head_admissible() {
      return None;
    }
    let (kind, job) = self.pending.pop_front()?;
    self.running += 1;
    if kind.is_barrier() && !self.mode.is_serial() {
      self.barrier_running = true;
    }
    Some((kind, job))
  }

  /// Records that an admitted job of the given kind finished.
  ///
  /// # Panics
  ///
  /// Panics when no job is running.
  pub fn complete(&mut self, kind: JobKind) {
    assert!(self.running > 0, "AdmissionQueue::complete called without a running job");
    self.running -= 1;
    if kind.is_barrier() && !self.mode.is_serial() {
      self.barrier_running = false;
    }
  }

  /// Returns `true` when [`AdmissionQueue::admit`] would return a job.
  #[must_use]
  pub fn has_admissible(&self) -> bool {
    self.head_admissible()
  }

  /// Counts the jobs that could start right now if enough workers were available.
  #[must_use]
  pub fn admissible_count(&self) -> usize {
    if !self.head_admissible() {
      return 0;
    }
    match self.mode {
      | QueueMode::Serial => 1,
      | QueueMode::Concurrent => {
        let plain_prefix = self.pending.iter().take_while(|(kind, _)| !kind.is_barrier()).count();
        plain_prefix.max(1)
      },
    }
  }

  /// Number of jobs waiting for admission.
  #[must_use]
  pub fn pending_len(&self) -> usize {
    self.pending.len()
  }

  /// Number of admitted jobs that have not completed.
  #[must_use]
  pub const fn running(&self) -> usize {
    self.running
  }

  /// Returns `true` while a barrier job is running.
  #[must_use]
  pub const fn is_barrier_running(&self) -> bool {
    self.barrier_running
  }

  /// Returns `true` when a barrier is running or waiting for admission.
  ///
  /// Work started outside the queue while this holds would overtake the barrier.
  #[must_use]
  pub fn is_barrier_outstanding(&self) -> bool {
    !self.mode.is_serial() && (self.barrier_running || self.pending.iter().any(|(kind, _)| kind.is_barrier()))
  }

  /// Returns `true` when nothing is pending or running.
  #[must_use]
  pub fn is_idle(&self) -> bool {
    self.pending.is_empty() && self.running == 0
  }

  fn head_admissible(&self) -> bool {
    let Some((kind, _)) = self.pending.front() else {
      return false;
    };
    match self.mode {
      | QueueMode::Serial => self.running == 0,
      | QueueMode::Concurrent if self.barrier_running => false,
      | QueueMode::Concurrent => !kind.is_barrier() || self.running == 0,
    }
  }
}
