/// Admission class of a queued job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
  /// Ordinary job; may run alongside other plain jobs on a concurrent queue.
  Plain,
  /// Drain point; runs alone once everything submitted before it has finished.
  Barrier,
}

impl JobKind {
  /// Returns `true` for [`JobKind::Barrier`].
  #[must_use]
  pub const fn is_barrier(self) -> bool {
    matches!(self, JobKind::Barrier)
  }
}
