use std::{
  fmt,
  hash::{Hash, Hasher},
  num::NonZeroUsize,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
  time::{Duration, Instant},
};

use super::{CompletionLatch, DelayTimer, Group, current_queue::current_queue, job::Job, queue_shared::QueueShared};
use crate::core::{DispatchError, JobKind, QueueConfig, QueueId, QueueMode, WorkItem};

#[cfg(test)]
mod tests;

/// Execution context that runs submitted work on its own worker threads.
///
/// A serial queue runs one item at a time in submission order. A concurrent queue runs plain
/// items side by side with no ordering among them; a barrier item waits for everything submitted
/// before it and holds back everything submitted after it.
///
/// Handles are cheap to clone and compare equal when they refer to the same queue. There is no
/// closed state and no cancellation: every submitted item runs to completion.
///
/// # Awaiting from a worker
///
/// The `submit_and_await*` forms block the caller. Called from a worker of the same queue they
/// would wait on work that can only start after the caller returns, so serial queues and barrier
/// awaits reject such calls with [`DispatchError::ReentrantAwait`], while plain awaits on a
/// concurrent queue run inline on the calling worker unless a barrier is pending or running on
/// the queue, in which case they are rejected too. Cycles across different queues are not
/// detected and deadlock.
#[derive(Clone)]
pub struct Queue {
  shared: Arc<QueueShared>,
}

impl Queue {
  /// Creates a queue with its own delay timer, started on first use.
  #[must_use]
  pub fn new(config: QueueConfig) -> Self {
    Self::with_timer(config, DelayTimer::new())
  }

  /// Creates a queue whose delayed submissions go through `timer`.
  #[must_use]
  pub fn with_timer(config: QueueConfig, timer: DelayTimer) -> Self {
    Self { shared: Arc::new(QueueShared::new(config, timer)) }
  }

  /// Creates a serial queue with default settings.
  #[must_use]
  pub fn serial(label: impl Into<String>) -> Self {
    Self::new(QueueConfig::serial(label))
  }

  /// Creates a concurrent queue with default settings.
  #[must_use]
  pub fn concurrent(label: impl Into<String>) -> Self {
    Self::new(QueueConfig::concurrent(label))
  }

  /// Returns the identity of the queue.
  #[must_use]
  pub fn id(&self) -> QueueId {
    self.shared.id()
  }

  /// Returns the label.
  #[must_use]
  pub fn label(&self) -> &str {
    self.shared.config().label()
  }

  /// Returns the concurrency mode.
  #[must_use]
  pub fn mode(&self) -> QueueMode {
    self.shared.config().mode()
  }

  /// Returns the configuration the queue was created with.
  #[must_use]
  pub fn config(&self) -> &QueueConfig {
    self.shared.config()
  }

  /// Returns the maximum number of worker threads.
  #[must_use]
  pub fn worker_limit(&self) -> NonZeroUsize {
    self.shared.worker_limit()
  }

  /// Returns the number of live worker threads.
  #[must_use]
  pub fn worker_count(&self) -> usize {
    self.shared.worker_count()
  }

  /// Returns the number of items waiting for a worker.
  #[must_use]
  pub fn pending_len(&self) -> usize {
    self.shared.pending_len()
  }

  /// Returns `true` when the calling thread is running work for this queue.
  #[must_use]
  pub fn is_current(&self) -> bool {
    current_queue() == Some(self.id())
  }

  /// Queues `f` for asynchronous execution and returns immediately.
  pub fn submit<F>(&self, f: F)
  where
    F: FnOnce() + Send + 'static, {
    self.submit_item(WorkItem::new(f));
  }

  /// Queues a prepared work item for asynchronous execution.
  pub fn submit_item(&self, item: WorkItem) {
    self.shared.enqueue(JobKind::Plain, Job::detached(item));
  }

  /// Queues `f` once `delay` has elapsed. Delayed items are released in deadline order.
  pub fn submit_after<F>(&self, delay: Duration, f: F)
  where
    F: FnOnce() + Send + 'static, {
    let deadline = Instant::now() + delay;
    self.shared.timer().schedule(deadline, self.clone(), WorkItem::new(f));
  }

  /// Runs `f` on the queue and blocks until it has finished.
  ///
  /// # Errors
  ///
  /// Returns [`DispatchError::ReentrantAwait`] when called from a worker of this serial queue, or
  /// from a worker of this concurrent queue while a barrier is outstanding, and
  /// [`DispatchError::RejectedExecution`] when no worker thread can be started.
  ///
  /// # Panics
  ///
  /// Re-raises a panic of `f` on the calling thread.
  pub fn submit_and_await<F>(&self, f: F) -> Result<(), DispatchError>
  where
    F: FnOnce() + Send + 'static, {
    self.await_item(JobKind::Plain, WorkItem::new(f))
  }

  /// Invokes `f` once for every index in `0..iterations` and blocks until all invocations finished.
  ///
  /// Concurrent queues spread the indices over their workers with no ordering guarantee; serial
  /// queues run them in ascending order. Zero iterations return immediately.
  ///
  /// # Errors
  ///
  /// Same conditions as [`Queue::submit_and_await`].
  ///
  /// # Panics
  ///
  /// Re-raises the first panic of `f` on the calling thread, after every index has run.
  pub fn submit_and_await_iterations<F>(&self, iterations: usize, f: F) -> Result<(), DispatchError>
  where
    F: Fn(usize) + Send + Sync + 'static, {
    if iterations == 0 {
      return Ok(());
    }
    match self.mode() {
      | QueueMode::Serial => self.await_item(JobKind::Plain, WorkItem::new(move || run_every_index(iterations, &f))),
      | QueueMode::Concurrent if self.is_current() => {
        self.check_inline()?;
        run_every_index(iterations, &f);
        Ok(())
      },
      | QueueMode::Concurrent => {
        let body = Arc::new(f);
        let latch = CompletionLatch::new(iterations);
        for index in 0..iterations {
          let body = Arc::clone(&body);
          let job = Job::awaited(WorkItem::new(move || (*body)(index)), latch.clone());
          if let Err(error) = self.shared.enqueue_or_reject(JobKind::Plain, job) {
            for _ in index..iterations {
              latch.count_down();
            }
            latch.wait();
            return Err(error);
          }
        }
        latch.wait();
        Ok(())
      },
    }
  }

  /// Enters `group`, queues `f`, and leaves the group once `f` returns or panics.
  pub fn submit_in_group<F>(&self, group: &Group, f: F)
  where
    F: FnOnce() + Send + 'static, {
    let lease = group.lease();
    self.submit(move || {
      let _lease = lease;
      f();
    });
  }

  /// Queues `f` on this queue once `group` drains, or right away if it is already empty.
  pub fn submit_notify<F>(&self, group: &Group, f: F)
  where
    F: FnOnce() + Send + 'static, {
    group.notify(self, f);
  }

  /// Queues `f` as a barrier. On a serial queue this is the same as [`Queue::submit`].
  pub fn submit_barrier<F>(&self, f: F)
  where
    F: FnOnce() + Send + 'static, {
    self.shared.enqueue(JobKind::Barrier, Job::detached(WorkItem::new(f)));
  }

  /// Queues `f` as a barrier and blocks until it has finished.
  ///
  /// # Errors
  ///
  /// Returns [`DispatchError::ReentrantAwait`] when called from a worker of this queue, and
  /// [`DispatchError::RejectedExecution`] when no worker thread can be started.
  ///
  /// # Panics
  ///
  /// Re-raises a panic of `f` on the calling thread.
  pub fn submit_and_await_barrier<F>(&self, f: F) -> Result<(), DispatchError>
  where
    F: FnOnce() + Send + 'static, {
    self.await_item(JobKind::Barrier, WorkItem::new(f))
  }

  fn await_item(&self, kind: JobKind, item: WorkItem) -> Result<(), DispatchError> {
    if self.is_current() {
      return match (self.mode(), kind) {
        | (QueueMode::Concurrent, JobKind::Plain) => {
          self.check_inline()?;
          item.run();
          Ok(())
        },
        | _ => Err(DispatchError::reentrant_await(self.label())),
      };
    }
    let latch = CompletionLatch::new(1);
    self.shared.enqueue_or_reject(kind, Job::awaited(item, latch.clone()))?;
    latch.wait();
    Ok(())
  }

  fn check_inline(&self) -> Result<(), DispatchError> {
    if self.shared.may_run_inline() { Ok(()) } else { Err(DispatchError::reentrant_await(self.label())) }
  }
}

/// Invokes `f` for every index in `0..iterations`, then re-raises the first panic if any index panicked.
fn run_every_index<F>(iterations: usize, f: &F)
where
  F: Fn(usize), {
  let mut first_panic = None;
  for index in 0..iterations {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(index))) {
      first_panic.get_or_insert(payload);
    }
  }
  if let Some(payload) = first_panic {
    panic::resume_unwind(payload);
  }
}

impl PartialEq for Queue {
  fn eq(&self, other: &Self) -> bool {
    self.id() == other.id()
  }
}

impl Eq for Queue {}

impl Hash for Queue {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id().hash(state);
  }
}

impl fmt::Debug for Queue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Queue")
      .field("id", &self.id())
      .field("label", &self.label())
      .field("mode", &self.mode())
      .finish()
  }
}
