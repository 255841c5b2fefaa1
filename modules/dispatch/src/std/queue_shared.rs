use std::{num::NonZeroUsize, sync::Arc, thread};

use tracing::{debug, error, trace, warn};

use super::{
  DelayTimer, StdSyncCondvar, StdSyncMutex, StdSyncMutexGuard, TRACING_TARGET, current_queue::CurrentQueueScope,
  job::Job, queue_state::QueueState,
};
use crate::core::{DispatchError, JobKind, QueueConfig, QueueId};

/// State shared between the handles of a queue and its worker threads.
#[derive(Debug)]
pub(crate) struct QueueShared {
  id:             QueueId,
  config:         QueueConfig,
  worker_limit:   NonZeroUsize,
  state:          StdSyncMutex<QueueState>,
  work_available: StdSyncCondvar,
  timer:          DelayTimer,
}

impl QueueShared {
  pub(crate) fn new(config: QueueConfig, timer: DelayTimer) -> Self {
    let fallback = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
    let worker_limit = config.effective_worker_limit(fallback);
    Self {
      id: QueueId::allocate(),
      state: StdSyncMutex::new(QueueState::new(config.mode())),
      config,
      worker_limit,
      work_available: StdSyncCondvar::new(),
      timer,
    }
  }

  pub(crate) const fn id(&self) -> QueueId {
    self.id
  }

  pub(crate) const fn config(&self) -> &QueueConfig {
    &self.config
  }

  pub(crate) const fn worker_limit(&self) -> NonZeroUsize {
    self.worker_limit
  }

  pub(crate) const fn timer(&self) -> &DelayTimer {
    &self.timer
  }

  pub(crate) fn pending_len(&self) -> usize {
    self.state.lock().admission.pending_len()
  }

  pub(crate) fn worker_count(&self) -> usize {
    self.state.lock().workers
  }

  /// Returns `true` when a worker of this queue may run plain work inline without overtaking a
  /// barrier.
  pub(crate) fn may_run_inline(&self) -> bool {
    !self.state.lock().admission.is_barrier_outstanding()
  }

  /// Queues a job nobody waits for. If no worker can be started it stays pending until a later
  /// submission manages to start one.
  pub(crate) fn enqueue(self: &Arc<Self>, kind: JobKind, job: Job) {
    let mut state = self.state.lock();
    state.admission.push(kind, job);
    trace!(target: TRACING_TARGET, queue = self.config.label(), ?kind, "job queued");
    if let Err(error) = self.wake_workers(&mut state, 0) {
      warn!(target: TRACING_TARGET, queue = self.config.label(), %error, "job left pending");
    }
  }

  /// Queues a job an awaiting caller will block on. The job is withdrawn when no worker exists
  /// and none can be started, since the caller would otherwise wait forever.
  pub(crate) fn enqueue_or_reject(self: &Arc<Self>, kind: JobKind, job: Job) -> Result<(), DispatchError> {
    let mut state = self.state.lock();
    state.admission.push(kind, job);
    trace!(target: TRACING_TARGET, queue = self.config.label(), ?kind, "awaited job queued");
    match self.wake_workers(&mut state, 0) {
      | Ok(()) => Ok(()),
      | Err(error) if state.workers == 0 => {
        state.admission.retract_last();
        Err(error)
      },
      | Err(_) => Ok(()),
    }
  }

  /// Wakes idle workers and starts new ones until every admissible job has a worker, within the
  /// worker limit. `reserved` counts callers that will take a job themselves.
  fn wake_workers(
    self: &Arc<Self>,
    state: &mut StdSyncMutexGuard<'_, QueueState>,
    reserved: usize,
  ) -> Result<(), DispatchError> {
    let demand = state.admission.admissible_count().saturating_sub(reserved);
    if demand == 0 {
      return Ok(());
    }
    if state.idle > 0 {
      if demand > 1 {
        self.work_available.notify_all();
      } else {
        self.work_available.notify_one();
      }
    }
    let available = state.idle + state.starting;
    let capacity = self.worker_limit.get().saturating_sub(state.workers);
    let to_spawn = demand.saturating_sub(available).min(capacity);
    for _ in 0..to_spawn {
      self.spawn_worker(state)?;
    }
    Ok(())
  }

  fn spawn_worker(self: &Arc<Self>, state: &mut StdSyncMutexGuard<'_, QueueState>) -> Result<(), DispatchError> {
    let name = format!("{}-worker-{}", self.config.label(), state.spawned);
    let shared = Arc::clone(self);
    match thread::Builder::new().name(name).spawn(move || shared.run_worker()) {
      | Ok(_) => {
        state.spawned += 1;
        state.workers += 1;
        state.starting += 1;
        Ok(())
      },
      | Err(error) => {
        error!(target: TRACING_TARGET, queue = self.config.label(), %error, "failed to spawn worker thread");
        Err(DispatchError::RejectedExecution)
      },
    }
  }

  fn run_worker(self: Arc<Self>) {
    let _scope = CurrentQueueScope::enter(self.id);
    let label = self.config.label();
    let keep_alive = self.config.keep_alive();
    let mut state = self.state.lock();
    state.starting -= 1;
    debug!(target: TRACING_TARGET, queue = label, workers = state.workers, "worker started");
    loop {
      if let Some((kind, job)) = state.admission.admit() {
        drop(state);
        let outcome = job.execute();
        state = self.state.lock();
        state.admission.complete(kind);
        if let Err(error) = self.wake_workers(&mut state, 1) {
          trace!(target: TRACING_TARGET, queue = label, %error, "continuing with current workers");
        }
        drop(state);
        outcome.settle(label);
        state = self.state.lock();
        continue;
      }
      state.idle += 1;
      let (next, timed_out) = self.work_available.wait_timeout(state, keep_alive);
      state = next;
      state.idle -= 1;
      if timed_out && !state.admission.has_admissible() {
        state.workers -= 1;
        debug!(target: TRACING_TARGET, queue = label, workers = state.workers, "idle worker exiting");
        return;
      }
    }
  }
}
