use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use super::{
  TRACING_TARGET,
  completion_latch::{CompletionLatch, PanicPayload},
};
use crate::core::WorkItem;

/// Work item as stored in a queue, with the latch of an awaiting caller if there is one.
#[derive(Debug)]
pub(crate) struct Job {
  item:       WorkItem,
  completion: Option<CompletionLatch>,
}

/// Result of running a job body, reported once the queue has released the job.
pub(crate) struct JobOutcome {
  result:     Result<(), PanicPayload>,
  completion: Option<CompletionLatch>,
}

impl Job {
  pub(crate) const fn detached(item: WorkItem) -> Self {
    Self { item, completion: None }
  }

  pub(crate) const fn awaited(item: WorkItem, completion: CompletionLatch) -> Self {
    Self { item, completion: Some(completion) }
  }

  /// Runs the body on the calling thread, catching panics.
  pub(crate) fn execute(self) -> JobOutcome {
    let Job { item, completion } = self;
    let result = panic::catch_unwind(AssertUnwindSafe(|| item.run()));
    JobOutcome { result, completion }
  }
}

impl JobOutcome {
  /// Releases the awaiting caller, or logs a panic nobody is waiting for.
  pub(crate) fn settle(self, label: &str) {
    match (self.result, self.completion) {
      | (Ok(()), Some(latch)) => latch.count_down(),
      | (Ok(()), None) => {},
      | (Err(payload), Some(latch)) => latch.count_down_panicked(payload),
      | (Err(payload), None) => {
        error!(target: TRACING_TARGET, queue = label, panic = panic_message(&payload), "work item panicked");
      },
    }
  }
}

fn panic_message(payload: &PanicPayload) -> &str {
  if let Some(message) = payload.downcast_ref::<&'static str>() {
    message
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.as_str()
  } else {
    "non-string panic payload"
  }
}
