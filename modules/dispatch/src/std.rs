mod completion_latch;
mod current_queue;
mod delay_entry;
mod delay_timer;
mod group;
mod group_lease;
mod group_notification;
mod job;
mod queue;
mod queue_registry;
mod queue_shared;
mod queue_state;
mod semaphore;
mod sync_condvar;
mod sync_mutex;
mod sync_mutex_guard;

pub use completion_latch::CompletionLatch;
pub use delay_timer::DelayTimer;
pub use group::Group;
pub use group_lease::GroupLease;
pub use queue::Queue;
pub use queue_registry::{MAIN_QUEUE_LABEL, QueueRegistry};
pub use semaphore::Semaphore;
pub use sync_condvar::StdSyncCondvar;
pub use sync_mutex::StdSyncMutex;
pub use sync_mutex_guard::StdSyncMutexGuard;

/// `tracing` target used by every event the runtime emits.
pub const TRACING_TARGET: &str = "lanes::dispatch";
