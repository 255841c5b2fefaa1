mod admission_queue;
mod dispatch_error;
mod job_kind;
mod queue_config;
mod queue_id;
mod queue_mode;
mod queue_priority;
mod queue_registry_error;
mod work_item;

pub use admission_queue::AdmissionQueue;
pub use dispatch_error::DispatchError;
pub use job_kind::JobKind;
pub use queue_config::QueueConfig;
pub use queue_id::QueueId;
pub use queue_mode::QueueMode;
pub use queue_priority::QueuePriority;
pub use queue_registry_error::QueueRegistryError;
pub use work_item::WorkItem;
