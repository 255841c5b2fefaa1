#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

//! Serial and concurrent task queues with join groups, barriers and counting semaphores.
//!
//! The [`core`] module holds the runtime-independent pieces (work items, the admission state
//! machine that enforces serial/concurrent/barrier ordering, queue configuration and errors).
//! The [`std`] module runs them on plain OS threads.

extern crate alloc;

/// Runtime-independent building blocks.
pub mod core;
/// Thread-backed queues, groups, semaphores and timers.
#[cfg(feature = "std")]
pub mod std;
