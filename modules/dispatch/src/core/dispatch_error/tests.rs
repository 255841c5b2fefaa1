use alloc::string::ToString;

use super::DispatchError;

#[test]
fn display_rejected_execution() {
  assert_eq!(DispatchError::RejectedExecution.to_string(), "rejected execution");
}

#[test]
fn display_reentrant_await_names_queue() {
  let error = DispatchError::reentrant_await("io");
  assert_eq!(error, DispatchError::ReentrantAwait { label: "io".into() });
  assert!(error.to_string().contains("'io'"));
}
