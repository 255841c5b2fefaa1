use std::{
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  thread,
  time::{Duration, Instant},
};

use super::Semaphore;

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn wait_after_signal_does_not_block() {
  let semaphore = Semaphore::default();
  semaphore.signal();
  assert!(semaphore.wait_timeout(Duration::from_millis(10)));
  assert_eq!(semaphore.available(), 0);
}

#[test]
fn initial_permits_are_available() {
  let semaphore = Semaphore::new(2);
  semaphore.wait();
  semaphore.wait();
  assert_eq!(semaphore.available(), 0);
}

#[test]
fn wait_timeout_on_empty_semaphore_times_out() {
  let semaphore = Semaphore::new(0);
  let started = Instant::now();
  assert!(!semaphore.wait_timeout(Duration::from_millis(30)));
  assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn n_signals_release_n_waiting_threads() {
  const WAITERS: usize = 8;
  let semaphore = Semaphore::new(0);
  let released = Arc::new(AtomicUsize::new(0));

  let handles: Vec<_> = (0..WAITERS)
    .map(|_| {
      let semaphore = semaphore.clone();
      let released = released.clone();
      thread::spawn(move || {
        assert!(semaphore.wait_timeout(WAIT_TIMEOUT));
        released.fetch_add(1, Ordering::SeqCst);
      })
    })
    .collect();

  for _ in 0..WAITERS {
    semaphore.signal();
  }
  for handle in handles {
    handle.join().expect("waiter");
  }
  assert_eq!(released.load(Ordering::SeqCst), WAITERS);
  assert_eq!(semaphore.available(), 0);
}

#[test]
fn waiters_are_released_in_arrival_order() {
  let semaphore = Semaphore::new(0);
  let order = Arc::new(Mutex::new(Vec::new()));

  let mut handles = Vec::new();
  for index in 0..3 {
    let semaphore_for_waiter = semaphore.clone();
    let order = order.clone();
    handles.push(thread::spawn(move || {
      assert!(semaphore_for_waiter.wait_timeout(WAIT_TIMEOUT));
      order.lock().expect("order").push(index);
    }));
    wait_for_waiters(&semaphore, index + 1);
  }

  for expected in 0..3 {
    semaphore.signal();
    wait_until(|| order.lock().expect("order").len() == expected + 1);
  }
  for handle in handles {
    handle.join().expect("waiter");
  }
  assert_eq!(*order.lock().expect("order"), vec![0, 1, 2]);
}

#[test]
fn timed_out_waiter_does_not_consume_later_signal() {
  let semaphore = Semaphore::new(0);
  assert!(!semaphore.wait_timeout(Duration::from_millis(5)));
  semaphore.signal();
  assert_eq!(semaphore.available(), 1);
  semaphore.wait();
}

#[test]
fn clones_share_permits() {
  let semaphore = Semaphore::new(0);
  let clone = semaphore.clone();
  clone.signal();
  assert_eq!(semaphore.available(), 1);
}

fn wait_for_waiters(semaphore: &Semaphore, expected: usize) {
  wait_until(|| semaphore.inner.state.lock().waiters.len() == expected);
}

fn wait_until(mut condition: impl FnMut() -> bool) {
  let deadline = Instant::now() + WAIT_TIMEOUT;
  while !condition() {
    assert!(Instant::now() < deadline, "condition not met in time");
    thread::sleep(Duration::from_millis(1));
  }
}
