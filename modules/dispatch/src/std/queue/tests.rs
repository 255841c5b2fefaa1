use std::{
  collections::HashSet,
  num::NonZeroUsize,
  panic::{self, AssertUnwindSafe},
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  thread,
  time::{Duration, Instant},
};

use super::Queue;
use crate::{
  core::{DispatchError, QueueConfig, QueueMode},
  std::{Group, Semaphore},
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn submit_runs_item_asynchronously() {
  let queue = Queue::serial("submit");
  let done = Semaphore::new(0);
  let value = Arc::new(AtomicUsize::new(0));

  queue.submit({
    let done = done.clone();
    let value = value.clone();
    move || {
      value.fetch_add(1, Ordering::SeqCst);
      done.signal();
    }
  });

  assert!(done.wait_timeout(WAIT_TIMEOUT));
  assert_eq!(value.load(Ordering::SeqCst), 1);
}

#[test]
fn serial_queue_runs_items_in_submission_order() {
  let queue = Queue::serial("serial-order");
  let order = Arc::new(Mutex::new(Vec::new()));
  for index in 0..50 {
    let order = order.clone();
    queue.submit(move || order.lock().expect("order").push(index));
  }
  queue.submit_and_await(|| {}).expect("await");
  assert_eq!(*order.lock().expect("order"), (0..50).collect::<Vec<_>>());
}

#[test]
fn serial_queue_never_overlaps_items() {
  let queue = Queue::serial("serial-exclusive");
  let running = Arc::new(AtomicBool::new(false));
  let overlaps = Arc::new(AtomicUsize::new(0));
  for _ in 0..20 {
    let running = running.clone();
    let overlaps = overlaps.clone();
    queue.submit(move || {
      if running.swap(true, Ordering::SeqCst) {
        overlaps.fetch_add(1, Ordering::SeqCst);
      }
      thread::sleep(Duration::from_millis(1));
      running.store(false, Ordering::SeqCst);
    });
  }
  queue.submit_and_await(|| {}).expect("await");
  assert_eq!(overlaps.load(Ordering::SeqCst), 0);
  assert!(queue.worker_count() <= 1);
}

#[test]
fn first_item_effect_is_visible_to_second_on_serial_queue() {
  let queue = Queue::serial("serial-visibility");
  let x = Arc::new(AtomicUsize::new(0));
  let observed = Arc::new(AtomicUsize::new(usize::MAX));
  queue.submit({
    let x = x.clone();
    move || x.store(1, Ordering::SeqCst)
  });
  queue
    .submit_and_await({
      let x = x.clone();
      let observed = observed.clone();
      move || observed.store(x.load(Ordering::SeqCst), Ordering::SeqCst)
    })
    .expect("await");
  assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[test]
fn submit_and_await_blocks_until_item_finishes() {
  let queue = Queue::concurrent("await");
  let value = Arc::new(AtomicUsize::new(0));
  queue
    .submit_and_await({
      let value = value.clone();
      move || {
        thread::sleep(Duration::from_millis(10));
        value.fetch_add(1, Ordering::SeqCst);
      }
    })
    .expect("await");
  assert_eq!(value.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_queue_runs_items_in_parallel() {
  let queue = Queue::new(QueueConfig::concurrent("parallel").with_worker_limit(NonZeroUsize::new(2).expect("two")));
  let first_started = Semaphore::new(0);
  let second_started = Semaphore::new(0);

  queue.submit({
    let first_started = first_started.clone();
    let second_started = second_started.clone();
    move || {
      first_started.signal();
      assert!(second_started.wait_timeout(WAIT_TIMEOUT));
    }
  });
  let second = {
    let first_started = first_started.clone();
    let second_started = second_started.clone();
    move || {
      assert!(first_started.wait_timeout(WAIT_TIMEOUT));
      second_started.signal();
    }
  };
  queue.submit_and_await(second).expect("await");
}

#[test]
fn worker_count_respects_limit() {
  let limit = NonZeroUsize::new(3).expect("three");
  let queue = Queue::new(QueueConfig::concurrent("limited").with_worker_limit(limit));
  let active = Arc::new(AtomicUsize::new(0));
  let peak = Arc::new(AtomicUsize::new(0));
  let group = Group::new();
  for _ in 0..30 {
    let active = active.clone();
    let peak = peak.clone();
    queue.submit_in_group(&group, move || {
      let now = active.fetch_add(1, Ordering::SeqCst) + 1;
      peak.fetch_max(now, Ordering::SeqCst);
      thread::sleep(Duration::from_millis(2));
      active.fetch_sub(1, Ordering::SeqCst);
    });
  }
  assert!(group.wait_timeout(WAIT_TIMEOUT));
  assert!(peak.load(Ordering::SeqCst) <= limit.get());
  assert!(queue.worker_count() <= limit.get());
  assert_eq!(queue.worker_limit(), limit);
}

#[test]
fn iterations_cover_every_index_exactly_once() {
  for mode in [QueueMode::Serial, QueueMode::Concurrent] {
    let queue = Queue::new(QueueConfig::new("iterations", mode));
    let seen = Arc::new(Mutex::new(Vec::new()));
    queue
      .submit_and_await_iterations(64, {
        let seen = seen.clone();
        move |index| seen.lock().expect("seen").push(index)
      })
      .expect("iterations");
    let mut seen = seen.lock().expect("seen").clone();
    if mode.is_serial() {
      assert_eq!(seen, (0..64).collect::<Vec<_>>());
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
  }
}

#[test]
fn zero_iterations_return_immediately() {
  let queue = Queue::concurrent("zero-iterations");
  let calls = Arc::new(AtomicUsize::new(0));
  queue
    .submit_and_await_iterations(0, {
      let calls = calls.clone();
      move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
      }
    })
    .expect("iterations");
  assert_eq!(calls.load(Ordering::SeqCst), 0);
  assert_eq!(queue.worker_count(), 0);
}

#[test]
fn iterations_spread_over_workers() {
  let limit = NonZeroUsize::new(4).expect("four");
  let queue = Queue::new(QueueConfig::concurrent("iteration-threads").with_worker_limit(limit));
  let threads = Arc::new(Mutex::new(HashSet::new()));
  queue
    .submit_and_await_iterations(32, {
      let threads = threads.clone();
      move |_| {
        threads.lock().expect("threads").insert(thread::current().id());
        thread::sleep(Duration::from_millis(2));
      }
    })
    .expect("iterations");
  let threads = threads.lock().expect("threads");
  assert!(!threads.is_empty());
  assert!(threads.len() <= limit.get());
  assert!(!threads.contains(&thread::current().id()));
}

#[test]
fn barrier_observes_all_prior_items_and_none_after() {
  let queue = Queue::concurrent("barrier");
  let counter = Arc::new(AtomicUsize::new(0));
  let barrier_value = Arc::new(AtomicUsize::new(usize::MAX));
  let done = Semaphore::new(0);

  for _ in 0..100 {
    let counter = counter.clone();
    queue.submit(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
  }
  queue.submit_barrier({
    let counter = counter.clone();
    let barrier_value = barrier_value.clone();
    let done = done.clone();
    move || {
      thread::sleep(Duration::from_millis(5));
      barrier_value.store(counter.load(Ordering::SeqCst), Ordering::SeqCst);
      done.signal();
    }
  });
  for _ in 0..100 {
    let counter = counter.clone();
    queue.submit(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
  }

  assert!(done.wait_timeout(WAIT_TIMEOUT));
  assert_eq!(barrier_value.load(Ordering::SeqCst), 100);
  queue.submit_and_await_barrier(|| {}).expect("drain");
  assert_eq!(counter.load(Ordering::SeqCst), 200);
}

#[test]
fn barrier_never_runs_alongside_other_items() {
  let queue = Queue::concurrent("barrier-exclusive");
  let active = Arc::new(AtomicUsize::new(0));
  let violations = Arc::new(AtomicUsize::new(0));

  for _ in 0..5 {
    for _ in 0..10 {
      let active = active.clone();
      queue.submit(move || {
        active.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(1));
        active.fetch_sub(1, Ordering::SeqCst);
      });
    }
    let active = active.clone();
    let violations = violations.clone();
    queue.submit_barrier(move || {
      if active.load(Ordering::SeqCst) != 0 {
        violations.fetch_add(1, Ordering::SeqCst);
      }
      thread::sleep(Duration::from_millis(1));
    });
  }
  queue.submit_and_await_barrier(|| {}).expect("drain");
  assert_eq!(violations.load(Ordering::SeqCst), 0);
}

#[test]
fn await_barrier_returns_after_prior_items() {
  let queue = Queue::concurrent("await-barrier");
  let counter = Arc::new(AtomicUsize::new(0));
  for _ in 0..100 {
    let counter = counter.clone();
    queue.submit(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
  }
  queue.submit_and_await_barrier(|| {}).expect("barrier");
  assert_eq!(counter.load(Ordering::SeqCst), 100);
}

#[test]
fn barrier_on_serial_queue_is_ordinary_submit() {
  let queue = Queue::serial("serial-barrier");
  let order = Arc::new(Mutex::new(Vec::new()));
  for index in 0..3 {
    let order = order.clone();
    if index == 1 {
      queue.submit_barrier(move || order.lock().expect("order").push(index));
    } else {
      queue.submit(move || order.lock().expect("order").push(index));
    }
  }
  queue.submit_and_await(|| {}).expect("await");
  assert_eq!(*order.lock().expect("order"), vec![0, 1, 2]);
}

#[test]
fn submit_after_waits_for_delay() {
  let queue = Queue::serial("delay");
  let done = Semaphore::new(0);
  let started = Instant::now();
  let ran = Arc::new(AtomicBool::new(false));
  queue.submit_after(Duration::from_millis(50), {
    let done = done.clone();
    let ran = ran.clone();
    move || {
      ran.store(true, Ordering::SeqCst);
      done.signal();
    }
  });
  assert!(!ran.load(Ordering::SeqCst));
  assert!(done.wait_timeout(WAIT_TIMEOUT));
  assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn group_counts_all_submitted_items() {
  let queue = Queue::concurrent("group");
  let group = Group::new();
  let counter = Arc::new(AtomicUsize::new(0));
  for _ in 0..100 {
    let counter = counter.clone();
    queue.submit_in_group(&group, move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
  }
  group.wait();
  assert_eq!(counter.load(Ordering::SeqCst), 100);
  assert_eq!(group.outstanding(), 0);
}

#[test]
fn notify_observes_every_grouped_item() {
  let queue = Queue::concurrent("group-notify");
  let group = Group::new();
  let counter = Arc::new(AtomicUsize::new(0));
  let notified = Arc::new(AtomicUsize::new(0));
  let done = Semaphore::new(0);
  for _ in 0..100 {
    let counter = counter.clone();
    queue.submit_in_group(&group, move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
  }
  queue.submit_notify(&group, {
    let counter = counter.clone();
    let notified = notified.clone();
    let done = done.clone();
    move || {
      notified.store(counter.load(Ordering::SeqCst), Ordering::SeqCst);
      done.signal();
    }
  });
  assert!(done.wait_timeout(WAIT_TIMEOUT));
  assert_eq!(notified.load(Ordering::SeqCst), 100);
}

#[test]
fn panicking_item_still_leaves_group() {
  let queue = Queue::concurrent("group-panic");
  let group = Group::new();
  queue.submit_in_group(&group, || panic!("work item failure"));
  assert!(group.wait_timeout(WAIT_TIMEOUT));

  let done = Semaphore::new(0);
  queue.submit({
    let done = done.clone();
    move || done.signal()
  });
  assert!(done.wait_timeout(WAIT_TIMEOUT));
}

#[test]
fn panicking_barrier_releases_queue() {
  let queue = Queue::concurrent("barrier-panic");
  queue.submit_barrier(|| panic!("barrier failure"));
  let counter = Arc::new(AtomicUsize::new(0));
  queue
    .submit_and_await({
      let counter = counter.clone();
      move || {
        counter.fetch_add(1, Ordering::SeqCst);
      }
    })
    .expect("await");
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn submit_and_await_reraises_panic_on_caller() {
  let queue = Queue::serial("await-panic");
  let result = panic::catch_unwind(AssertUnwindSafe(|| queue.submit_and_await(|| panic!("awaited failure"))));
  let payload = result.expect_err("panic should reach the caller");
  assert_eq!(payload.downcast_ref::<&str>(), Some(&"awaited failure"));
  queue.submit_and_await(|| {}).expect("queue keeps working");
}

#[test]
fn reentrant_await_on_serial_queue_is_rejected() {
  let queue = Queue::serial("reentrant-serial");
  let inner = queue.clone();
  let observed = Arc::new(Mutex::new(None));
  queue
    .submit_and_await({
      let observed = observed.clone();
      move || {
        let result = inner.submit_and_await(|| {});
        *observed.lock().expect("observed") = Some(result);
      }
    })
    .expect("outer await");
  let expected = Some(Err(DispatchError::reentrant_await("reentrant-serial")));
  assert_eq!(*observed.lock().expect("observed"), expected);
}

#[test]
fn reentrant_await_on_concurrent_queue_runs_inline() {
  let queue = Queue::new(QueueConfig::concurrent("reentrant-concurrent").with_worker_limit(NonZeroUsize::MIN));
  let inner = queue.clone();
  let inline_thread = Arc::new(Mutex::new(None));
  let outer_thread = Arc::new(Mutex::new(None));
  queue
    .submit_and_await({
      let inline_thread = inline_thread.clone();
      let outer_thread = outer_thread.clone();
      move || {
        *outer_thread.lock().expect("outer") = Some(thread::current().id());
        assert!(inner.is_current());
        inner
          .submit_and_await(move || {
            *inline_thread.lock().expect("inline") = Some(thread::current().id());
          })
          .expect("inline await");
        assert_eq!(
          inner.submit_and_await_barrier(|| {}),
          Err(DispatchError::reentrant_await("reentrant-concurrent"))
        );
      }
    })
    .expect("outer await");
  assert_eq!(*inline_thread.lock().expect("inline"), *outer_thread.lock().expect("outer"));
}

#[test]
fn reentrant_await_is_rejected_while_barrier_is_pending() {
  let limit = NonZeroUsize::new(2).expect("two");
  let queue = Queue::new(QueueConfig::concurrent("reentrant-barrier").with_worker_limit(limit));
  let inner = queue.clone();
  let order = Arc::new(Mutex::new(Vec::new()));
  let started = Semaphore::new(0);
  let gate = Semaphore::new(0);
  let observed = Arc::new(Mutex::new(None));

  queue.submit({
    let order = order.clone();
    let started = started.clone();
    let gate = gate.clone();
    let observed = observed.clone();
    move || {
      started.signal();
      gate.wait();
      let result = inner.submit_and_await(move || order.lock().expect("order").push("after-barrier"));
      *observed.lock().expect("observed") = Some(result);
    }
  });
  assert!(started.wait_timeout(WAIT_TIMEOUT));
  queue.submit_barrier({
    let order = order.clone();
    move || order.lock().expect("order").push("barrier")
  });
  gate.signal();
  queue.submit_and_await_barrier(|| {}).expect("drain");

  let expected = Some(Err(DispatchError::reentrant_await("reentrant-barrier")));
  assert_eq!(*observed.lock().expect("observed"), expected);
  assert_eq!(*order.lock().expect("order"), vec!["barrier"]);
}

#[test]
fn reentrant_iterations_are_rejected_while_barrier_is_pending() {
  let queue = Queue::concurrent("reentrant-iterations-barrier");
  let inner = queue.clone();
  let started = Semaphore::new(0);
  let gate = Semaphore::new(0);
  let calls = Arc::new(AtomicUsize::new(0));
  let observed = Arc::new(Mutex::new(None));

  queue.submit({
    let started = started.clone();
    let gate = gate.clone();
    let calls = calls.clone();
    let observed = observed.clone();
    move || {
      started.signal();
      gate.wait();
      let result = inner.submit_and_await_iterations(3, move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
      });
      *observed.lock().expect("observed") = Some(result);
    }
  });
  assert!(started.wait_timeout(WAIT_TIMEOUT));
  queue.submit_barrier(|| {});
  gate.signal();
  queue.submit_and_await_barrier(|| {}).expect("drain");

  let expected = Some(Err(DispatchError::reentrant_await("reentrant-iterations-barrier")));
  assert_eq!(*observed.lock().expect("observed"), expected);
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn panicking_iteration_does_not_skip_later_indices() {
  for mode in [QueueMode::Serial, QueueMode::Concurrent] {
    let queue = Queue::new(QueueConfig::new("iteration-panic", mode));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
      queue.submit_and_await_iterations(5, {
        let seen = seen.clone();
        move |index| {
          seen.lock().expect("seen").push(index);
          if index == 1 {
            panic!("index one failed");
          }
        }
      })
    }));
    let payload = result.expect_err("panic should reach the caller");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"index one failed"));

    let mut seen = seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
    if mode.is_serial() {
      assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    queue.submit_and_await(|| {}).expect("queue keeps working");
  }
}

#[test]
fn awaiting_callers_reuse_queue_as_soon_as_released() {
  let limit = NonZeroUsize::new(2).expect("two");
  let queue = Queue::new(QueueConfig::concurrent("await-release").with_worker_limit(limit));
  let finished = Semaphore::new(0);
  let callers = 4;
  for _ in 0..callers {
    let queue = queue.clone();
    let finished = finished.clone();
    thread::spawn(move || {
      for round in 0..50 {
        queue.submit_and_await(|| {}).expect("await");
        let _ = queue.pending_len();
        if round % 10 == 0 {
          queue.submit_and_await_barrier(|| {}).expect("barrier");
        }
      }
      finished.signal();
    });
  }
  for _ in 0..callers {
    assert!(finished.wait_timeout(WAIT_TIMEOUT));
  }
}

#[test]
fn is_current_is_false_outside_workers() {
  let queue = Queue::serial("current");
  assert!(!queue.is_current());
  let other = Queue::serial("other");
  let observed = Arc::new(AtomicBool::new(true));
  queue
    .submit_and_await({
      let observed = observed.clone();
      move || observed.store(other.is_current(), Ordering::SeqCst)
    })
    .expect("await");
  assert!(!observed.load(Ordering::SeqCst));
}

#[test]
fn clones_share_identity() {
  let queue = Queue::serial("identity");
  let clone = queue.clone();
  let other = Queue::serial("identity");
  assert_eq!(queue, clone);
  assert_eq!(queue.id(), clone.id());
  assert_ne!(queue, other);
}

#[test]
fn idle_workers_exit_after_keep_alive() {
  let queue = Queue::new(QueueConfig::concurrent("keep-alive").with_keep_alive(Duration::from_millis(10)));
  queue.submit_and_await(|| {}).expect("await");
  let deadline = Instant::now() + WAIT_TIMEOUT;
  while queue.worker_count() > 0 {
    assert!(Instant::now() < deadline, "workers did not exit");
    thread::sleep(Duration::from_millis(5));
  }
  queue.submit_and_await(|| {}).expect("queue restarts workers");
}

#[test]
fn debug_includes_label() {
  let queue = Queue::serial("debug-label");
  let debug_str = format!("{:?}", queue);
  assert!(debug_str.contains("Queue"));
  assert!(debug_str.contains("debug-label"));
}
