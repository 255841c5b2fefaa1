//! Fans a summation out over the default global queue and joins it with a group.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  thread,
  time::Duration,
};

use anyhow::Result;
use lanes_dispatch_rs::{
  core::{QueueConfig, QueuePriority},
  std::{Group, QueueRegistry, Semaphore},
};

fn main() -> Result<()> {
  let registry = QueueRegistry::with_defaults();
  let compute = registry.global(QueuePriority::Default)?;
  let log = registry.register(QueueConfig::serial("log"))?;

  let group = Group::new();
  let total = Arc::new(AtomicUsize::new(0));
  for chunk in 0..8_usize {
    let total = total.clone();
    let log = log.clone();
    compute.submit_in_group(&group, move || {
      let sum: usize = (chunk * 1_000..(chunk + 1) * 1_000).sum();
      total.fetch_add(sum, Ordering::SeqCst);
      log.submit(move || println!("chunk {chunk} summed to {sum}"));
    });
  }

  let finished = Semaphore::default();
  compute.submit_notify(&group, {
    let total = total.clone();
    let finished = finished.clone();
    move || {
      println!("all chunks done: {}", total.load(Ordering::SeqCst));
      finished.signal();
    }
  });
  finished.wait();

  compute.submit_barrier(|| println!("barrier: queue drained"));
  log.submit_after(Duration::from_millis(100), || println!("delayed log line"));
  log.submit_and_await_barrier(|| {})?;
  thread::sleep(Duration::from_millis(200));
  Ok(())
}
