use integration::{collect, key};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use std::{
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  thread,
};
use swmr_skl::{Ascend, Options, SkipList};

fn main() {
  tracing_subscriber::fmt::try_init().unwrap();

  const N: u64 = 20_000;
  const READERS: usize = 4;

  let l = Arc::new(SkipList::<String>::with_options(Options::new().with_seed(42), Ascend).unwrap());
  let done = Arc::new(AtomicBool::new(false));

  let readers: Vec<_> = (0..READERS)
    .map(|r| {
      let l = l.clone();
      let done = done.clone();
      thread::spawn(move || {
        let mut rounds = 0usize;
        let mut last_len = 0;
        let mut last_height = 1;
        while !done.load(Ordering::Acquire) {
          let keys = collect(&l);
          assert!(keys.windows(2).all(|w| w[0] < w[1]), "broken: reader {r} saw keys out of order");
          assert!(keys.len() >= last_len, "broken: reader {r} lost keys");
          for k in &keys {
            assert!(l.contains(k), "broken: {k}");
          }
          let height = l.height();
          assert!(height >= last_height, "broken: height shrank to {height}");
          last_len = keys.len();
          last_height = height;
          rounds += 1;
        }
        tracing::info!(reader = r, rounds, last_len, "reader finished");
      })
    })
    .collect();

  let mut order: Vec<u64> = (0..N).collect();
  order.shuffle(&mut SmallRng::seed_from_u64(7));
  for i in order {
    l.insert(key(i)).unwrap();
  }
  done.store(true, Ordering::Release);

  for r in readers {
    r.join().unwrap();
  }

  assert_eq!(l.len(), N as usize);
  let keys = collect(&l);
  assert_eq!(keys.len(), N as usize);
  for (i, k) in keys.iter().enumerate() {
    assert_eq!(*k, key(i as u64), "broken: {i}");
  }
  tracing::info!(len = l.len(), height = l.height(), "stress test passed");
}
