use std::{sync::Arc, thread};
use swmr_skl::SkipList;

fn main() {
  const N: u64 = 10_000;

  let l = Arc::new(SkipList::<u64>::new().unwrap());

  let writer = {
    let l = l.clone();
    thread::spawn(move || {
      for k in 0..N {
        l.insert(k).unwrap();
      }
    })
  };

  let readers: Vec<_> = (0..4)
    .map(|_| {
      let l = l.clone();
      thread::spawn(move || {
        // Keys are inserted in order, so once `k` is visible every smaller key is too.
        let mut seen = 0;
        while seen < N {
          if l.contains(&seen) {
            for k in 0..seen {
              assert!(l.contains(&k), "broken: {k}");
            }
            seen += 1 + seen / 2;
          } else {
            thread::yield_now();
          }
        }
      })
    })
    .collect();

  writer.join().unwrap();
  for r in readers {
    r.join().unwrap();
  }
  println!("{} keys, height {}", l.len(), l.height());
}
