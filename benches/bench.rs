use criterion::*;
use parking_lot::Mutex;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::{
  collections::BTreeSet,
  sync::{atomic::*, *},
  thread,
};
use swmr_skl::*;

fn skiplist_round(l: &SkipList<u64>, case: &(u64, bool)) {
  if case.1 {
    if let Some(k) = l.get(&case.0) {
      assert_eq!(*k, case.0);
    }
  } else {
    l.insert(case.0).unwrap();
  }
}

fn btree_round(m: &Mutex<BTreeSet<u64>>, case: &(u64, bool)) {
  if case.1 {
    let m = m.lock();
    if let Some(k) = m.get(&case.0) {
      assert_eq!(*k, case.0);
    }
  } else {
    m.lock().insert(case.0);
  }
}

/// Reads and writes on the benchmark thread, in a `frac / 10` read ratio, while a
/// background thread keeps inserting random keys.
fn bench_read_write_skiplist_frac(b: &mut Bencher<'_>, frac: &usize) {
  let frac = *frac;
  let list = Arc::new(SkipList::<u64>::new().unwrap());
  let l = list.clone();
  let stop = Arc::new(AtomicBool::new(false));
  let s = stop.clone();
  let j = thread::spawn(move || {
    let mut rng = SmallRng::seed_from_u64(1);
    while !s.load(Ordering::SeqCst) {
      let case = (rng.random::<u64>(), false);
      skiplist_round(&l, &case);
    }
  });
  let mut rng = SmallRng::seed_from_u64(2);
  b.iter_batched_ref(
    || (rng.random::<u64>(), frac > rng.random_range(0..11)),
    |case| skiplist_round(&list, case),
    BatchSize::SmallInput,
  );
  stop.store(true, Ordering::SeqCst);
  j.join().unwrap();
}

fn bench_read_write_skiplist(c: &mut Criterion) {
  let mut group = c.benchmark_group("skiplist_read_write");
  for i in 0..=10 {
    group.bench_with_input(
      BenchmarkId::from_parameter(i),
      &i,
      bench_read_write_skiplist_frac,
    );
  }
  group.finish();
}

fn bench_read_write_btree_frac(b: &mut Bencher<'_>, frac: &usize) {
  let frac = *frac;
  let set = Arc::new(Mutex::new(BTreeSet::new()));
  let m = set.clone();
  let stop = Arc::new(AtomicBool::new(false));
  let s = stop.clone();
  let j = thread::spawn(move || {
    let mut rng = SmallRng::seed_from_u64(1);
    while !s.load(Ordering::SeqCst) {
      let case = (rng.random::<u64>(), false);
      btree_round(&m, &case);
    }
  });
  let mut rng = SmallRng::seed_from_u64(2);
  b.iter_batched_ref(
    || (rng.random::<u64>(), frac > rng.random_range(0..11)),
    |case| btree_round(&set, case),
    BatchSize::SmallInput,
  );
  stop.store(true, Ordering::SeqCst);
  j.join().unwrap();
}

fn bench_read_write_btree(c: &mut Criterion) {
  let mut group = c.benchmark_group("btree_parkinglot_read_write");
  for i in 0..=10 {
    group.bench_with_input(
      BenchmarkId::from_parameter(i),
      &i,
      bench_read_write_btree_frac,
    );
  }
  group.finish();
}

fn bench_write_skiplist(c: &mut Criterion) {
  let list = SkipList::<u64>::new().unwrap();
  let mut rng = SmallRng::seed_from_u64(3);
  c.bench_function("skiplist_write", |b| {
    b.iter_batched(
      || rng.random::<u64>(),
      |key| list.insert(key).unwrap(),
      BatchSize::SmallInput,
    )
  });
}

fn bench_contains_skiplist(c: &mut Criterion) {
  const N: u64 = 100_000;
  let list = SkipList::<u64>::new().unwrap();
  for k in 0..N {
    list.insert(k * 2).unwrap();
  }
  let mut rng = SmallRng::seed_from_u64(4);
  c.bench_function("skiplist_contains", |b| {
    b.iter_batched(
      || rng.random_range(0..N * 2),
      |key| black_box(list.contains(&key)),
      BatchSize::SmallInput,
    )
  });
}

criterion_group!(
  benches,
  bench_read_write_skiplist,
  bench_read_write_btree,
  bench_write_skiplist,
  bench_contains_skiplist,
);
criterion_main!(benches);
