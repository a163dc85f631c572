use swmr_skl::{Descend, Error, SkipList};

fn main() -> Result<(), Error> {
  let l = SkipList::<&str>::new()?;
  for word in ["pear", "apple", "fig", "kiwi", "apple"] {
    l.insert(word)?;
  }

  // Duplicates are kept by `insert`.
  assert_eq!(l.len(), 5);
  assert_eq!(l.first(), Some(&"apple"));
  assert_eq!(l.ge(&"b"), Some(&"fig"));
  assert!(l.contains(&"kiwi"));
  assert!(!l.contains(&"plum"));

  match l.try_insert("fig") {
    Err(Error::Duplicated) => {}
    res => panic!("unexpected result: {res:?}"),
  }

  let rev = SkipList::<u32, _>::with_comparator(Descend)?;
  for k in 0..10 {
    rev.insert(k)?;
  }
  assert_eq!(rev.first(), Some(&9));
  assert_eq!(rev.ge(&4), Some(&4));

  println!("{l:?}");
  println!("{rev:?}");
  Ok(())
}
