use swmr_skl::SkipList;

/// Only used for testing
pub fn key(i: u64) -> String {
  format!("{:08}", i)
}

/// Collects every key of the skiplist in order, walking it through `ge` only.
///
/// Only used for testing
pub fn collect(l: &SkipList<String>) -> Vec<String> {
  let mut out = Vec::new();
  let mut next = l.first().cloned();
  while let Some(k) = next {
    // Keys are fixed width, so appending the lowest byte yields the successor
    // of `k` in byte order.
    let succ = format!("{k}\0");
    next = l.ge(&succ).cloned();
    out.push(k);
  }
  out
}
