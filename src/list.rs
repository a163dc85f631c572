use core::{fmt, marker::PhantomData};

use crossbeam_utils::CachePadded;
use rand::{rngs::SmallRng, SeedableRng};

use super::{
  node::NodePtr,
  random_height,
  sync::{AtomicUsize, Mutex, Ordering},
  Ascend, Comparator, Error, Options, MAX_HEIGHT,
};


/// An ordered set based on a skiplist, written by one thread at a time and read
/// by any number of threads without locks.
///
/// Keys are immutable once added and deletion is not supported, so a node that
/// a reader reaches stays valid for as long as the skiplist itself. Writers are
/// serialized by an internal lock that readers never touch: [`contains`],
/// [`get`], [`ge`] and [`first`] only issue `Acquire` loads and can run
/// concurrently with an in-flight [`insert`].
///
/// Inserts go through `&self`, so the skiplist is invariant over `K`, like a
/// [`Cell`](core::cell::Cell). A shared reference to a skiplist of long-lived
/// keys cannot be shortened to accept shorter-lived ones:
///
/// ```rust,compile_fail
/// use swmr_skl::SkipList;
///
/// fn shorten<'a>(l: &'a SkipList<&'static str>) -> &'a SkipList<&'a str> {
///   l
/// }
/// ```
///
/// [`contains`]: SkipList::contains
/// [`get`]: SkipList::get
/// [`ge`]: SkipList::ge
/// [`first`]: SkipList::first
/// [`insert`]: SkipList::insert
pub struct SkipList<K, C = Ascend> {
  head: NodePtr<K>,

  /// Current height. 1 <= height <= MAX_HEIGHT. Only grows.
  height: CachePadded<AtomicUsize>,
  len: CachePadded<AtomicUsize>,

  /// Serializes writers. The generator drawing tower heights lives behind it,
  /// since only writers draw.
  writer: Mutex<SmallRng>,

  cmp: C,

  _marker: PhantomData<fn(K) -> K>,
}

// Safety: the skiplist owns its keys, and readers on other threads get `&K`
// to keys that writers on other threads moved in.
unsafe impl<K: Send, C: Send> Send for SkipList<K, C> {}
unsafe impl<K: Send + Sync, C: Sync> Sync for SkipList<K, C> {}

impl<K, C> fmt::Debug for SkipList<K, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SkipList")
      .field("height", &self.height())
      .field("len", &self.len())
      .finish()
  }
}

impl<K, C> Drop for SkipList<K, C> {
  fn drop(&mut self) {
    // Safety: `&mut self` rules out concurrent readers and writers, every
    // node linked at level 0 was allocated by this skiplist and is visited once.
    unsafe {
      let mut curr = self.head.next(0);
      while let Some(nd) = curr {
        curr = nd.next(0);
        nd.free();
      }
      self.head.free_head();
    }
  }
}

// --------------------------------Public Methods--------------------------------
impl<K, C> SkipList<K, C> {
  /// Returns the height of the highest tower within any of the nodes that
  /// have ever been linked into this skiplist.
  #[inline]
  pub fn height(&self) -> usize {
    self.height.load(Ordering::Acquire)
  }

  /// Returns the number of keys in the skiplist, duplicates included.
  #[inline]
  pub fn len(&self) -> usize {
    self.len.load(Ordering::Acquire)
  }

  /// Returns true if the skiplist is empty.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the comparator ordering the keys.
  #[inline]
  pub const fn comparator(&self) -> &C {
    &self.cmp
  }

  /// Returns the smallest key in the skiplist.
  pub fn first(&self) -> Option<&K> {
    // Safety: the head is alive as long as self, and so is every node linked after it.
    unsafe { self.head.next(0).map(|nd| nd.key()) }
  }
}

impl<K: Ord> SkipList<K> {
  /// Creates an empty skiplist ordered by the [`Ord`] implementation of `K`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::SkipList;
  ///
  /// let l = SkipList::<u64>::new().unwrap();
  /// assert!(l.is_empty());
  /// assert_eq!(l.height(), 1);
  /// ```
  pub fn new() -> Result<Self, Error> {
    Self::with_options(Options::new(), Ascend)
  }
}

impl<K, C: Comparator<K>> SkipList<K, C> {
  /// Creates an empty skiplist ordered by `cmp`.
  ///
  /// `cmp` must be a strict total order over the keys.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::SkipList;
  ///
  /// let l = SkipList::<u64, _>::with_comparator(|a: &u64, b: &u64| b.cmp(a)).unwrap();
  /// l.insert(1).unwrap();
  /// l.insert(2).unwrap();
  /// assert_eq!(l.first(), Some(&2));
  /// ```
  pub fn with_comparator(cmp: C) -> Result<Self, Error> {
    Self::with_options(Options::new(), cmp)
  }

  /// Creates an empty skiplist ordered by `cmp` according to the given options.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::{Ascend, Options, SkipList};
  ///
  /// let l = SkipList::<u64>::with_options(Options::new().with_seed(7), Ascend).unwrap();
  /// l.insert(3).unwrap();
  /// assert!(l.contains(&3));
  /// ```
  pub fn with_options(opts: Options, cmp: C) -> Result<Self, Error> {
    let head = NodePtr::new_head()?;
    let rng = match opts.seed() {
      Some(seed) => SmallRng::seed_from_u64(seed),
      None => SmallRng::from_os_rng(),
    };

    Ok(Self {
      head,
      height: CachePadded::new(AtomicUsize::new(1)),
      len: CachePadded::new(AtomicUsize::new(0)),
      writer: Mutex::new(rng),
      cmp,
      _marker: PhantomData,
    })
  }

  /// Returns true if a key equal to `key` is in the skiplist.
  ///
  /// Never blocks, and can run concurrently with an insert.
  #[inline]
  pub fn contains(&self, key: &K) -> bool {
    self.get(key).is_some()
  }

  /// Returns the stored key equal to `key`, if it exists.
  ///
  /// When duplicates were inserted, the first one in the order of the skiplist is returned.
  pub fn get(&self, key: &K) -> Option<&K> {
    self
      .ge(key)
      .filter(|found| self.cmp.compare(found, key).is_eq())
  }

  /// Returns the first key which is greater than or equal to `key`.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::SkipList;
  ///
  /// let l = SkipList::<u64>::new().unwrap();
  /// for k in [10, 20, 30] {
  ///   l.insert(k).unwrap();
  /// }
  /// assert_eq!(l.ge(&15), Some(&20));
  /// assert_eq!(l.ge(&20), Some(&20));
  /// assert_eq!(l.ge(&31), None);
  /// ```
  pub fn ge(&self, key: &K) -> Option<&K> {
    // Safety: nodes are never freed before the skiplist itself.
    self
      .find_greater_or_equal(key, None)
      .map(|nd| unsafe { nd.key() })
  }

  /// Inserts `key` into the skiplist.
  ///
  /// Duplicates are not detected: inserting a key equal to one already present
  /// links a second node holding it. Use [`try_insert`](SkipList::try_insert)
  /// to reject them instead.
  ///
  /// # Errors
  ///
  /// - Returns `Error::Alloc`, if the node could not be allocated. The skiplist is left unchanged.
  pub fn insert(&self, key: K) -> Result<(), Error> {
    let mut rng = self.writer.lock();
    let mut prev = [self.head; MAX_HEIGHT];
    self.find_greater_or_equal(&key, Some(&mut prev));
    self.link(&mut rng, key, &prev)
  }

  /// Inserts `key` if no equal key exists yet.
  ///
  /// # Errors
  ///
  /// - Returns `Error::Duplicated`, if an equal key is already in the skiplist.
  /// - Returns `Error::Alloc`, if the node could not be allocated.
  pub fn try_insert(&self, key: K) -> Result<(), Error> {
    let mut rng = self.writer.lock();
    let mut prev = [self.head; MAX_HEIGHT];
    if let Some(nd) = self.find_greater_or_equal(&key, Some(&mut prev)) {
      // Safety: the found node is never the head and lives as long as self.
      if self.cmp.compare(unsafe { nd.key() }, &key).is_eq() {
        return Err(Error::Duplicated);
      }
    }
    self.link(&mut rng, key, &prev)
  }
}

impl<K, C: Comparator<K>> SkipList<K, C> {
  /// Links a new node holding `key` after `prev` at each level of its tower.
  ///
  /// Must be called while holding the writer lock, with `prev` freshly filled by
  /// [`find_greater_or_equal`](Self::find_greater_or_equal) for `key`.
  fn link(
    &self,
    rng: &mut SmallRng,
    key: K,
    prev: &[NodePtr<K>; MAX_HEIGHT],
  ) -> Result<(), Error> {
    let height = random_height(rng);
    let nd = match NodePtr::new(height, key) {
      Ok(nd) => nd,
      Err(e) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(height, err = %e, "failed to allocate a skiplist node");
        return Err(e);
      }
    };

    // We always link from the base level and up. A reader that finds the node
    // at some level can always follow it down, since the levels below are
    // already linked.
    for (level, prev) in prev.iter().enumerate().take(height) {
      // Safety: levels above the list height still point from the head, whose
      // tower is full height, and every `prev` lives as long as self. We hold
      // the writer lock, so no one else stores to these links.
      unsafe {
        // 1. Point the new node at its successor, while it is still unreachable.
        nd.set_next(level, prev.next(level));
        // 2. Publish it. The release store makes step 1 visible to any reader
        //    that loads the new node from `prev`.
        prev.set_next(level, Some(nd));
      }
    }

    // Publish the new height only once its levels are fully linked. Readers
    // with a stale height just start their search lower.
    let list_height = self.height();
    if height > list_height {
      self.height.store(height, Ordering::Release);
      #[cfg(feature = "tracing")]
      tracing::trace!(from = list_height, to = height, "skiplist height increased");
    }

    self.len.fetch_add(1, Ordering::Release);
    Ok(())
  }

  /// Returns the first node whose key is not less than `key`, or `None` when
  /// every key is less than it.
  ///
  /// When `prev` is given, `prev[level]` receives the last node before `key`
  /// at every level below the current height. Levels above it are not touched.
  fn find_greater_or_equal(
    &self,
    key: &K,
    mut prev: Option<&mut [NodePtr<K>; MAX_HEIGHT]>,
  ) -> Option<NodePtr<K>> {
    let mut x = self.head;
    let mut level = self.height() - 1;

    loop {
      // Safety: x is the head or a node linked into self, and a node linked at
      // `level` has a tower higher than `level`.
      let next = unsafe { x.next(level) };
      match next {
        Some(nd) if self.key_is_after_node(key, nd) => {
          // Keep moving right on this level.
          x = nd;
        }
        _ => {
          if let Some(prev) = prev.as_deref_mut() {
            prev[level] = x;
          }

          if level == 0 {
            return next;
          }
          level -= 1;
        }
      }
    }
  }

  /// Returns true if `key` sorts after the key of `nd`.
  #[inline]
  fn key_is_after_node(&self, key: &K, nd: NodePtr<K>) -> bool {
    // Safety: only nodes reached through a link are passed here, never the head.
    self.cmp.compare(unsafe { nd.key() }, key).is_lt()
  }
}
