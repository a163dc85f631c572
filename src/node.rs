use core::{
  mem::{self, MaybeUninit},
  ptr::{self, NonNull},
};

use crate::{
  alloc::{alloc, dealloc, Layout},
  sync::{AtomicPtr, Ordering},
  Error, MAX_HEIGHT,
};

type Link<K> = AtomicPtr<Node<K>>;

#[repr(C)]
pub(crate) struct Node<K> {
  // Immutable. Only the head node leaves it uninitialized.
  key: MaybeUninit<K>,
  // Immutable.
  height: usize,
  // ** DO NOT ADD A TOWER FIELD HERE **
  // The tower of `height` links is laid out right after the node. Most nodes
  // are short, since the probability of each successive level decreases
  // exponentially, so the allocation is truncated to the levels the node
  // actually uses instead of reserving `MAX_HEIGHT` links.
  //
  // The links are only reached through raw pointers derived from the
  // allocation, never through a `&Node`, which would not cover them.
}

impl<K> Node<K> {
  /// Offset of the first link from the start of the node.
  #[inline]
  const fn tower_offset() -> usize {
    let align = mem::align_of::<Link<K>>();
    (mem::size_of::<Self>() + align - 1) & !(align - 1)
  }

  #[inline]
  fn layout(height: usize) -> Result<Layout, Error> {
    let size = Self::tower_offset() + height * mem::size_of::<Link<K>>();
    let align = mem::align_of::<Self>().max(mem::align_of::<Link<K>>());
    Layout::from_size_align(size, align)
      .map(|layout| layout.pad_to_align())
      .map_err(|_| Error::Alloc { height, size })
  }
}

/// A pointer to a node allocated by [`NodePtr::new`] or [`NodePtr::new_head`].
pub(crate) struct NodePtr<K> {
  ptr: NonNull<Node<K>>,
}

impl<K> core::fmt::Debug for NodePtr<K> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("NodePtr").field("ptr", &self.ptr).finish()
  }
}

impl<K> Clone for NodePtr<K> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<K> Copy for NodePtr<K> {}

impl<K> PartialEq for NodePtr<K> {
  fn eq(&self, other: &Self) -> bool {
    self.ptr == other.ptr
  }
}

impl<K> Eq for NodePtr<K> {}

impl<K> NodePtr<K> {
  /// Allocates a node holding `key` with a tower of `height` null links.
  ///
  /// On failure the key is dropped and nothing is leaked.
  pub(crate) fn new(height: usize, key: K) -> Result<Self, Error> {
    let ptr = Self::allocate(height)?;
    // Safety: `allocate` reserved room for the node in front of the tower.
    unsafe {
      ptr.as_ptr().write(Node {
        key: MaybeUninit::new(key),
        height,
      });
    }
    Ok(Self { ptr })
  }

  /// Allocates the head node: a full `MAX_HEIGHT` tower of null links and no key.
  pub(crate) fn new_head() -> Result<Self, Error> {
    let ptr = Self::allocate(MAX_HEIGHT)?;
    // Safety: `allocate` reserved room for the node in front of the tower.
    unsafe {
      ptr.as_ptr().write(Node {
        key: MaybeUninit::uninit(),
        height: MAX_HEIGHT,
      });
    }
    Ok(Self { ptr })
  }

  /// Allocates a node of `height` levels and nulls its tower. The node itself
  /// is left for the caller to write.
  fn allocate(height: usize) -> Result<NonNull<Node<K>>, Error> {
    assert!(
      (1..=MAX_HEIGHT).contains(&height),
      "height cannot be less than one or greater than the max height"
    );

    let layout = Node::<K>::layout(height)?;

    // Safety: the layout is never zero sized, the tower alone takes at least one link.
    let raw = unsafe { alloc(layout) };
    let ptr = NonNull::new(raw.cast::<Node<K>>()).ok_or(Error::Alloc {
      height,
      size: layout.size(),
    })?;

    let nd = Self { ptr };
    // Safety: the allocation is large enough for `height` links after the node,
    // and well aligned for them.
    unsafe {
      for level in 0..height {
        nd.link_ptr(level).write(Link::new(ptr::null_mut()));
      }
    }
    Ok(ptr)
  }

  /// Returns the height of the node's tower.
  ///
  /// ## Safety
  /// - The node must not have been freed.
  #[inline]
  pub(crate) unsafe fn height(&self) -> usize {
    (*self.ptr.as_ptr()).height
  }

  /// Returns the key of the node.
  ///
  /// ## Safety
  /// - The node must not be the head node.
  /// - The node must outlive `'a`.
  #[inline]
  pub(crate) unsafe fn key<'a>(self) -> &'a K {
    (*self.ptr.as_ptr()).key.assume_init_ref()
  }

  #[inline]
  unsafe fn link_ptr(&self, level: usize) -> *mut Link<K> {
    self
      .ptr
      .as_ptr()
      .cast::<u8>()
      .add(Node::<K>::tower_offset())
      .cast::<Link<K>>()
      .add(level)
  }

  /// ## Safety
  /// - `level` is less than the height of the node.
  /// - The node must outlive `'a`.
  #[inline]
  unsafe fn link<'a>(self, level: usize) -> &'a Link<K> {
    debug_assert!(level < self.height(), "level out of the tower");
    &*self.link_ptr(level)
  }

  /// Loads the successor at `level`. `None` is the end of the level.
  ///
  /// The load is `Acquire`, pairing with the `Release` store of
  /// [`set_next`](Self::set_next), so everything written to the successor
  /// before it was published is visible.
  ///
  /// ## Safety
  /// - `level` is less than the height of the node.
  /// - The node must not have been freed.
  #[inline]
  pub(crate) unsafe fn next(self, level: usize) -> Option<Self> {
    NonNull::new(self.link(level).load(Ordering::Acquire)).map(|ptr| Self { ptr })
  }

  /// Publishes `next` as the successor at `level` with `Release` ordering.
  ///
  /// ## Safety
  /// - `level` is less than the height of the node.
  /// - The node must not have been freed.
  /// - The caller must be the only writer of the skiplist.
  #[inline]
  pub(crate) unsafe fn set_next(self, level: usize, next: Option<Self>) {
    let next = next.map_or(ptr::null_mut(), |nd| nd.ptr.as_ptr());
    self.link(level).store(next, Ordering::Release);
  }

  /// Drops the key and releases the memory of the node.
  ///
  /// ## Safety
  /// - The node must not be the head node.
  /// - No one may access the node afterwards.
  pub(crate) unsafe fn free(self) {
    (*self.ptr.as_ptr()).key.assume_init_drop();
    self.release();
  }

  /// Releases the memory of the head node.
  ///
  /// ## Safety
  /// - The node must be the head node.
  /// - No one may access the node afterwards.
  pub(crate) unsafe fn free_head(self) {
    self.release();
  }

  unsafe fn release(self) {
    let height = self.height();
    for level in 0..height {
      ptr::drop_in_place(self.link_ptr(level));
    }

    // The same layout was computed successfully when the node was allocated.
    if let Ok(layout) = Node::<K>::layout(height) {
      dealloc(self.ptr.as_ptr().cast(), layout);
    }
  }
}
