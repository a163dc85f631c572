/// Error type for the swmr-skl crate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// Indicates that the allocator could not provide memory for a node.
  ///
  /// Nothing is linked into the skiplist when this is returned.
  #[error("failed to allocate a node of height {height} ({size} bytes)")]
  Alloc {
    /// The height of the tower that was being allocated.
    height: usize,
    /// The size in bytes of the requested allocation.
    size: usize,
  },

  /// Indicates that an entry with the specified key already
  /// exists in the skiplist. Only returned by [`SkipList::try_insert`](crate::SkipList::try_insert),
  /// [`SkipList::insert`](crate::SkipList::insert) accepts duplicates.
  #[error("key already exists in the skiplist")]
  Duplicated,
}
