#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

use core::cmp;

mod error;
pub use error::Error;

mod node;

mod list;
pub use list::SkipList;

mod options;
pub use options::Options;

/// The maximum height of any tower in the skiplist, the head included.
pub const MAX_HEIGHT: usize = 12;

/// The inverse of the probability that a tower grows by one more level.
pub const BRANCHING: u32 = 4;

/// Draws the height of a new tower.
///
/// Starts at one and keeps growing while a `1 / BRANCHING` coin comes up true,
/// so `P(height >= k) = BRANCHING^-(k - 1)`, capped at [`MAX_HEIGHT`].
#[inline]
fn random_height<R: rand::Rng + ?Sized>(rng: &mut R) -> usize {
  let mut h = 1;
  while h < MAX_HEIGHT && rng.random_ratio(1, BRANCHING) {
    h += 1;
  }
  debug_assert!((1..=MAX_HEIGHT).contains(&h));
  h
}

/// Comparator is used to define the strict total order of the keys stored in a [`SkipList`].
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so a three-way comparison
/// function can be handed to [`SkipList::with_comparator`] directly.
pub trait Comparator<K: ?Sized> {
  /// Compares two keys.
  fn compare(&self, a: &K, b: &K) -> cmp::Ordering;
}

impl<K, F> Comparator<K> for F
where
  K: ?Sized,
  F: Fn(&K, &K) -> cmp::Ordering,
{
  #[inline]
  fn compare(&self, a: &K, b: &K) -> cmp::Ordering {
    self(a, b)
  }
}

/// Ascend is a comparator that orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ascend;

impl<K: ?Sized + Ord> Comparator<K> for Ascend {
  #[inline]
  fn compare(&self, a: &K, b: &K) -> cmp::Ordering {
    a.cmp(b)
  }
}

/// Descend is a comparator that reverses the [`Ord`] implementation of the keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Descend;

impl<K: ?Sized + Ord> Comparator<K> for Descend {
  #[inline]
  fn compare(&self, a: &K, b: &K) -> cmp::Ordering {
    b.cmp(a)
  }
}

mod alloc {
  #[cfg(not(loom))]
  pub(crate) use std::alloc::{alloc, dealloc, Layout};

  #[cfg(loom)]
  pub(crate) use loom::alloc::{alloc, dealloc, Layout};
}

mod sync {
  #[cfg(not(loom))]
  pub(crate) use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

  #[cfg(loom)]
  pub(crate) use loom::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

  #[cfg(not(loom))]
  pub(crate) use parking_lot::Mutex;

  /// Gives loom's mutex the non-poisoning `lock` of `parking_lot`.
  #[cfg(loom)]
  #[derive(Debug)]
  pub(crate) struct Mutex<T>(loom::sync::Mutex<T>);

  #[cfg(loom)]
  impl<T> Mutex<T> {
    #[inline]
    pub(crate) fn new(val: T) -> Self {
      Self(loom::sync::Mutex::new(val))
    }

    #[inline]
    pub(crate) fn lock(&self) -> loom::sync::MutexGuard<'_, T> {
      self
        .0
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
  }
}
