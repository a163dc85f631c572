/// Options for [`SkipList`](crate::SkipList).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
  seed: Option<u64>,
}

impl Options {
  /// Creates a new set of options with the default values.
  #[inline]
  pub const fn new() -> Self {
    Self { seed: None }
  }

  /// Set the seed of the generator that draws tower heights.
  ///
  /// By default the generator is seeded from the operating system, so two lists
  /// built from the same inserts end up with different shapes. With a seed, the
  /// shape only depends on the sequence of inserts, which is useful for
  /// reproducing a benchmark or a test failure.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::Options;
  ///
  /// let opts = Options::new().with_seed(42);
  /// assert_eq!(opts.seed(), Some(42));
  /// ```
  #[inline]
  pub const fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  /// Returns the seed of the height generator, if any.
  ///
  /// ## Example
  ///
  /// ```rust
  /// use swmr_skl::Options;
  ///
  /// assert_eq!(Options::new().seed(), None);
  /// ```
  #[inline]
  pub const fn seed(&self) -> Option<u64> {
    self.seed
  }
}
