/// Lifetime policy of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Lifetime {
    /// New instance for every resolve.
    Unshared,
    /// One instance for the lifetime of the container, until reset or overwritten.
    ///
    /// The factory isn't called under the registry lock, so threads resolving the first instance at the same time
    /// can each call it. The first instance memoized is returned to all of them,
    /// but instances of the other graphs that captured their own copy before that keep it.
    Shared,
    /// One instance per outermost resolve call.
    #[default]
    SharedInGraph,
    /// One instance while anything outside the container holds it.
    /// The container keeps only a weak reference and re-creates the instance once it's released.
    WeakShared,
    /// Same as [`Lifetime::Shared`], but created by [`crate::Container::bootstrap`].
    EagerShared,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Lifetime::Unshared => "unshared",
            Lifetime::Shared => "shared",
            Lifetime::SharedInGraph => "shared_in_graph",
            Lifetime::WeakShared => "weak_shared",
            Lifetime::EagerShared => "eager_shared",
        }
    }

    /// Whether an in-flight instance is reused by nested resolves of the same outermost call
    #[inline]
    #[must_use]
    pub(crate) const fn is_shared_in_graph(&self) -> bool {
        !matches!(self, Lifetime::Unshared)
    }

    /// Whether the instance is memoized in the definition after the first resolve
    #[inline]
    #[must_use]
    pub(crate) const fn is_memoized(&self) -> bool {
        matches!(self, Lifetime::Shared | Lifetime::EagerShared)
    }
}
