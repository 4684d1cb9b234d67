use alloc::sync::Arc;

use crate::{context::SharedContext, errors::ResolveErrorKind, tag::Tag, Container};

/// Handle of the resolution in progress.
///
/// Passed to factories, post-resolution callbacks and auto-injection markers.
/// Resolves made through it are nested into the current outermost resolve:
/// they share its graph, so [`crate::Lifetime::SharedInGraph`] instances are reused
/// and instances still being built are returned instead of being built again.
///
/// The handle isn't [`Send`], it can't cross into resolves of other threads.
/// The context it points to is emptied when the outermost resolve returns,
/// so a retained handle doesn't keep instances alive.
#[derive(Clone)]
pub struct Resolver {
    container: Container,
    context: SharedContext,
    tag: Option<Tag>,
}

impl Resolver {
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, context: SharedContext, tag: Option<Tag>) -> Self {
        Self { container, context, tag }
    }

    /// Tag the instance being built was requested with
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolves a capability registered without arguments within the current graph
    ///
    /// # Errors
    /// See [`Container::resolve`]
    #[inline]
    pub fn resolve<C>(&self, tag: Option<Tag>) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_with::<C, ()>(tag, ())
    }

    /// Resolves a capability registered with arguments `Args` within the current graph
    ///
    /// # Errors
    /// See [`Container::resolve`]
    #[inline]
    pub fn resolve_with<C, Args>(&self, tag: Option<Tag>, args: Args) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        Args: 'static,
    {
        self.container.resolve_in::<C, Args>(&self.context, tag, args)
    }
}
