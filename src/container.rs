use alloc::{boxed::Box, sync::Arc};
use core::any::Any;
use parking_lot::Mutex;
use tracing::{debug, error, info_span};

use crate::{
    any::{erased_type_id, unerase, RcAny, TypeInfo},
    context::{ContextGuard, SharedContext},
    definition::{boxed_factory, downgrade, Definition, DefinitionHandle, FactoryRequest, Slot},
    errors::{InstantiateErrorKind, InstantiateResult, InstantiatorErrorKind, ResolveErrorKind},
    key::RegistryKey,
    lifetime::Lifetime,
    registry::Registry,
    service::Service as _,
    tag::Tag,
    Resolver,
};

/// Registry of definitions and entry point of resolves.
///
/// The container is a cheap handle: clones share the same definitions.
/// Create it once at startup and pass it to the consumers.
#[derive(Clone, Default)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

#[derive(Default)]
pub(crate) struct ContainerInner {
    pub(crate) registry: Mutex<Registry>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: Mutex::new(Registry::new()),
            }),
        }
    }

    /// Registers a factory without arguments.
    /// The capability is the type the factory returns.
    ///
    /// A definition registered before under the same capability and tag is replaced.
    pub fn register<T, F>(&self, tag: Option<Tag>, lifetime: Lifetime, factory: F) -> DefinitionHandle<T, ()>
    where
        T: Send + Sync + 'static,
        F: Fn(Resolver) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        self.register_with(tag, lifetime, move |resolver, ()| factory(resolver))
    }

    /// Registers a factory with positional arguments passed as the `Args` tuple.
    ///
    /// Each arguments tuple type is a separate registration, so `(u8,)` and `(Option<u8>,)`
    /// factories of the same capability don't replace each other and must be resolved with the exact type.
    pub fn register_with<T, Args, F>(&self, tag: Option<Tag>, lifetime: Lifetime, factory: F) -> DefinitionHandle<T, Args>
    where
        T: Send + Sync + 'static,
        Args: 'static,
        F: Fn(Resolver, Args) -> InstantiateResult<T> + Send + Sync + 'static,
    {
        let key = RegistryKey::of::<T, Args>(tag);
        let definition = Definition::new(lifetime, boxed_factory(factory), downgrade::<T>);
        let id = definition.id;

        self.insert_definition(key.clone(), definition);
        DefinitionHandle::new(self.clone(), key, id)
    }

    /// Resolves a capability registered without arguments.
    ///
    /// This is an outermost resolve: it starts a new graph,
    /// so [`Lifetime::SharedInGraph`] instances of previous calls aren't reused.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::DefinitionNotFound`] if neither the definition with the tag
    ///   nor the untagged one is registered
    /// - Returns [`ResolveErrorKind::ResolutionFailed`] if the factory, a required auto-injection or
    ///   the post-resolution callback fails. The underlying error is kept as the source.
    ///
    /// # Warning
    /// On failure, an instance of the graph can be already referenced by another instance of the graph
    /// that captured it before the failure, for example through an optional auto-injection.
    pub fn resolve<C>(&self, tag: Option<Tag>) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_with::<C, ()>(tag, ())
    }

    /// Resolves a capability registered with arguments `Args`
    ///
    /// # Errors
    /// See [`Self::resolve`]
    pub fn resolve_with<C, Args>(&self, tag: Option<Tag>, args: Args) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        Args: 'static,
    {
        let guard = ContextGuard::new();
        self.resolve_in::<C, Args>(guard.context(), tag, args)
    }

    /// Removes all definitions.
    ///
    /// Resolves in progress aren't affected: they keep using the definitions they already looked up,
    /// and their nested resolves still return instances recorded in their resolution context.
    /// Anything else resolved after the reset fails with [`ResolveErrorKind::DefinitionNotFound`].
    pub fn reset(&self) {
        self.inner.registry.lock().clear();
        debug!("Container reset");
    }

    /// Checks whether a definition is registered under the exact key, without tag fallback
    #[must_use]
    pub fn contains<C, Args>(&self, tag: Option<Tag>) -> bool
    where
        C: ?Sized + 'static,
        Args: 'static,
    {
        self.inner.registry.lock().contains(&RegistryKey::of::<C, Args>(tag))
    }

    /// Removes the definition registered under the exact key.
    /// Returns `true` if it was registered.
    pub fn unregister<C, Args>(&self, tag: Option<Tag>) -> bool
    where
        C: ?Sized + 'static,
        Args: 'static,
    {
        let key = RegistryKey::of::<C, Args>(tag);
        let removed = self.inner.registry.lock().remove(&key).is_some();
        debug!(%key, removed, "Unregistered");
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.registry.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds every [`Lifetime::EagerShared`] definition registered without arguments,
    /// each one in its own outermost resolve.
    ///
    /// # Errors
    /// Returns the first resolve error, definitions after it aren't built
    pub fn bootstrap(&self) -> Result<(), ResolveErrorKind> {
        let keys = self.inner.registry.lock().eager_keys();
        debug!(count = keys.len(), "Bootstrap");

        for key in keys {
            let guard = ContextGuard::new();
            self.resolve_erased(guard.context(), key, Box::new(()))?;
        }
        Ok(())
    }
}

impl Container {
    pub(crate) fn insert_definition(&self, key: RegistryKey, definition: Definition) {
        let lifetime = definition.lifetime;
        let replaced = self.inner.registry.lock().insert(key.clone(), definition).is_some();
        if replaced {
            debug!(%key, lifetime = lifetime.name(), "Replaced");
        } else {
            debug!(%key, lifetime = lifetime.name(), "Registered");
        }
    }

    pub(crate) fn resolve_in<C, Args>(&self, context: &SharedContext, tag: Option<Tag>, args: Args) -> Result<Arc<C>, ResolveErrorKind>
    where
        C: ?Sized + Send + Sync + 'static,
        Args: 'static,
    {
        let instance = self.resolve_erased(context, RegistryKey::of::<C, Args>(tag), Box::new(args))?;
        match unerase::<C>(&instance) {
            Some(instance) => Ok(instance),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: TypeInfo::of::<Arc<C>>(),
                    actual: erased_type_id(&instance),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn resolve_erased(&self, context: &SharedContext, key: RegistryKey, args: Box<dyn Any>) -> Result<RcAny, ResolveErrorKind> {
        let span = info_span!("resolve", capability = key.capability.short_name(), tag = ?key.tag);
        let _guard = span.enter();

        let found = self.inner.registry.lock().lookup(&key);
        let Some((
            definition_key,
            Definition {
                id,
                slot,
                lifetime,
                post_resolve,
                injector,
                weak_instance,
                ..
            },
        )) = found
        else {
            if let Some(instance) = Self::in_flight(context, &key) {
                debug!("Definition removed, found in resolution context");
                return Ok(instance);
            }
            let err = ResolveErrorKind::DefinitionNotFound { key };
            error!("{}", err);
            return Err(err);
        };

        let factory = match slot {
            Slot::Instance(instance) => {
                debug!("Found memoized instance");
                return Ok(instance);
            }
            Slot::Factory(factory) => factory,
        };
        if let Some(instance) = weak_instance.and_then(|weak_instance| weak_instance()) {
            debug!("Found weakly held instance");
            return Ok(instance);
        }
        if lifetime.is_shared_in_graph() {
            let in_graph = context.borrow().get(&definition_key);
            if let Some(instance) = in_graph {
                debug!("Found in resolution context");
                return Ok(instance);
            }
        }

        let resolver = Resolver::new(self.clone(), context.clone(), key.tag.clone());
        let instance = match factory.call(FactoryRequest {
            resolver: resolver.clone(),
            args,
        }) {
            Ok(instance) => instance,
            Err(err) => {
                let err = ResolveErrorKind::ResolutionFailed {
                    key,
                    source: InstantiatorErrorKind::Factory(err),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        if lifetime.is_shared_in_graph() {
            let in_graph = {
                let mut context = context.borrow_mut();
                context.insert(definition_key.clone(), instance.clone());
                context.len()
            };
            debug!(in_graph, "Recorded in resolution context");
        }

        let completed = Self::complete(&resolver, &instance, injector, post_resolve);
        if let Err(source) = completed {
            if lifetime.is_shared_in_graph() {
                context.borrow_mut().remove(&definition_key);
            }
            let err = ResolveErrorKind::ResolutionFailed { key, source };
            error!("{}", err);
            return Err(err);
        }

        if lifetime.is_memoized() {
            let instance = self.inner.registry.lock().memoize(&definition_key, id, instance);
            debug!("Memoized");
            return Ok(instance);
        }
        if lifetime == Lifetime::WeakShared {
            self.inner.registry.lock().remember_weak(&definition_key, id, &instance);
            debug!("Weakly held");
        }

        Ok(instance)
    }

    /// Instance recorded in the context under the key or, for a tagged key, under the untagged one
    fn in_flight(context: &SharedContext, key: &RegistryKey) -> Option<RcAny> {
        let context = context.borrow();
        context
            .get(key)
            .or_else(|| key.tag.as_ref().and_then(|_| context.get(&key.untagged())))
    }

    /// Fills the auto-injections of the instance, then calls the post-resolution callback
    fn complete(
        resolver: &Resolver,
        instance: &RcAny,
        injector: Option<crate::definition::Injector>,
        post_resolve: Option<crate::definition::BoxedCallback>,
    ) -> Result<(), InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>> {
        if let Some(inject) = injector {
            inject(resolver, instance).map_err(|err| InstantiatorErrorKind::Deps(Box::new(err)))?;
        }
        if let Some(post_resolve) = post_resolve {
            post_resolve
                .call((resolver.clone(), instance.clone()))
                .map_err(InstantiatorErrorKind::Callback)?;
            debug!("Post-resolution callback called");
        }
        Ok(())
    }
}
