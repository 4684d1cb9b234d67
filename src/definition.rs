use alloc::{boxed::Box, sync::Arc};
use core::{
    any::Any,
    marker::PhantomData,
    sync::atomic::{AtomicUsize, Ordering},
};
use tracing::debug;

use crate::{
    any::{erase, unerase, RcAny, TypeInfo},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    inject::{auto_inject, AutoInjected},
    key::RegistryKey,
    lifetime::Lifetime,
    service::{service_fn, SharedService},
    Container, Resolver,
};

pub(crate) struct FactoryRequest {
    pub(crate) resolver: Resolver,
    pub(crate) args: Box<dyn Any>,
}

pub(crate) type BoxedFactory = SharedService<FactoryRequest, RcAny, InstantiateErrorKind>;
pub(crate) type BoxedCallback = SharedService<(Resolver, RcAny), (), InstantiateErrorKind>;
pub(crate) type Injector = fn(&Resolver, &RcAny) -> Result<(), ResolveErrorKind>;
pub(crate) type WeakInstance = Arc<dyn Fn() -> Option<RcAny> + Send + Sync>;
pub(crate) type Downgrade = fn(&RcAny) -> Option<WeakInstance>;

static NEXT_DEFINITION_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone)]
pub(crate) enum Slot {
    Factory(BoxedFactory),
    /// Memoized instance of a shared definition, replaces the factory
    Instance(RcAny),
}

#[derive(Clone)]
pub(crate) struct Definition {
    pub(crate) id: usize,
    pub(crate) slot: Slot,
    pub(crate) lifetime: Lifetime,
    pub(crate) post_resolve: Option<BoxedCallback>,
    pub(crate) injector: Option<Injector>,
    pub(crate) downgrade: Downgrade,
    pub(crate) weak_instance: Option<WeakInstance>,
}

impl Definition {
    #[must_use]
    pub(crate) fn new(lifetime: Lifetime, factory: BoxedFactory, downgrade: Downgrade) -> Self {
        Self {
            id: NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed),
            slot: Slot::Factory(factory),
            lifetime,
            post_resolve: None,
            injector: None,
            downgrade,
            weak_instance: None,
        }
    }
}

#[must_use]
pub(crate) fn boxed_factory<T, Args, F>(factory: F) -> BoxedFactory
where
    T: Send + Sync + 'static,
    Args: 'static,
    F: Fn(Resolver, Args) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
{
    SharedService::new(service_fn(
        move |FactoryRequest { resolver, args }| -> Result<RcAny, InstantiateErrorKind> {
            let Ok(args) = args.downcast::<Args>() else {
                return Err(InstantiateErrorKind::IncorrectType {
                    expected: TypeInfo::of::<Args>(),
                });
            };
            let instance = factory(resolver, *args)?;

            debug!("Instantiated");

            Ok(erase(Arc::new(instance)))
        },
    ))
}

/// Factory of a forwarded capability: resolves the implementation with the same tag and arguments
/// inside the current context and casts it
#[must_use]
pub(crate) fn boxed_forward<T, C, Args>(cast: fn(Arc<T>) -> Arc<C>) -> BoxedFactory
where
    T: Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
    Args: 'static,
{
    SharedService::new(service_fn(
        move |FactoryRequest { resolver, args }| -> Result<RcAny, InstantiateErrorKind> {
            let Ok(args) = args.downcast::<Args>() else {
                return Err(InstantiateErrorKind::IncorrectType {
                    expected: TypeInfo::of::<Args>(),
                });
            };
            let instance = resolver.resolve_with::<T, Args>(resolver.tag().cloned(), *args)?;

            debug!(implementation = TypeInfo::of::<T>().name, "Forwarded");

            Ok(erase(cast(instance)))
        },
    ))
}

#[must_use]
pub(crate) fn boxed_callback<T, F>(callback: F) -> BoxedCallback
where
    T: Send + Sync + 'static,
    F: Fn(&Resolver, &Arc<T>) -> Result<(), InstantiateErrorKind> + Send + Sync + 'static,
{
    SharedService::new(service_fn(
        move |(resolver, instance): (Resolver, RcAny)| -> Result<(), InstantiateErrorKind> {
            let Some(instance) = unerase::<T>(&instance) else {
                return Err(InstantiateErrorKind::IncorrectType {
                    expected: TypeInfo::of::<T>(),
                });
            };
            callback(&resolver, &instance)
        },
    ))
}

#[must_use]
pub(crate) fn downgrade<C>(instance: &RcAny) -> Option<WeakInstance>
where
    C: ?Sized + Send + Sync + 'static,
{
    let weak = Arc::downgrade(&unerase::<C>(instance)?);
    Some(Arc::new(move || weak.upgrade().map(erase)))
}

/// Handle to a registered definition.
///
/// The handle is bound to the definition it was returned for.
/// If the key is registered again, changes made through the old handle are ignored.
pub struct DefinitionHandle<T, Args> {
    container: Container,
    key: RegistryKey,
    id: usize,
    _marker: PhantomData<fn() -> (Arc<T>, Args)>,
}

impl<T, Args> DefinitionHandle<T, Args>
where
    T: Send + Sync + 'static,
    Args: 'static,
{
    #[inline]
    #[must_use]
    pub(crate) fn new(container: Container, key: RegistryKey, id: usize) -> Self {
        Self {
            container,
            key,
            id,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    /// Attaches a callback called with the fully constructed instance,
    /// after all its auto-injections are filled.
    ///
    /// Nested resolves made through the passed [`Resolver`] share the graph of the instance.
    /// An error returned by the callback fails the whole resolution.
    #[must_use]
    pub fn resolving_dependencies<F>(self, callback: F) -> Self
    where
        F: Fn(&Resolver, &Arc<T>) -> Result<(), InstantiateErrorKind> + Send + Sync + 'static,
    {
        let callback = boxed_callback(callback);
        self.update(move |definition| definition.post_resolve = Some(callback));
        self
    }

    /// Fills the auto-injection markers of every instance built by this definition
    #[must_use]
    pub fn auto_injected(self) -> Self
    where
        T: AutoInjected,
    {
        self.update(|definition| definition.injector = Some(auto_inject::<T>));
        self
    }

    /// Registers `C` as another capability of this definition.
    ///
    /// Resolving `C` with the same tag and arguments resolves `T` and casts it,
    /// so both share the lifetime of this definition.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use weft::{Container, Lifetime};
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> &'static str;
    /// }
    ///
    /// struct English;
    ///
    /// impl Greeter for English {
    ///     fn greet(&self) -> &'static str {
    ///         "hello"
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// let _ = container
    ///     .register(None, Lifetime::Shared, |_| Ok(English))
    ///     .implements::<dyn Greeter>(|english| english);
    ///
    /// let greeter = container.resolve::<dyn Greeter>(None).unwrap();
    /// assert_eq!(greeter.greet(), "hello");
    /// ```
    #[must_use]
    pub fn implements<C>(self, cast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = RegistryKey::new(TypeInfo::of::<C>(), self.key.signature, self.key.tag.clone());
        let definition = Definition::new(Lifetime::Unshared, boxed_forward::<T, C, Args>(cast), downgrade::<C>);
        self.container.insert_definition(key, definition);
        self
    }

    fn update(&self, f: impl FnOnce(&mut Definition)) {
        match self.container.inner.registry.lock().get_mut(&self.key, self.id) {
            Some(definition) => f(definition),
            None => debug!(key = %self.key, "Definition was replaced or removed, handle ignored"),
        }
    }
}
