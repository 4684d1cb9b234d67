use alloc::{
    sync::{Arc, Weak},
    vec::Vec,
};
use core::fmt::{self, Debug, Formatter};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    any::{erased_type_id, unerase, RcAny, TypeInfo},
    errors::ResolveErrorKind,
    tag::Tag,
    Container, Resolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The filled value keeps the instance alive
    Strong,
    /// The filled value doesn't keep the instance alive
    Weak,
}

/// Dependency declared by a field of an instance, filled by the container after the instance is built
pub trait AutoInjection: Send + Sync {
    fn type_info(&self) -> TypeInfo;

    fn tag(&self) -> Option<&Tag>;

    fn is_required(&self) -> bool;

    fn ownership(&self) -> Ownership;

    fn is_injected(&self) -> bool;

    /// Resolves the dependency within the graph of the owner and fills the marker.
    /// A filled marker is left as is.
    ///
    /// # Errors
    /// Returns the error of the nested resolve
    fn inject(&self, resolver: &Resolver, tag: Option<Tag>) -> Result<(), ResolveErrorKind>;
}

/// Instance with auto-injection markers.
///
/// Usually implemented with [`crate::auto_injected`].
pub trait AutoInjected {
    fn injections(&self) -> Vec<&dyn AutoInjection>;
}

type DidInject<C> = Arc<dyn Fn(&Container, &Arc<C>) + Send + Sync>;

#[inline]
fn hold_strong<C: ?Sized>(value: &Arc<C>) -> Arc<C> {
    Arc::clone(value)
}

#[inline]
fn get_strong<C: ?Sized>(held: &Arc<C>) -> Option<Arc<C>> {
    Some(Arc::clone(held))
}

#[inline]
fn hold_weak<C: ?Sized>(value: &Arc<C>) -> Weak<C> {
    Arc::downgrade(value)
}

#[inline]
fn get_weak<C: ?Sized>(held: &Weak<C>) -> Option<Arc<C>> {
    held.upgrade()
}

macro_rules! impl_marker {
    (
        $(#[$meta:meta])*
        $name:ident, holder = $holder:ident, ownership = $ownership:expr, hold = $hold:path, get = $get:path
    ) => {
        $(#[$meta])*
        pub struct $name<C: ?Sized + 'static> {
            value: Mutex<Option<$holder<C>>>,
            tag: Option<Tag>,
            required: bool,
            did_inject: Option<DidInject<C>>,
        }

        impl<C: ?Sized + Send + Sync + 'static> $name<C> {
            /// Required marker: a failed resolve of the dependency fails the resolve of the owner
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self {
                    value: Mutex::new(None),
                    tag: None,
                    required: true,
                    did_inject: None,
                }
            }

            /// Optional marker: a failed resolve of the dependency leaves the marker empty
            #[inline]
            #[must_use]
            pub fn optional() -> Self {
                Self {
                    required: false,
                    ..Self::new()
                }
            }

            #[inline]
            #[must_use]
            pub fn with_tag(mut self, tag: impl Into<Tag>) -> Self {
                self.tag = Some(tag.into());
                self
            }

            /// Sets a callback called with the container and the value right after the marker is filled
            #[inline]
            #[must_use]
            pub fn did_inject(mut self, callback: impl Fn(&Container, &Arc<C>) + Send + Sync + 'static) -> Self {
                self.did_inject = Some(Arc::new(callback));
                self
            }

            /// Filled value, if the marker was filled and the value is still alive
            #[inline]
            #[must_use]
            pub fn value(&self) -> Option<Arc<C>> {
                self.value.lock().as_ref().and_then($get)
            }
        }

        impl<C: ?Sized + Send + Sync + 'static> Default for $name<C> {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl<C: ?Sized + 'static> Debug for $name<C> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("capability", &TypeInfo::of::<C>())
                    .field("tag", &self.tag)
                    .field("required", &self.required)
                    .field("injected", &self.value.lock().is_some())
                    .finish_non_exhaustive()
            }
        }

        impl<C: ?Sized + Send + Sync + 'static> AutoInjection for $name<C> {
            #[inline]
            fn type_info(&self) -> TypeInfo {
                TypeInfo::of::<C>()
            }

            #[inline]
            fn tag(&self) -> Option<&Tag> {
                self.tag.as_ref()
            }

            #[inline]
            fn is_required(&self) -> bool {
                self.required
            }

            #[inline]
            fn ownership(&self) -> Ownership {
                $ownership
            }

            #[inline]
            fn is_injected(&self) -> bool {
                self.value.lock().is_some()
            }

            fn inject(&self, resolver: &Resolver, tag: Option<Tag>) -> Result<(), ResolveErrorKind> {
                if self.is_injected() {
                    return Ok(());
                }

                let value = resolver.resolve::<C>(tag)?;
                {
                    let mut slot = self.value.lock();
                    if slot.is_some() {
                        return Ok(());
                    }
                    *slot = Some($hold(&value));
                }

                if let Some(did_inject) = &self.did_inject {
                    did_inject(resolver.container(), &value);
                }
                Ok(())
            }
        }
    };
}

impl_marker! {
    /// Field holding a strong reference to a dependency.
    ///
    /// Two instances referencing each other must not both use strong markers,
    /// otherwise neither is ever released. Use [`InjectedWeak`] on one side.
    Injected, holder = Arc, ownership = Ownership::Strong, hold = hold_strong, get = get_strong
}

impl_marker! {
    /// Field holding a weak reference to a dependency.
    ///
    /// The value is released when nothing else holds it,
    /// so a weak marker of an [`crate::Lifetime::Unshared`] dependency is usually empty right after the resolve.
    InjectedWeak, holder = Weak, ownership = Ownership::Weak, hold = hold_weak, get = get_weak
}

/// Fills the markers of the instance of `T`.
/// A tag of a marker takes precedence over the tag the owner was requested with.
pub(crate) fn auto_inject<T>(resolver: &Resolver, instance: &RcAny) -> Result<(), ResolveErrorKind>
where
    T: AutoInjected + Send + Sync + 'static,
{
    let Some(instance) = unerase::<T>(instance) else {
        let err = ResolveErrorKind::IncorrectType {
            expected: TypeInfo::of::<Arc<T>>(),
            actual: erased_type_id(instance),
        };
        error!("{}", err);
        return Err(err);
    };

    for injection in instance.injections() {
        if injection.is_injected() {
            continue;
        }

        let type_info = injection.type_info();
        let tag = injection.tag().cloned().or_else(|| resolver.tag().cloned());
        match injection.inject(resolver, tag) {
            Ok(()) => debug!(dependency = type_info.name, ownership = ?injection.ownership(), "Injection filled"),
            Err(err) if injection.is_required() => {
                error!(dependency = type_info.name, "Required injection failed");
                return Err(err);
            }
            Err(err) => debug!(dependency = type_info.name, "Optional injection skipped: {}", err),
        }
    }
    Ok(())
}
