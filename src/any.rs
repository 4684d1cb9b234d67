use alloc::sync::Arc;
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
};

/// Type-erased instance handle.
///
/// The payload is always an `Arc<C>` for the capability `C` it was produced for,
/// so unsized capabilities (`dyn Trait`) can be erased the same way as concrete types.
pub(crate) type RcAny = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let end = self.name.find('<').unwrap_or(self.name.len());
        let start = self.name[..end].rfind("::").map_or(0, |pos| pos + 2);
        &self.name[start..]
    }
}

#[inline]
#[must_use]
pub(crate) fn erase<C>(instance: Arc<C>) -> RcAny
where
    C: ?Sized + Send + Sync + 'static,
{
    Arc::new(instance)
}

#[inline]
#[must_use]
pub(crate) fn unerase<C>(instance: &RcAny) -> Option<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<C>>().cloned()
}

#[inline]
#[must_use]
pub(crate) fn erased_type_id(instance: &RcAny) -> TypeId {
    Any::type_id(&**instance)
}
