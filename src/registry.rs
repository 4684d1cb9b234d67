use alloc::{collections::BTreeMap, vec::Vec};

use crate::{
    any::{RcAny, TypeInfo},
    definition::{Definition, Slot},
    key::RegistryKey,
    lifetime::Lifetime,
};

#[derive(Default)]
pub(crate) struct Registry {
    definitions: BTreeMap<RegistryKey, Definition>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    #[inline]
    pub(crate) fn insert(&mut self, key: RegistryKey, definition: Definition) -> Option<Definition> {
        self.definitions.insert(key, definition)
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: &RegistryKey) -> Option<Definition> {
        self.definitions.remove(key)
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.definitions.clear();
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, key: &RegistryKey) -> bool {
        self.definitions.contains_key(key)
    }

    /// Gets the definition with the given id, if it's still registered under the key
    #[inline]
    #[must_use]
    pub(crate) fn get_mut(&mut self, key: &RegistryKey, id: usize) -> Option<&mut Definition> {
        self.definitions.get_mut(key).filter(|definition| definition.id == id)
    }

    /// Looks up a definition by the exact key, then a tagged key falls back to the untagged one.
    /// An untagged key never falls back to a tagged definition.
    ///
    /// Returns the key the definition is registered under with a copy of the definition,
    /// so the lock isn't held while the definition is used.
    #[must_use]
    pub(crate) fn lookup(&self, key: &RegistryKey) -> Option<(RegistryKey, Definition)> {
        if let Some(definition) = self.definitions.get(key) {
            return Some((key.clone(), definition.clone()));
        }
        if key.tag.is_none() {
            return None;
        }

        let untagged = key.untagged();
        let definition = self.definitions.get(&untagged)?.clone();
        Some((untagged, definition))
    }

    /// Replaces the factory of a shared definition with the instance.
    ///
    /// The first memoized instance wins: if another resolve memoized it already, that instance is returned.
    /// A definition replaced or removed since the instance was built isn't touched.
    pub(crate) fn memoize(&mut self, key: &RegistryKey, id: usize, instance: RcAny) -> RcAny {
        let Some(definition) = self.get_mut(key, id) else {
            return instance;
        };
        if let Slot::Instance(memoized) = &definition.slot {
            return memoized.clone();
        }

        definition.slot = Slot::Instance(instance.clone());
        instance
    }

    pub(crate) fn remember_weak(&mut self, key: &RegistryKey, id: usize, instance: &RcAny) {
        if let Some(definition) = self.get_mut(key, id) {
            definition.weak_instance = (definition.downgrade)(instance);
        }
    }

    /// Keys of eager definitions that can be built without arguments and aren't built yet
    #[must_use]
    pub(crate) fn eager_keys(&self) -> Vec<RegistryKey> {
        let no_args = TypeInfo::of::<()>();
        self.definitions
            .iter()
            .filter(|(key, definition)| {
                definition.lifetime == Lifetime::EagerShared && key.signature == no_args && matches!(definition.slot, Slot::Factory(_))
            })
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::{
        any::{erase, unerase},
        definition::{boxed_factory, downgrade, Definition, Slot},
        key::RegistryKey,
        lifetime::Lifetime,
        Tag,
    };

    use alloc::sync::Arc;

    fn definition(lifetime: Lifetime) -> Definition {
        Definition::new(lifetime, boxed_factory(|_, ()| Ok(1u8)), downgrade::<u8>)
    }

    #[test]
    fn test_lookup_fallback() {
        let mut registry = Registry::new();
        let untagged = RegistryKey::of::<u8, ()>(None);
        let tagged = RegistryKey::of::<u8, ()>(Some(Tag::from("a")));

        registry.insert(untagged.clone(), definition(Lifetime::Unshared));

        let (key, _) = registry.lookup(&tagged).unwrap();
        assert_eq!(key, untagged);

        registry.insert(tagged.clone(), definition(Lifetime::Unshared));
        let (key, _) = registry.lookup(&tagged).unwrap();
        assert_eq!(key, tagged);
    }

    #[test]
    fn test_lookup_untagged_never_falls_back() {
        let mut registry = Registry::new();
        registry.insert(RegistryKey::of::<u8, ()>(Some(Tag::from(1))), definition(Lifetime::Unshared));

        assert!(registry.lookup(&RegistryKey::of::<u8, ()>(None)).is_none());
        assert!(registry.lookup(&RegistryKey::of::<u8, ()>(Some(Tag::from(2)))).is_none());
    }

    #[test]
    fn test_lookup_signature_is_part_of_key() {
        let mut registry = Registry::new();
        registry.insert(RegistryKey::of::<u8, ()>(None), definition(Lifetime::Unshared));

        assert!(registry.lookup(&RegistryKey::of::<u8, (u8,)>(None)).is_none());
    }

    #[test]
    fn test_memoize_first_wins() {
        let mut registry = Registry::new();
        let key = RegistryKey::of::<u8, ()>(None);
        let definition = definition(Lifetime::Shared);
        let id = definition.id;
        registry.insert(key.clone(), definition);

        let first = erase(Arc::new(1u8));
        let second = erase(Arc::new(2u8));

        assert!(Arc::ptr_eq(&registry.memoize(&key, id, first.clone()), &first));
        assert!(Arc::ptr_eq(&registry.memoize(&key, id, second), &first));

        let (_, definition) = registry.lookup(&key).unwrap();
        assert!(matches!(definition.slot, Slot::Instance(instance) if Arc::ptr_eq(&instance, &first)));
    }

    #[test]
    fn test_memoize_replaced_definition() {
        let mut registry = Registry::new();
        let key = RegistryKey::of::<u8, ()>(None);
        let stale = definition(Lifetime::Shared);
        let stale_id = stale.id;
        registry.insert(key.clone(), stale);
        registry.insert(key.clone(), definition(Lifetime::Shared));

        let _ = registry.memoize(&key, stale_id, erase(Arc::new(1u8)));

        let (_, definition) = registry.lookup(&key).unwrap();
        assert!(matches!(definition.slot, Slot::Factory(_)));
    }

    #[test]
    fn test_remember_weak() {
        let mut registry = Registry::new();
        let key = RegistryKey::of::<u8, ()>(None);
        let definition = definition(Lifetime::WeakShared);
        let id = definition.id;
        registry.insert(key.clone(), definition);

        let instance = Arc::new(1u8);
        registry.remember_weak(&key, id, &erase(instance.clone()));

        let (_, definition) = registry.lookup(&key).unwrap();
        let weak_instance = definition.weak_instance.unwrap();
        assert!(Arc::ptr_eq(&unerase::<u8>(&weak_instance().unwrap()).unwrap(), &instance));

        drop(instance);
        assert!(weak_instance().is_none());
    }

    #[test]
    fn test_eager_keys() {
        let mut registry = Registry::new();
        registry.insert(RegistryKey::of::<u8, ()>(None), definition(Lifetime::EagerShared));
        registry.insert(RegistryKey::of::<u16, ()>(None), definition(Lifetime::Shared));
        registry.insert(
            RegistryKey::of::<u32, (u8,)>(None),
            Definition::new(Lifetime::EagerShared, boxed_factory(|_, (val,): (u8,)| Ok(u32::from(val))), downgrade::<u32>),
        );

        assert_eq!(registry.eager_keys(), [RegistryKey::of::<u8, ()>(None)]);
    }
}
