use core::fmt::{self, Display, Formatter};

use crate::{any::TypeInfo, tag::Tag};

/// Identity of a registration.
///
/// `signature` is the positional arguments tuple of the factory, so the same capability
/// registered with factories of different arity or parameter types yields different keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryKey {
    pub capability: TypeInfo,
    pub signature: TypeInfo,
    pub tag: Option<Tag>,
}

impl RegistryKey {
    #[inline]
    #[must_use]
    pub fn new(capability: TypeInfo, signature: TypeInfo, tag: Option<Tag>) -> Self {
        Self {
            capability,
            signature,
            tag,
        }
    }

    #[inline]
    #[must_use]
    pub fn of<C, Args>(tag: Option<Tag>) -> Self
    where
        C: ?Sized + 'static,
        Args: 'static,
    {
        Self::new(TypeInfo::of::<C>(), TypeInfo::of::<Args>(), tag)
    }

    #[inline]
    #[must_use]
    pub(crate) fn untagged(&self) -> Self {
        Self {
            capability: self.capability,
            signature: self.signature,
            tag: None,
        }
    }
}

impl Display for RegistryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} with arguments {}", self.capability, self.signature)?;
        if let Some(tag) = &self.tag {
            write!(f, " tagged {tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RegistryKey;
    use crate::Tag;

    use alloc::collections::BTreeSet;

    #[test]
    fn test_structural_eq() {
        assert_eq!(RegistryKey::of::<u8, ()>(None), RegistryKey::of::<u8, ()>(None));
        assert_eq!(
            RegistryKey::of::<u8, ()>(Some(Tag::from("a"))),
            RegistryKey::of::<u8, ()>(Some(Tag::from("a")))
        );
        assert_ne!(RegistryKey::of::<u8, ()>(None), RegistryKey::of::<u8, ()>(Some(Tag::from("a"))));
        assert_ne!(RegistryKey::of::<u8, (u8,)>(None), RegistryKey::of::<u8, (Option<u8>,)>(None));
        assert_ne!(RegistryKey::of::<u8, (u8,)>(None), RegistryKey::of::<u8, (u8, u8)>(None));
    }

    #[test]
    fn test_untagged() {
        let key = RegistryKey::of::<u8, (u16,)>(Some(Tag::from(1)));
        assert_eq!(key.untagged(), RegistryKey::of::<u8, (u16,)>(None));

        let keys = BTreeSet::from([key.clone(), key.untagged(), key]);
        assert_eq!(keys.len(), 2);
    }
}
