use alloc::vec::Vec;

/// Source of domain records addressed by an identifier.
///
/// The container treats providers as any other capability,
/// usually registered through [`crate::DefinitionHandle::implements`] as `dyn Provider<Id, Record>`.
pub trait Provider<Id, Record>: Send + Sync {
    /// Identifiers of every record the provider can fetch
    fn ids(&self) -> Vec<Id>;

    fn fetch(&self, id: &Id) -> Option<Record>;
}
