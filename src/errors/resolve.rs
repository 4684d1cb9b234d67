use alloc::boxed::Box;
use core::any::TypeId;

use super::{instantiate::InstantiateErrorKind, instantiator::InstantiatorErrorKind};
use crate::{any::TypeInfo, key::RegistryKey};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Definition not found in container: {key}")]
    DefinitionNotFound { key: RegistryKey },
    #[error("Resolution of {key} failed: {source}")]
    ResolutionFailed {
        key: RegistryKey,
        #[source]
        source: InstantiatorErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>,
    },
    #[error("Incorrect instance type. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeId },
}

impl ResolveErrorKind {
    /// Key of the definition the error was raised for, if any
    #[must_use]
    pub fn key(&self) -> Option<&RegistryKey> {
        match self {
            Self::DefinitionNotFound { key } | Self::ResolutionFailed { key, .. } => Some(key),
            Self::IncorrectType { .. } => None,
        }
    }

    /// Innermost error of a chain of failed resolutions.
    ///
    /// Walks through failed auto-injections and nested resolves made by factories and callbacks,
    /// so callers can match the original cause.
    #[must_use]
    pub fn root_cause(&self) -> &ResolveErrorKind {
        let mut current = self;
        loop {
            match current {
                Self::ResolutionFailed {
                    source: InstantiatorErrorKind::Deps(inner),
                    ..
                }
                | Self::ResolutionFailed {
                    source:
                        InstantiatorErrorKind::Factory(InstantiateErrorKind::Resolve(inner))
                        | InstantiatorErrorKind::Callback(InstantiateErrorKind::Resolve(inner)),
                    ..
                } => current = &**inner,
                _ => return current,
            }
        }
    }
}
