use alloc::boxed::Box;

use super::resolve::ResolveErrorKind;
use crate::any::TypeInfo;

/// Error returned by factories and post-resolution callbacks
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
    #[error(transparent)]
    Resolve(Box<ResolveErrorKind>),
    #[error("Incorrect value type, expected: {expected}")]
    IncorrectType { expected: TypeInfo },
}

impl InstantiateErrorKind {
    /// Wraps any error produced while building an instance
    #[inline]
    #[must_use]
    pub fn custom(err: impl Into<anyhow::Error>) -> Self {
        Self::Custom(err.into())
    }
}

impl From<ResolveErrorKind> for InstantiateErrorKind {
    #[inline]
    fn from(err: ResolveErrorKind) -> Self {
        Self::Resolve(Box::new(err))
    }
}
