use alloc::string::String;
use core::fmt::{self, Display, Formatter};

/// Disambiguates several registrations of the same capability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    String(String),
    Int(i64),
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Tag::String(value) => write!(f, "{value:?}"),
            Tag::Int(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Tag {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Tag {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Tag {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Tag {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}
