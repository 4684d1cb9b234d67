#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod container;
pub(crate) mod context;
pub(crate) mod definition;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod key;
pub(crate) mod lifetime;
pub(crate) mod provider;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod service;
pub(crate) mod tag;

pub mod macros_utils;

pub use any::TypeInfo;
pub use container::Container;
pub use definition::DefinitionHandle;
pub use errors::{InstantiateErrorKind, InstantiateResult, InstantiatorErrorKind, ResolveErrorKind};
pub use inject::{AutoInjected, AutoInjection, Injected, InjectedWeak, Ownership};
pub use key::RegistryKey;
pub use lifetime::Lifetime;
pub use provider::Provider;
pub use resolver::Resolver;
pub use tag::Tag;
