mod instantiate;
mod instantiator;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use instantiator::InstantiatorErrorKind;
pub use resolve::ResolveErrorKind;

#[allow(type_alias_bounds)]
pub type InstantiateResult<T, Err: Into<InstantiateErrorKind> = InstantiateErrorKind> = Result<T, Err>;
