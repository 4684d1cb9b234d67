#[doc(hidden)]
pub use alloc::vec::Vec;
