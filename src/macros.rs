/// Implements [`AutoInjected`](crate::AutoInjected) for a type by listing its marker fields.
///
/// ```rust
/// use weft::{auto_injected, Injected, InjectedWeak};
///
/// struct Database;
/// struct Cache;
///
/// struct Repository {
///     database: Injected<Database>,
///     cache: InjectedWeak<Cache>,
/// }
///
/// auto_injected!(Repository { database, cache });
/// ```
#[macro_export]
macro_rules! auto_injected {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::AutoInjected for $ty {
            fn injections(&self) -> $crate::macros_utils::Vec<&dyn $crate::AutoInjection> {
                $crate::macros_utils::Vec::from([$(&self.$field as &dyn $crate::AutoInjection),*])
            }
        }
    };
}
