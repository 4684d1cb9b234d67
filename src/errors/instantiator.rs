/// Stage of a resolution that failed
#[derive(thiserror::Error, Debug)]
pub enum InstantiatorErrorKind<DepsErr, FactoryErr> {
    /// A required auto-injection of the instance failed
    #[error(transparent)]
    Deps(DepsErr),
    /// The factory failed
    #[error(transparent)]
    Factory(FactoryErr),
    /// The post-resolution callback failed
    #[error(transparent)]
    Callback(FactoryErr),
}
