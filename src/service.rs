use alloc::sync::Arc;

pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&self, request: Request) -> Result<Self::Response, Self::Error>;
}

/// Type-erased service that is cheap to clone out of the registry lock
pub(crate) struct SharedService<Request, Response, Error>(
    pub(crate) Arc<dyn Service<Request, Response = Response, Error = Error> + Send + Sync>,
);

impl<Request, Response, Error> SharedService<Request, Response, Error> {
    #[inline]
    #[must_use]
    pub(crate) fn new<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error> + Send + Sync + 'static,
    {
        Self(Arc::new(service))
    }
}

impl<Request, Response, Error> Clone for SharedService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Request, Response, Error> Service<Request> for SharedService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&self, request: Request) -> Result<Self::Response, Self::Error> {
        self.0.call(request)
    }
}

#[inline]
#[must_use]
pub(crate) const fn service_fn<T>(f: T) -> ServiceFn<T> {
    ServiceFn { f }
}

pub(crate) struct ServiceFn<T> {
    f: T,
}

impl<F, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: Fn(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.f)(request)
    }
}
