//! Service contracts.

use super::errors::ServiceError;
use async_trait::async_trait;
use shared_types::{Request, Response};

/// A service that performs a side effect and never replies.
///
/// The sender does not wait, and the dispatcher never writes to the
/// connection on its behalf.
#[async_trait]
pub trait OneWayService: Send {
    /// Accept the request this instance must handle. Called exactly once,
    /// before [`OneWayService::execute`].
    fn set_request(&mut self, request: Request) -> Result<(), ServiceError>;

    /// Perform the side effect.
    async fn execute(&mut self) -> Result<(), ServiceError>;
}

/// A service that produces exactly one response.
#[async_trait]
pub trait RequestResponseService: Send {
    /// Accept the request this instance must handle. Called exactly once,
    /// before [`RequestResponseService::execute`].
    fn set_request(&mut self, request: Request) -> Result<(), ServiceError>;

    /// Do the work.
    async fn execute(&mut self) -> Result<(), ServiceError>;

    /// Consume the instance and yield its response.
    fn into_response(self: Box<Self>) -> Result<Response, ServiceError>;
}

/// A freshly created service, tagged by its response contract.
pub enum ServiceInstance {
    OneWay(Box<dyn OneWayService>),
    RequestResponse(Box<dyn RequestResponseService>),
}

impl ServiceInstance {
    /// Wrap a one-way service.
    pub fn one_way<S: OneWayService + 'static>(service: S) -> Self {
        Self::OneWay(Box::new(service))
    }

    /// Wrap a request/response service.
    pub fn request_response<S: RequestResponseService + 'static>(service: S) -> Self {
        Self::RequestResponse(Box::new(service))
    }

    /// Whether the dispatcher must send a response after execution.
    #[must_use]
    pub fn is_request_response(&self) -> bool {
        matches!(self, Self::RequestResponse(_))
    }
}

impl std::fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneWay(_) => write!(f, "ServiceInstance::OneWay"),
            Self::RequestResponse(_) => write!(f, "ServiceInstance::RequestResponse"),
        }
    }
}

/// Produces a new service instance for every dispatched request.
///
/// Any `Fn() -> ServiceInstance` closure is a factory:
///
/// ```rust,ignore
/// let node = Arc::clone(&node_state);
/// dispatcher.register("hypercube.set-position-and-cover-map", move || {
///     ServiceInstance::one_way(SetPositionAndCoverMapService::new(Arc::clone(&node)))
/// })?;
/// ```
pub trait ServiceFactory: Send + Sync {
    /// Create a fresh instance. Instances are never reused.
    fn create(&self) -> ServiceInstance;
}

impl<F> ServiceFactory for F
where
    F: Fn() -> ServiceInstance + Send + Sync,
{
    fn create(&self) -> ServiceInstance {
        self()
    }
}
