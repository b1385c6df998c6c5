//! # Dispatcher
//!
//! Resolves a request's discriminator, runs a fresh service instance and
//! enforces the response contract:
//!
//! | Situation                         | Written to the connection      |
//! |-----------------------------------|--------------------------------|
//! | one-way, success                  | nothing                        |
//! | one-way, failure or panic         | nothing (logged)               |
//! | request/response, success         | the service's response         |
//! | request/response, failure/panic   | error response (`Execution`)   |
//! | unknown, caller waits             | error response (`UnknownService`) |
//! | unknown, fire-and-forget          | nothing (logged)               |
//!
//! A failing or panicking service never takes the dispatcher down.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use hc_01_transport::Connection;
use parking_lot::RwLock;
use shared_types::{RemoteError, RemoteErrorKind, Request, Response, ServiceId};
use tracing::{debug, info, warn};

use crate::domain::{
    DispatchError, DispatchOutcome, OneWayService, RegistrationError, RequestResponseService,
    ServiceError, ServiceFactory, ServiceInstance,
};
use crate::registry::ServiceRegistry;


/// Routes requests to registered services.
///
/// Shared between connection tasks behind an `Arc`.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: RwLock<ServiceRegistry>,
    serving: AtomicBool,
}

impl Dispatcher {
    /// Create a dispatcher with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher from a prepared registry.
    #[must_use]
    pub fn with_registry(registry: ServiceRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
            serving: AtomicBool::new(false),
        }
    }

    /// Bind `service` to `factory`.
    ///
    /// Re-registering a discriminator replaces the earlier factory. Once the
    /// dispatcher is serving, registration is rejected.
    pub fn register<F>(
        &self,
        service: impl Into<ServiceId>,
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        F: ServiceFactory + 'static,
    {
        let service = service.into();
        let mut registry = self.registry.write();
        // Checked under the write lock so `start_serving` cannot interleave.
        if self.serving.load(Ordering::Acquire) {
            warn!(service = %service, "[Dispatch] Registration rejected, already serving");
            return Err(RegistrationError::RegistryFrozen(service));
        }
        registry.insert(service, Arc::new(factory));
        Ok(())
    }

    /// Freeze the registry. Called implicitly by the first dispatch.
    pub fn start_serving(&self) {
        let registry = self.registry.write();
        if !self.serving.swap(true, Ordering::AcqRel) {
            info!(
                services = registry.len(),
                "[Dispatch] Registry frozen, serving requests"
            );
        }
    }

    #[must_use]
    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_registered(&self, service: &ServiceId) -> bool {
        self.registry.read().contains(service)
    }

    /// Registered discriminators, sorted.
    #[must_use]
    pub fn registered_services(&self) -> Vec<ServiceId> {
        self.registry.read().services()
    }

    /// Handle one request received on `connection`.
    ///
    /// Responses, including error responses, are written to the same
    /// connection. The returned error describes what went wrong locally;
    /// any reply owed to the caller has already been attempted.
    pub async fn dispatch(
        &self,
        request: Request,
        connection: &dyn Connection,
    ) -> Result<DispatchOutcome, DispatchError> {
        if !self.is_serving() {
            self.start_serving();
        }

        let service = request.service.clone();
        let factory = self.registry.read().get(&service);
        let Some(factory) = factory else {
            return self.reject_unknown(request, connection).await;
        };

        debug!(service = %service, peer = %connection.peer(), "[Dispatch] Dispatching request");

        let instance = match std::panic::catch_unwind(AssertUnwindSafe(|| factory.create())) {
            Ok(instance) => instance,
            Err(panic) => {
                let reason = format!("factory panicked: {}", panic_message(panic.as_ref()));
                warn!(service = %service, reason = %reason, "[Dispatch] Service creation failed");
                if request.expects_response {
                    reply_execution_error(connection, &service, &reason).await;
                }
                return Err(DispatchError::Execution { service, reason });
            }
        };

        match instance {
            ServiceInstance::OneWay(instance) => run_one_way(instance, request, service).await,
            ServiceInstance::RequestResponse(instance) => {
                run_request_response(instance, request, service, connection).await
            }
        }
    }

    async fn reject_unknown(
        &self,
        request: Request,
        connection: &dyn Connection,
    ) -> Result<DispatchOutcome, DispatchError> {
        let service = request.service;
        warn!(
            service = %service,
            peer = %connection.peer(),
            expects_response = request.expects_response,
            "[Dispatch] No service registered"
        );

        if request.expects_response {
            let error = RemoteError::new(
                RemoteErrorKind::UnknownService,
                format!("no service registered for '{service}'"),
            );
            if let Err(e) = connection.send(Response::error(error).into()).await {
                warn!(service = %service, error = %e, "[Dispatch] Failed to send error response");
            }
        }

        Err(DispatchError::UnknownService(service))
    }
}

async fn run_one_way(
    mut instance: Box<dyn OneWayService>,
    request: Request,
    service: ServiceId,
) -> Result<DispatchOutcome, DispatchError> {
    let run = async move {
        instance.set_request(request)?;
        instance.execute().await
    };

    match settle(AssertUnwindSafe(run).catch_unwind().await) {
        Ok(()) => Ok(DispatchOutcome::NoResponse),
        Err(reason) => {
            warn!(service = %service, reason = %reason, "[Dispatch] One-way service failed");
            Err(DispatchError::Execution { service, reason })
        }
    }
}

async fn run_request_response(
    mut instance: Box<dyn RequestResponseService>,
    request: Request,
    service: ServiceId,
    connection: &dyn Connection,
) -> Result<DispatchOutcome, DispatchError> {
    let run = async move {
        instance.set_request(request)?;
        instance.execute().await?;
        instance.into_response()
    };

    match settle(AssertUnwindSafe(run).catch_unwind().await) {
        Ok(response) => {
            connection.send(response.into()).await?;
            Ok(DispatchOutcome::Responded)
        }
        Err(reason) => {
            warn!(service = %service, reason = %reason, "[Dispatch] Service failed");
            reply_execution_error(connection, &service, &reason).await;
            Err(DispatchError::Execution { service, reason })
        }
    }
}

async fn reply_execution_error(connection: &dyn Connection, service: &ServiceId, reason: &str) {
    let error = RemoteError::new(RemoteErrorKind::Execution, reason);
    if let Err(e) = connection.send(Response::error(error).into()).await {
        warn!(service = %service, error = %e, "[Dispatch] Failed to send error response");
    }
}

/// Collapse a caught panic and a service error into one failure reason.
fn settle<T>(result: Result<Result<T, ServiceError>, Box<dyn Any + Send>>) -> Result<T, String> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error.to_string()),
        Err(panic) => Err(format!("service panicked: {}", panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
