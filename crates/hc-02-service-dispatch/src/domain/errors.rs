//! # Dispatch Errors
//!
//! `TransportError` stays a separate category: a failing service never
//! looks like a broken connection, and vice versa.

use hc_01_transport::TransportError;
use shared_types::{CodecError, RemoteError, ServiceId};
use thiserror::Error;

/// Failure raised by a service while handling a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request payload does not have the shape this service expects.
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    /// `execute` ran before `set_request`.
    #[error("Request not set before execution")]
    MissingRequest,

    /// The request was well-formed but not acceptable.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Unexpected internal failure.
    #[error("Service failed: {0}")]
    Failed(String),
}

impl From<CodecError> for ServiceError {
    fn from(error: CodecError) -> Self {
        Self::InvalidPayload(error.to_string())
    }
}

/// Result of a failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No factory registered for the discriminator.
    #[error("No service registered for '{0}'")]
    UnknownService(ServiceId),

    /// The service failed or panicked.
    #[error("Service '{service}' failed: {reason}")]
    Execution {
        /// Discriminator of the failing service.
        service: ServiceId,
        /// Error description.
        reason: String,
    },

    /// Writing the response failed.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Errors from service registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The dispatcher is already serving traffic.
    #[error("Cannot register '{0}': dispatcher is already serving")]
    RegistryFrozen(ServiceId),
}

/// Errors from outbound calls.
#[derive(Debug, Error)]
pub enum CallError {
    /// The connection failed.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The remote node reported a failure.
    #[error("Remote error: {0}")]
    Remote(RemoteError),

    /// A request arrived where a response was expected.
    #[error("Expected a response, received a {0}")]
    UnexpectedMessage(&'static str),

    /// The response payload could not be decoded.
    #[error("Codec failure: {0}")]
    Codec(#[from] CodecError),
}
