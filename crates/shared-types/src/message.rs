//! # Message Model
//!
//! The envelope exchanged over a connection. A [`Message`] is either a
//! [`Request`], addressed to a service by its [`ServiceId`], or a
//! [`Response`] to the request that preceded it on the same connection.
//!
//! Fire-and-forget requests never have a response.

use crate::codec;
use crate::endpoint::Endpoint;
use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator naming the service that must handle a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(String);

impl ServiceId {
    /// Create a discriminator.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The discriminator as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ServiceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A request for a remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Service that must handle this request.
    pub service: ServiceId,
    /// Endpoint of the node that issued the request, when known.
    pub origin: Option<Endpoint>,
    /// Whether the sender blocks waiting for a response.
    pub expects_response: bool,
    /// Service-specific body.
    pub payload: Vec<u8>,
}

impl Request {
    /// Create a fire-and-forget request with raw payload bytes.
    pub fn new(service: impl Into<ServiceId>, payload: Vec<u8>) -> Self {
        Self {
            service: service.into(),
            origin: None,
            expects_response: false,
            payload,
        }
    }

    /// Create a request whose payload is the encoding of `body`.
    pub fn with_payload<T: Serialize>(
        service: impl Into<ServiceId>,
        body: &T,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(service, codec::encode(body)?))
    }

    /// Record the endpoint that issued this request.
    #[must_use]
    pub fn from_origin(mut self, origin: Endpoint) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Mark the request as waiting for a response.
    #[must_use]
    pub fn expecting_response(mut self) -> Self {
        self.expects_response = true;
        self
    }

    /// Decode the payload as `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        codec::decode(&self.payload)
    }
}

/// Category of a failure reported back to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteErrorKind {
    /// No service is registered for the request's discriminator.
    UnknownService,
    /// The service failed while handling the request.
    Execution,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownService => write!(f, "unknown service"),
            Self::Execution => write!(f, "execution failed"),
        }
    }
}

/// Failure carried in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Response to the request that preceded it on the same connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub result: Result<Vec<u8>, RemoteError>,
}

impl Response {
    /// Successful response with raw payload bytes.
    #[must_use]
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            result: Ok(payload),
        }
    }

    /// Successful response whose payload is the encoding of `body`.
    pub fn with_payload<T: Serialize>(body: &T) -> Result<Self, CodecError> {
        Ok(Self::ok(codec::encode(body)?))
    }

    /// Error response.
    #[must_use]
    pub fn error(error: RemoteError) -> Self {
        Self { result: Err(error) }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// The remote error, if this is an error response.
    #[must_use]
    pub fn remote_error(&self) -> Option<&RemoteError> {
        self.result.as_ref().err()
    }

    /// Decode the payload as `T`. `None` for an error response.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Option<Result<T, CodecError>> {
        self.result.as_ref().ok().map(|payload| codec::decode(payload))
    }
}

/// Unit exchanged over a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Request(Request),
    Response(Response),
}

impl Message {
    /// Short label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Response(_) => "response",
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}
