//! # Shared Types Crate
//!
//! Types shared by every layer of the hypercube overlay:
//!
//! - [`Endpoint`]: the address of a reachable peer. Identity is the address.
//! - [`Message`]: the unit exchanged over a connection, either a
//!   [`Request`] naming the service that must handle it or a [`Response`].
//! - [`codec`]: payload encoding used by services for their request and
//!   response bodies.
//!
//! ## Design Principles
//!
//! - **Opaque payloads**: the envelope never knows a service's payload shape.
//!   Each service decodes its own body, so new services need no change here.
//! - **Implicit correlation**: a response belongs to the request that preceded
//!   it on the same connection. There is no correlation id on the wire.

pub mod codec;
pub mod endpoint;
pub mod errors;
pub mod message;

pub use codec::{decode, encode};
pub use endpoint::Endpoint;
pub use errors::{CodecError, EndpointError};
pub use message::{Message, RemoteError, RemoteErrorKind, Request, Response, ServiceId};

/// Current protocol version carried by framed messages.
pub const PROTOCOL_VERSION: u16 = 1;
