//! # Driven Ports (Outbound SPI)
//!
//! Interfaces a physical transport must provide. Nothing here assumes a
//! byte stream: in-process queues and datagram sockets fit the same shape.

use crate::domain::TransportError;
use async_trait::async_trait;
use shared_types::{Endpoint, Message};

/// An established bidirectional channel to exactly one peer.
///
/// # Thread Safety
///
/// Methods take `&self` so one task can `receive` while another `send`s on
/// the same connection. Implementations serialize concurrent sends so that
/// per-connection ordering holds.
///
/// # Lifecycle
///
/// Opened by a [`Connector`] or yielded by a [`Listener`], used any number
/// of times, then closed by its owner on every exit path.
#[async_trait]
pub trait Connection: Send + Sync {
    /// The remote endpoint.
    fn peer(&self) -> &Endpoint;

    /// Write one complete message to the peer.
    ///
    /// # Errors
    ///
    /// - `ConnectionClosed` after [`Connection::close`]
    /// - `Disconnected` / `Io` if the channel is broken
    /// - `FrameTooLarge` / `Malformed` if the message cannot be encoded
    async fn send(&self, message: Message) -> Result<(), TransportError>;

    /// Wait for the next complete message from the peer.
    ///
    /// # Errors
    ///
    /// - `ConnectionClosed` after [`Connection::close`]
    /// - `Disconnected` when the peer goes away
    /// - `Timeout` when a read timeout is configured and expires (the
    ///   connection is closed as a consequence)
    /// - `Malformed` / `FrameTooLarge` on bad input
    async fn receive(&self) -> Result<Message, TransportError>;

    /// Release the channel. Calling it again is a no-op returning `Ok`.
    async fn close(&self) -> Result<(), TransportError>;

    /// Whether [`Connection::close`] has run.
    fn is_closed(&self) -> bool;
}

/// Opens outbound connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `endpoint`.
    ///
    /// # Errors
    ///
    /// `UnsupportedScheme` if the adapter does not handle the endpoint's
    /// scheme, `Unreachable` if nothing answers.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>, TransportError>;
}

/// Accepts inbound connections.
#[async_trait]
pub trait Listener: Send + Sync {
    /// The endpoint peers use to reach this listener.
    fn local_endpoint(&self) -> &Endpoint;

    /// Wait for the next inbound connection.
    async fn accept(&self) -> Result<Box<dyn Connection>, TransportError>;
}
