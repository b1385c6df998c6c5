//! # Transport Subsystem
//!
//! **Subsystem ID:** 1
//!
//! Connection and endpoint primitives for the hypercube overlay. This crate
//! knows nothing about what a message means; it only moves whole
//! [`Message`](shared_types::Message) values between two endpoints.
//!
//! ## Architecture
//!
//! - **Domain Layer:** transport errors and configuration
//! - **Ports Layer:** [`Connection`], [`Connector`] and [`Listener`] traits
//! - **Adapters Layer:** in-process channels ([`MemoryNetwork`]) and TCP
//!   ([`TcpConnector`], [`TcpListenerAdapter`])
//!
//! ## Contract
//!
//! - Messages sent on one connection arrive in order, whole, or not at all.
//! - `close` is idempotent. Afterwards `send` and `receive` fail with
//!   [`TransportError::ConnectionClosed`].
//! - An optional read timeout bounds `receive`; a timed-out connection is
//!   closed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hc_01_transport::{memory_pair, Connection, TransportConfig};
//! use shared_types::{Endpoint, Message, Request};
//!
//! let a = Endpoint::parse("mem://node-a")?;
//! let b = Endpoint::parse("mem://node-b")?;
//! let (left, right) = memory_pair(a, b, &TransportConfig::default());
//!
//! left.send(Request::new("ping", vec![]).into()).await?;
//! assert!(matches!(right.receive().await?, Message::Request(_)));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{
    memory_pair, MemoryConnection, MemoryListener, MemoryNetwork, TcpConnection, TcpConnector,
    TcpListenerAdapter, FRAME_HEADER_SIZE,
};
pub use domain::{
    TransportConfig, TransportError, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_FRAME_SIZE,
};
pub use ports::{Connection, Connector, Listener};
