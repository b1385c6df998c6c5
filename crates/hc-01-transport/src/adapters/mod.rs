//! # Transport Adapters
//!
//! ## Adapters Provided
//!
//! - `MemoryNetwork` / `MemoryConnection` - in-process channels (`mem://`),
//!   used by tests and single-process simulations
//! - `TcpConnector` / `TcpListenerAdapter` / `TcpConnection` - length-prefixed
//!   frames over `tokio::net` (`tcp://`)

mod close_signal;
/// Length-prefixed frame encoding
pub mod framing;
/// In-process channel transport
pub mod memory;
/// TCP transport
pub mod tcp;

pub use framing::FRAME_HEADER_SIZE;
pub use memory::{memory_pair, MemoryConnection, MemoryListener, MemoryNetwork};
pub use tcp::{TcpConnection, TcpConnector, TcpListenerAdapter};

pub(crate) use close_signal::CloseSignal;

use crate::domain::TransportError;
use std::future::Future;
use std::time::Duration;

/// Run a receive future under the optional read timeout.
pub(crate) async fn with_read_timeout<T, F>(
    timeout: Option<Duration>,
    fut: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| TransportError::Timeout(limit))?,
        None => fut.await,
    }
}
