//! Transport errors.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while moving messages between endpoints.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Operation attempted on a connection that was already closed locally.
    #[error("connection closed")]
    ConnectionClosed,

    /// The peer went away (end of stream, dropped channel).
    #[error("peer disconnected")]
    Disconnected,

    /// No complete message arrived within the configured read timeout.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The peer could not be reached.
    #[error("peer {endpoint} unreachable: {reason}")]
    Unreachable {
        /// Endpoint we tried to reach.
        endpoint: String,
        /// Error description.
        reason: String,
    },

    /// No adapter handles this endpoint's scheme.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),

    /// A listener is already bound to this endpoint.
    #[error("endpoint {0} is already bound")]
    AddressInUse(String),

    /// The received bytes do not form a valid message.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// A frame exceeds the configured maximum size.
    #[error("frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge {
        /// Size announced or produced.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Underlying socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// True for [`TransportError::ConnectionClosed`].
    #[must_use]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }

    /// Map a socket error, folding end-of-stream and resets into
    /// [`TransportError::Disconnected`].
    pub(crate) fn from_io(error: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match error.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => Self::Disconnected,
            _ => Self::Io(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_eof_maps_to_disconnected() {
        let err = TransportError::from_io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn test_other_io_errors_are_preserved() {
        let err = TransportError::from_io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(TransportError::ConnectionClosed.to_string(), "connection closed");
        assert_eq!(
            TransportError::FrameTooLarge { size: 10, max: 4 }.to_string(),
            "frame of 10 bytes exceeds maximum of 4"
        );
        assert!(TransportError::ConnectionClosed.is_connection_closed());
        assert!(!TransportError::Disconnected.is_connection_closed());
    }
}
