use shared_types::Endpoint;
use std::fmt;

/// Result of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A request/response service ran and its response was sent.
    Responded,
    /// A one-way service ran; nothing was written.
    NoResponse,
}

/// Why a serving loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer closed its side.
    PeerDisconnected,
    /// This side was closed by someone other than the serving loop.
    LocallyClosed,
    /// No message arrived within the read timeout.
    Timeout,
    /// Receiving or replying failed.
    TransportFailure(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerDisconnected => write!(f, "peer disconnected"),
            Self::LocallyClosed => write!(f, "closed locally while serving"),
            Self::Timeout => write!(f, "read timeout"),
            Self::TransportFailure(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

/// What happened on one connection, reported when its serving loop ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub peer: Endpoint,
    pub requests: u64,
    pub responses: u64,
    pub failures: u64,
    pub close_reason: CloseReason,
}

impl ConnectionSummary {
    pub(crate) fn new(peer: Endpoint) -> Self {
        Self {
            peer,
            requests: 0,
            responses: 0,
            failures: 0,
            close_reason: CloseReason::PeerDisconnected,
        }
    }
}
