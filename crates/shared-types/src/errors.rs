//! # Error Types
//!
//! Errors raised while building endpoints or (de)serializing payloads.

use thiserror::Error;

/// Errors that can occur while parsing an endpoint address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The address is not a valid URI.
    #[error("Invalid endpoint address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The address has no host component.
    #[error("Endpoint address '{0}' has no host")]
    MissingHost(String),
}

/// Errors that can occur while encoding or decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("Failed to encode payload: {0}")]
    Encode(String),

    /// Deserialization failed (truncated or foreign bytes).
    #[error("Failed to decode payload: {0}")]
    Decode(String),
}
