//! # Overlay Errors

use shared_types::CodecError;
use thiserror::Error;

/// Rejected Node State update. The previous state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeStateError {
    /// A coordinate is NaN or infinite.
    #[error("Non-finite value at {vector}[{index}]")]
    NonFiniteCoordinate {
        /// Which vector held the value.
        vector: &'static str,
        index: usize,
    },

    /// The position does not match the configured dimensionality.
    #[error("Position has {actual} dimensions, node is configured for {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from local overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Invalid update: {0}")]
    NodeState(#[from] NodeStateError),

    #[error("Failed to encode update: {0}")]
    Codec(#[from] CodecError),
}
