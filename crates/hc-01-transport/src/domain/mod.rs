//! # Domain Layer
//!
//! Transport errors and tunables.

pub mod config;
pub mod errors;

pub use config::{TransportConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_FRAME_SIZE};
pub use errors::TransportError;
