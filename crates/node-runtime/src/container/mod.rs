//! # Node Container
//!
//! Configuration consumed when wiring the node's subsystems.

pub mod config;

pub use config::{ConfigError, NetworkConfig, NodeConfig, OverlayConfig};
