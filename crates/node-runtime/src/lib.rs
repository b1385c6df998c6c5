//! # Node Runtime Library
//!
//! This library exposes the runtime pieces for testing.
//! The main entry point is the `main.rs` binary.
//!
//! - `container/` - Node configuration (TOML file + environment overrides)
//! - `runtime` - Subsystem wiring, TCP accept loop, graceful shutdown

pub mod container;
pub mod runtime;

pub use container::{ConfigError, NodeConfig};
pub use runtime::{NodeRuntime, RuntimeError};
