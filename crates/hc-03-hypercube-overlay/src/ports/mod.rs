//! # Ports Layer
//!
//! - `inbound`: read API offered to query-routing logic

pub mod inbound;

pub use inbound::NodeStateReader;
