//! # Ports Layer
//!
//! The transport contract. Adapters implement these traits; the dispatcher
//! and the overlay depend only on them.

pub mod outbound;

pub use outbound::{Connection, Connector, Listener};
