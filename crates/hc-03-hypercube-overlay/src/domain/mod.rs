//! # Domain Layer
//!
//! Node State and the coordinates it guards.

pub mod coordinates;
pub mod errors;
pub mod node_state;

pub use coordinates::Coordinates;
pub use errors::{NodeStateError, OverlayError};
pub use node_state::NodeState;
