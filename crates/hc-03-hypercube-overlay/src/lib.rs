//! # Hypercube Overlay Subsystem
//!
//! **Subsystem ID:** 3
//!
//! Each node sits at a position in a shared d-dimensional space and covers a
//! region of it. This crate holds that state and keeps neighbors informed.
//!
//! ## Components
//!
//! - [`NodeState`]: position and cover map behind one lock.
//! - Hypercube services: the one-way `hypercube.set-position-and-cover-map`
//!   update and the request/response `hypercube.get-position-and-cover-map`
//!   query, registered with [`register_hypercube_services`].
//! - [`OverlayPropagator`]: pushes updates to peers, at most once per call.
//! - [`HypercubeOverlay`]: facade used by the host process.
//!
//! ## Update Flow
//!
//! ```text
//! Node B                                      Node A
//! ──────                                      ──────
//! apply_local_update(pos, cover, [A])
//!   │ NodeState (B) ◄── replace
//!   │
//!   └── connect ─► notify(set-position-and-cover-map) ─► close
//!                                   │
//!                                   ▼
//!                          dispatcher ─► SetPositionAndCoverMapService
//!                                              │
//!                                              ▼
//!                                   NodeState (A) ◄── replace
//!                          (no response written)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let node = Arc::new(NodeState::new(endpoint).with_dimensions(2));
//! let overlay = HypercubeOverlay::new(node, Arc::new(TcpConnector::default()))?;
//!
//! let report = overlay
//!     .apply_local_update(vec![0.25, 0.75], vec![0.0, 0.5, 0.5, 1.0], &neighbors)
//!     .await?;
//! ```

pub mod domain;
pub mod overlay;
pub mod ports;
pub mod propagation;
pub mod service;

pub use domain::{Coordinates, NodeState, NodeStateError, OverlayError};
pub use overlay::HypercubeOverlay;
pub use ports::NodeStateReader;
pub use propagation::{OverlayPropagator, PropagationFailure, PropagationReport};
pub use service::{
    register_hypercube_services, GetPositionAndCoverMapService, SetPositionAndCoverMapRequest,
    SetPositionAndCoverMapService, GET_POSITION_AND_COVER_MAP, SET_POSITION_AND_COVER_MAP,
};
