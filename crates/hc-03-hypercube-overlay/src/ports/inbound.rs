//! # Driving Ports (Inbound API)
//!
//! Read-only view of Node State for the spatial query-routing logic that
//! sits above the overlay.

use shared_types::Endpoint;

use crate::domain::Coordinates;

/// Read access to a node's place in the hypercube.
///
/// # Example
///
/// ```rust,ignore
/// use hc_03_hypercube_overlay::NodeStateReader;
///
/// fn covers<R: NodeStateReader>(node: &R, point: &[f64]) -> bool {
///     let Coordinates { cover_map, .. } = node.snapshot();
///     point.iter().enumerate().all(|(d, x)| {
///         cover_map[2 * d] <= *x && *x < cover_map[2 * d + 1]
///     })
/// }
/// ```
pub trait NodeStateReader: Send + Sync {
    /// This node's own endpoint.
    fn self_endpoint(&self) -> &Endpoint;

    /// Current position vector.
    fn current_position(&self) -> Vec<f64>;

    /// Current cover map vector.
    fn current_cover_map(&self) -> Vec<f64>;

    /// Position and cover map read under one lock acquisition.
    ///
    /// Use this instead of two separate reads when the values must belong
    /// to the same update.
    fn snapshot(&self) -> Coordinates;
}
