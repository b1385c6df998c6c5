//! # Hypercube Overlay Facade
//!
//! Ties Node State, the dispatcher and the propagator together for a host
//! process.

use std::sync::Arc;

use hc_01_transport::{Connection, Connector};
use hc_02_service_dispatch::{
    serve_connection, CallError, ConnectionSummary, Dispatcher, RegistrationError,
};
use shared_types::Endpoint;
use tracing::info;

use crate::domain::{Coordinates, NodeState, OverlayError};
use crate::ports::NodeStateReader;
use crate::propagation::{OverlayPropagator, PropagationReport};
use crate::service::register_hypercube_services;

/// A node's participation in the overlay.
#[derive(Debug, Clone)]
pub struct HypercubeOverlay {
    node: Arc<NodeState>,
    dispatcher: Arc<Dispatcher>,
    propagator: OverlayPropagator,
}

impl HypercubeOverlay {
    /// Create an overlay with its own dispatcher, hypercube services
    /// registered.
    pub fn new(
        node: Arc<NodeState>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, RegistrationError> {
        Self::with_dispatcher(node, Arc::new(Dispatcher::new()), connector)
    }

    /// Register the hypercube services on an existing dispatcher, which may
    /// carry other services as well.
    pub fn with_dispatcher(
        node: Arc<NodeState>,
        dispatcher: Arc<Dispatcher>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, RegistrationError> {
        register_hypercube_services(&dispatcher, &node)?;
        let propagator = OverlayPropagator::new(connector).with_origin(node.self_endpoint().clone());
        Ok(Self {
            node,
            dispatcher,
            propagator,
        })
    }

    #[must_use]
    pub fn node_state(&self) -> &Arc<NodeState> {
        &self.node
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn propagator(&self) -> &OverlayPropagator {
        &self.propagator
    }

    /// Update local coordinates, then push them to `targets`.
    ///
    /// Nothing is sent if the update is rejected locally.
    pub async fn apply_local_update(
        &self,
        position: Vec<f64>,
        cover_map: Vec<f64>,
        targets: &[Endpoint],
    ) -> Result<PropagationReport, OverlayError> {
        self.node
            .set_position_and_cover_map(position.clone(), cover_map.clone())?;
        info!(targets = targets.len(), "Local coordinates updated");
        Ok(self
            .propagator
            .push_update(&position, &cover_map, targets)
            .await?)
    }

    /// Assign this node's current pair to every target.
    ///
    /// The set service replaces the receiver's own coordinates, so each
    /// target ends up holding this pair. Use it to hand a region to peers;
    /// it is not a way to advertise this node's position to them.
    pub async fn announce(&self, targets: &[Endpoint]) -> Result<PropagationReport, OverlayError> {
        let Coordinates {
            position,
            cover_map,
        } = self.node.snapshot();
        Ok(self
            .propagator
            .push_update(&position, &cover_map, targets)
            .await?)
    }

    /// Query a peer's coordinates.
    pub async fn fetch_coordinates(&self, target: &Endpoint) -> Result<Coordinates, CallError> {
        self.propagator.fetch_coordinates(target).await
    }

    /// Serve one inbound connection until it ends.
    pub async fn serve(&self, connection: &dyn Connection) -> ConnectionSummary {
        serve_connection(&self.dispatcher, connection).await
    }
}
