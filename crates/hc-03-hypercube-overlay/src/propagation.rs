//! # Overlay Maintenance Protocol
//!
//! Pushes position/cover-map updates to peers and queries their coordinates.
//!
//! Delivery is at most once per call: one connection per target, one
//! notification, closed on every path. No retries, no acknowledgment and no
//! ordering across targets.

use std::sync::Arc;

use futures::future::join_all;
use hc_01_transport::{Connection, Connector, TransportError};
use hc_02_service_dispatch::{call_as, notify, CallError};
use shared_types::{CodecError, Endpoint, Request};
use tracing::{debug, info, warn};

use crate::domain::Coordinates;
use crate::service::{
    SetPositionAndCoverMapRequest, GET_POSITION_AND_COVER_MAP, SET_POSITION_AND_COVER_MAP,
};

/// A target the update could not be handed to.
#[derive(Debug)]
pub struct PropagationFailure {
    pub target: Endpoint,
    pub error: TransportError,
}

/// Per-target result of [`OverlayPropagator::push_update`].
#[derive(Debug, Default)]
pub struct PropagationReport {
    pub delivered: Vec<Endpoint>,
    pub failed: Vec<PropagationFailure>,
}

impl PropagationReport {
    /// Every target accepted the update.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    #[must_use]
    pub fn failed_targets(&self) -> Vec<&Endpoint> {
        self.failed.iter().map(|f| &f.target).collect()
    }
}

/// Sends overlay maintenance messages through a [`Connector`].
#[derive(Clone)]
pub struct OverlayPropagator {
    connector: Arc<dyn Connector>,
    origin: Option<Endpoint>,
}

impl OverlayPropagator {
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            origin: None,
        }
    }

    /// Stamp outgoing requests with this node's endpoint.
    #[must_use]
    pub fn with_origin(mut self, origin: Endpoint) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Send the pair to every target's set service, which makes each target
    /// adopt it as its own position and cover map.
    ///
    /// Targets are contacted concurrently; a failing target never affects
    /// delivery to the others.
    ///
    /// # Errors
    ///
    /// `CodecError` if the update cannot be encoded. Per-target transport
    /// failures are reported in the returned [`PropagationReport`].
    pub async fn push_update(
        &self,
        position: &[f64],
        cover_map: &[f64],
        targets: &[Endpoint],
    ) -> Result<PropagationReport, CodecError> {
        let update = SetPositionAndCoverMapRequest {
            position_vector: position.to_vec(),
            cover_map_vector: cover_map.to_vec(),
        };
        let request = self.stamp(Request::with_payload(SET_POSITION_AND_COVER_MAP, &update)?);

        let attempts = targets.iter().map(|target| {
            let request = request.clone();
            async move { (target, self.deliver(target, request).await) }
        });

        let mut report = PropagationReport::default();
        for (target, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.delivered.push(target.clone()),
                Err(error) => {
                    warn!(target = %target, error = %error, "Update not delivered");
                    report.failed.push(PropagationFailure {
                        target: target.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Pushed position and cover map"
        );
        Ok(report)
    }

    /// Ask `target` for its current coordinates.
    pub async fn fetch_coordinates(&self, target: &Endpoint) -> Result<Coordinates, CallError> {
        let connection = self.connector.connect(target).await?;
        let request = self.stamp(Request::new(GET_POSITION_AND_COVER_MAP, Vec::new()));
        let result = call_as(connection.as_ref(), request).await;
        close_quietly(connection.as_ref()).await;
        result
    }

    async fn deliver(&self, target: &Endpoint, request: Request) -> Result<(), TransportError> {
        let connection = self.connector.connect(target).await?;
        let result = notify(connection.as_ref(), request).await;
        close_quietly(connection.as_ref()).await;
        if result.is_ok() {
            debug!(target = %target, "Update delivered");
        }
        result
    }

    fn stamp(&self, request: Request) -> Request {
        match &self.origin {
            Some(origin) => request.from_origin(origin.clone()),
            None => request,
        }
    }
}

impl std::fmt::Debug for OverlayPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayPropagator")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

async fn close_quietly(connection: &dyn Connection) {
    if let Err(e) = connection.close().await {
        debug!(peer = %connection.peer(), error = %e, "Close failed");
    }
}
