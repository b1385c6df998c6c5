use std::sync::Arc;

use async_trait::async_trait;
use hc_02_service_dispatch::{OneWayService, ServiceError};
use serde::{Deserialize, Serialize};
use shared_types::{Endpoint, Request};
use tracing::info;

use crate::domain::NodeState;

/// Payload of `hypercube.set-position-and-cover-map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPositionAndCoverMapRequest {
    pub position_vector: Vec<f64>,
    pub cover_map_vector: Vec<f64>,
}

/// Replaces the receiving node's position and cover map. Sends nothing back.
pub struct SetPositionAndCoverMapService {
    node: Arc<NodeState>,
    update: Option<SetPositionAndCoverMapRequest>,
    origin: Option<Endpoint>,
}

impl SetPositionAndCoverMapService {
    #[must_use]
    pub fn new(node: Arc<NodeState>) -> Self {
        Self {
            node,
            update: None,
            origin: None,
        }
    }
}

#[async_trait]
impl OneWayService for SetPositionAndCoverMapService {
    fn set_request(&mut self, request: Request) -> Result<(), ServiceError> {
        self.update = Some(request.decode_payload()?);
        self.origin = request.origin;
        Ok(())
    }

    async fn execute(&mut self) -> Result<(), ServiceError> {
        let update = self.update.take().ok_or(ServiceError::MissingRequest)?;
        self.node
            .set_position_and_cover_map(update.position_vector, update.cover_map_vector)
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        match &self.origin {
            Some(origin) => info!(origin = %origin, "Position and cover map updated"),
            None => info!("Position and cover map updated"),
        }
        Ok(())
    }
}
