use std::sync::Arc;

use async_trait::async_trait;
use hc_02_service_dispatch::{RequestResponseService, ServiceError};
use shared_types::{Request, Response};

use crate::domain::{Coordinates, NodeState};
use crate::ports::NodeStateReader;

/// Returns the node's current [`Coordinates`]. The request payload is
/// ignored.
pub struct GetPositionAndCoverMapService {
    node: Arc<NodeState>,
    requested: bool,
    snapshot: Option<Coordinates>,
}

impl GetPositionAndCoverMapService {
    #[must_use]
    pub fn new(node: Arc<NodeState>) -> Self {
        Self {
            node,
            requested: false,
            snapshot: None,
        }
    }
}

#[async_trait]
impl RequestResponseService for GetPositionAndCoverMapService {
    fn set_request(&mut self, _request: Request) -> Result<(), ServiceError> {
        self.requested = true;
        Ok(())
    }

    async fn execute(&mut self) -> Result<(), ServiceError> {
        if !self.requested {
            return Err(ServiceError::MissingRequest);
        }
        self.snapshot = Some(self.node.snapshot());
        Ok(())
    }

    fn into_response(self: Box<Self>) -> Result<Response, ServiceError> {
        let snapshot = self.snapshot.ok_or(ServiceError::MissingRequest)?;
        Ok(Response::with_payload(&snapshot)?)
    }
}
