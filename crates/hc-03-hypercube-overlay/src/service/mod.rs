//! # Hypercube Services
//!
//! Dispatcher-facing services that read and write Node State.
//!
//! | Discriminator                            | Contract         |
//! |------------------------------------------|------------------|
//! | `hypercube.set-position-and-cover-map`   | one-way          |
//! | `hypercube.get-position-and-cover-map`   | request/response |

mod get_position;
mod set_position;

pub use get_position::GetPositionAndCoverMapService;
pub use set_position::{SetPositionAndCoverMapRequest, SetPositionAndCoverMapService};

use std::sync::Arc;

use hc_02_service_dispatch::{Dispatcher, RegistrationError, ServiceInstance};

use crate::domain::NodeState;

/// Discriminator of the position/cover-map update service.
pub const SET_POSITION_AND_COVER_MAP: &str = "hypercube.set-position-and-cover-map";

/// Discriminator of the coordinate query service.
pub const GET_POSITION_AND_COVER_MAP: &str = "hypercube.get-position-and-cover-map";

/// Register both hypercube services against `node`.
pub fn register_hypercube_services(
    dispatcher: &Dispatcher,
    node: &Arc<NodeState>,
) -> Result<(), RegistrationError> {
    let setter = Arc::clone(node);
    dispatcher.register(SET_POSITION_AND_COVER_MAP, move || {
        ServiceInstance::one_way(SetPositionAndCoverMapService::new(Arc::clone(&setter)))
    })?;

    let getter = Arc::clone(node);
    dispatcher.register(GET_POSITION_AND_COVER_MAP, move || {
        ServiceInstance::request_response(GetPositionAndCoverMapService::new(Arc::clone(
            &getter,
        )))
    })?;

    Ok(())
}
