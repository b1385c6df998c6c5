//! # Update Flows
//!
//! Node B drives node A's dispatcher over a single connection and checks
//! what A ends up holding and what A sends back.

#[cfg(test)]
mod tests {
    use crate::support::{memory_node, wire};
    use hc_01_transport::{Connection, MemoryNetwork};
    use hc_02_service_dispatch::{call_as, notify, CallError, RegistrationError, ServiceInstance};
    use hc_03_hypercube_overlay::{
        Coordinates, GetPositionAndCoverMapService, HypercubeOverlay, NodeStateReader,
        SetPositionAndCoverMapRequest, GET_POSITION_AND_COVER_MAP, SET_POSITION_AND_COVER_MAP,
    };
    use shared_types::{Endpoint, RemoteErrorKind, Request};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn node_a() -> HypercubeOverlay {
        memory_node(
            &MemoryNetwork::new(),
            "node-a",
            Some(2),
            Some((vec![0.5, 0.5], vec![0.0, 1.0, 0.0, 1.0])),
        )
    }

    fn update_request(position: Vec<f64>, cover_map: Vec<f64>) -> Request {
        Request::with_payload(
            SET_POSITION_AND_COVER_MAP,
            &SetPositionAndCoverMapRequest {
                position_vector: position,
                cover_map_vector: cover_map,
            },
        )
        .unwrap()
    }

    // =========================================================================
    // END-TO-END: POSITION UPDATE
    // =========================================================================

    /// B pushes a new pair; A holds exactly that pair and writes nothing back.
    #[tokio::test]
    async fn test_update_applied_and_nothing_sent_back() {
        let a = node_a();
        let (b_side, a_side) = wire("node-b", "node-a");

        let server = {
            let a = a.clone();
            tokio::spawn(async move { a.serve(&a_side).await })
        };

        notify(
            &b_side,
            update_request(vec![0.25, 0.75], vec![0.0, 0.5, 0.5, 1.0]),
        )
        .await
        .unwrap();
        b_side.close().await.unwrap();

        let summary = server.await.unwrap();
        assert_eq!(summary.requests, 1);
        assert_eq!(summary.responses, 0);
        assert_eq!(summary.failures, 0);
        assert_eq!(a.node_state().current_position(), vec![0.25, 0.75]);
        assert_eq!(
            a.node_state().current_cover_map(),
            vec![0.0, 0.5, 0.5, 1.0]
        );
    }

    /// Applying the same update twice leaves the same state as once.
    #[tokio::test]
    async fn test_duplicate_update_is_idempotent() {
        let a = node_a();
        let (b_side, a_side) = wire("node-b", "node-a");
        let server = {
            let a = a.clone();
            tokio::spawn(async move { a.serve(&a_side).await })
        };

        for _ in 0..2 {
            notify(&b_side, update_request(vec![0.1, 0.9], vec![0.0, 0.2]))
                .await
                .unwrap();
        }
        b_side.close().await.unwrap();
        server.await.unwrap();

        assert_eq!(
            a.node_state().snapshot(),
            Coordinates::new(vec![0.1, 0.9], vec![0.0, 0.2])
        );
    }

    // =========================================================================
    // END-TO-END: UNKNOWN SERVICE
    // =========================================================================

    #[tokio::test]
    async fn test_unregistered_op_leaves_state_unchanged() {
        let a = node_a();
        let before = a.node_state().snapshot();
        let (b_side, a_side) = wire("node-b", "node-a");
        let server = {
            let a = a.clone();
            tokio::spawn(async move { a.serve(&a_side).await })
        };

        notify(&b_side, Request::new("unregistered-op", vec![0; 16]))
            .await
            .unwrap();
        let waited = call_as::<Coordinates>(&b_side, Request::new("unregistered-op", Vec::new()))
            .await;
        b_side.close().await.unwrap();

        let summary = server.await.unwrap();
        assert_eq!(summary.failures, 2);
        assert!(matches!(
            waited,
            Err(CallError::Remote(ref e)) if e.kind == RemoteErrorKind::UnknownService
        ));
        assert_eq!(a.node_state().snapshot(), before);
    }

    // =========================================================================
    // QUERY AND REGISTRATION
    // =========================================================================

    #[tokio::test]
    async fn test_get_returns_snapshot_after_update() {
        let a = node_a();
        let (b_side, a_side) = wire("node-b", "node-a");
        let server = {
            let a = a.clone();
            tokio::spawn(async move { a.serve(&a_side).await })
        };

        notify(&b_side, update_request(vec![0.3, 0.4], vec![0.0, 1.0]))
            .await
            .unwrap();
        let coordinates: Coordinates =
            call_as(&b_side, Request::new(GET_POSITION_AND_COVER_MAP, Vec::new()))
                .await
                .unwrap();
        b_side.close().await.unwrap();

        // Requests on one connection are handled in order.
        assert_eq!(coordinates, Coordinates::new(vec![0.3, 0.4], vec![0.0, 1.0]));
        let summary = server.await.unwrap();
        assert_eq!(summary.responses, 1);
    }

    #[tokio::test]
    async fn test_registration_rejected_once_serving() {
        let a = node_a();
        let (b_side, a_side) = wire("node-b", "node-a");
        let server = {
            let a = a.clone();
            tokio::spawn(async move { a.serve(&a_side).await })
        };
        notify(&b_side, update_request(vec![0.2, 0.2], vec![]))
            .await
            .unwrap();
        b_side.close().await.unwrap();
        server.await.unwrap();

        let node = Arc::clone(a.node_state());
        let late = a.dispatcher().register("late-op", move || {
            ServiceInstance::request_response(GetPositionAndCoverMapService::new(Arc::clone(&node)))
        });
        assert!(matches!(late, Err(RegistrationError::RegistryFrozen(_))));
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    #[test]
    fn test_independent_endpoints_are_interchangeable() {
        let first = Endpoint::parse("tcp://10.0.0.7:7400/overlay").unwrap();
        let second: Endpoint = "tcp://10.0.0.7:7400/overlay".parse().unwrap();

        let mut set = HashSet::new();
        set.insert(first.clone());
        assert!(set.contains(&second));
        assert_eq!(first, second);
    }
}
