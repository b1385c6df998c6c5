//! # Propagation Flows
//!
//! One node pushes its coordinates to several peers on a shared in-memory
//! network.

#[cfg(test)]
mod tests {
    use crate::support::{eventually, mem_endpoint, memory_node, serve_in_background};
    use hc_01_transport::{MemoryNetwork, TransportError};
    use hc_02_service_dispatch::CallError;
    use hc_03_hypercube_overlay::{Coordinates, NodeStateReader, OverlayError};

    #[tokio::test]
    async fn test_update_fans_out_to_all_neighbors() {
        let net = MemoryNetwork::new();
        let a = memory_node(&net, "node-a", Some(2), None);
        let peers: Vec<_> = (0..5)
            .map(|i| memory_node(&net, &format!("peer-{i}"), Some(2), None))
            .collect();
        for peer in &peers {
            serve_in_background(&net, peer);
        }
        let targets: Vec<_> = peers
            .iter()
            .map(|p| p.node_state().self_endpoint().clone())
            .collect();

        let report = a
            .apply_local_update(vec![0.25, 0.75], vec![0.0, 0.5, 0.5, 1.0], &targets)
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.delivered.len(), 5);
        for peer in &peers {
            let state = peer.node_state();
            assert!(eventually(|| state.current_position() == vec![0.25, 0.75]).await);
            assert_eq!(state.current_cover_map(), vec![0.0, 0.5, 0.5, 1.0]);
        }
    }

    #[tokio::test]
    async fn test_unreachable_neighbor_does_not_block_others() {
        let net = MemoryNetwork::new();
        let a = memory_node(&net, "node-a", None, None);
        let b = memory_node(&net, "node-b", None, None);
        serve_in_background(&net, &b);
        let ghost = mem_endpoint("ghost");

        let report = a
            .apply_local_update(
                vec![0.9],
                vec![0.8, 1.0],
                &[ghost.clone(), b.node_state().self_endpoint().clone()],
            )
            .await
            .unwrap();

        assert_eq!(report.delivered, vec![b.node_state().self_endpoint().clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].target, ghost);
        assert!(matches!(
            report.failed[0].error,
            TransportError::Unreachable { .. }
        ));
        assert!(eventually(|| b.node_state().current_position() == vec![0.9]).await);
    }

    #[tokio::test]
    async fn test_receiver_rejects_wrong_dimensions() {
        let net = MemoryNetwork::new();
        let a = memory_node(&net, "node-a", None, None);
        let b = memory_node(&net, "node-b", Some(2), Some((vec![0.5, 0.5], vec![])));
        serve_in_background(&net, &b);

        // Delivery succeeds at the transport level; B refuses to apply it.
        let report = a
            .apply_local_update(vec![0.1, 0.2, 0.3], vec![], &[b.node_state().self_endpoint().clone()])
            .await
            .unwrap();
        assert!(report.is_complete());

        let coordinates = a
            .fetch_coordinates(b.node_state().self_endpoint())
            .await
            .unwrap();
        assert_eq!(coordinates, Coordinates::new(vec![0.5, 0.5], vec![]));
    }

    #[tokio::test]
    async fn test_invalid_local_update_is_not_propagated() {
        let net = MemoryNetwork::new();
        let a = memory_node(&net, "node-a", None, None);
        let b = memory_node(&net, "node-b", None, None);
        serve_in_background(&net, &b);

        let result = a
            .apply_local_update(
                vec![f64::NAN],
                vec![],
                &[b.node_state().self_endpoint().clone()],
            )
            .await;

        assert!(matches!(result, Err(OverlayError::NodeState(_))));
        let coordinates = a
            .fetch_coordinates(b.node_state().self_endpoint())
            .await
            .unwrap();
        assert!(coordinates.position.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_from_missing_peer_fails() {
        let net = MemoryNetwork::new();
        let a = memory_node(&net, "node-a", None, None);

        let result = a.fetch_coordinates(&mem_endpoint("nobody")).await;

        assert!(matches!(
            result,
            Err(CallError::Transport(TransportError::Unreachable { .. }))
        ));
    }
}
