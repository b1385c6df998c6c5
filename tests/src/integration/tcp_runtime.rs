//! # TCP Runtime Flows
//!
//! Full nodes from `node-runtime` talking over loopback sockets.

#[cfg(test)]
mod tests {
    use crate::support::eventually;
    use hc_01_transport::{Connection, Connector, TcpConnector, TransportConfig, TransportError};
    use hc_02_service_dispatch::{call_as, notify};
    use hc_03_hypercube_overlay::{
        Coordinates, NodeStateReader, SetPositionAndCoverMapRequest, GET_POSITION_AND_COVER_MAP,
        SET_POSITION_AND_COVER_MAP,
    };
    use node_runtime::{NodeConfig, NodeRuntime};
    use shared_types::{Endpoint, Request};

    fn config(position: Vec<f64>, cover_map: Vec<f64>) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.listen_addr = "127.0.0.1:0".into();
        config.overlay.dimensions = Some(2);
        config.overlay.initial_position = position;
        config.overlay.initial_cover_map = cover_map;
        config
    }

    fn tcp(addr: std::net::SocketAddr) -> Endpoint {
        Endpoint::parse(&format!("tcp://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_update_over_tcp() {
        let node_a = NodeRuntime::new(config(vec![0.5, 0.5], vec![0.0, 1.0, 0.0, 1.0])).unwrap();
        let addr = node_a.start().await.unwrap();

        let connector = TcpConnector::new(TransportConfig::default());
        let connection = connector.connect(&tcp(addr)).await.unwrap();
        let update = Request::with_payload(
            SET_POSITION_AND_COVER_MAP,
            &SetPositionAndCoverMapRequest {
                position_vector: vec![0.25, 0.75],
                cover_map_vector: vec![0.0, 0.5, 0.5, 1.0],
            },
        )
        .unwrap();
        notify(connection.as_ref(), update).await.unwrap();

        // Same connection, so the query is answered after the update applies.
        let coordinates: Coordinates = call_as(
            connection.as_ref(),
            Request::new(GET_POSITION_AND_COVER_MAP, Vec::new()),
        )
        .await
        .unwrap();
        assert_eq!(
            coordinates,
            Coordinates::new(vec![0.25, 0.75], vec![0.0, 0.5, 0.5, 1.0])
        );

        connection.close().await.unwrap();
        connection.close().await.unwrap();
        assert!(matches!(
            connection.receive().await,
            Err(TransportError::ConnectionClosed)
        ));

        node_a.shutdown().await;
    }

    #[tokio::test]
    async fn test_announce_on_start_reaches_neighbor() {
        let node_b = NodeRuntime::new(config(Vec::new(), Vec::new())).unwrap();
        let b_addr = node_b.start().await.unwrap();

        let mut a_config = config(vec![0.1, 0.2], vec![0.0, 0.5, 0.0, 0.5]);
        a_config.overlay.neighbors = vec![tcp(b_addr).to_string()];
        a_config.overlay.announce_on_start = true;
        let node_a = NodeRuntime::new(a_config).unwrap();
        node_a.start().await.unwrap();

        let b_state = node_b.overlay().node_state();
        assert!(eventually(|| b_state.current_position() == vec![0.1, 0.2]).await);
        assert_eq!(b_state.current_cover_map(), vec![0.0, 0.5, 0.0, 0.5]);

        node_a.shutdown().await;
        node_b.shutdown().await;
    }

    #[tokio::test]
    async fn test_announce_to_dead_neighbor_does_not_fail_start() {
        let mut a_config = config(vec![0.1, 0.2], vec![]);
        // Reserved port, nothing listens there.
        a_config.overlay.neighbors = vec!["tcp://127.0.0.1:9".into()];
        a_config.overlay.announce_on_start = true;
        a_config.network.connect_timeout_secs = 1;

        let node_a = NodeRuntime::new(a_config).unwrap();
        assert!(node_a.start().await.is_ok());
        node_a.shutdown().await;
    }

    #[tokio::test]
    async fn test_fetch_between_runtimes() {
        let node_a = NodeRuntime::new(config(vec![0.5, 0.5], vec![0.0, 1.0])).unwrap();
        let node_b = NodeRuntime::new(config(Vec::new(), Vec::new())).unwrap();
        let a_addr = node_a.start().await.unwrap();
        node_b.start().await.unwrap();

        let coordinates = node_b
            .overlay()
            .fetch_coordinates(&tcp(a_addr))
            .await
            .unwrap();
        assert_eq!(coordinates, Coordinates::new(vec![0.5, 0.5], vec![0.0, 1.0]));

        node_a.shutdown().await;
        node_b.shutdown().await;
    }
}
