//! # Test Harness
//!
//! Builds overlay nodes on an in-memory network and serves them in the
//! background, the way the runtime does over TCP.

use std::sync::Arc;
use std::time::Duration;

use hc_01_transport::{memory_pair, Listener, MemoryConnection, MemoryNetwork, TransportConfig};
use hc_03_hypercube_overlay::{HypercubeOverlay, NodeState, NodeStateReader};
use shared_types::Endpoint;

/// `mem://<name>`.
pub fn mem_endpoint(name: &str) -> Endpoint {
    Endpoint::parse(&format!("mem://{name}")).unwrap()
}

/// Overlay node named `name`, optionally seeded with coordinates.
pub fn memory_node(
    net: &MemoryNetwork,
    name: &str,
    dimensions: Option<usize>,
    seed: Option<(Vec<f64>, Vec<f64>)>,
) -> HypercubeOverlay {
    let mut node = NodeState::new(mem_endpoint(name));
    if let Some(dimensions) = dimensions {
        node = node.with_dimensions(dimensions);
    }
    if let Some((position, cover_map)) = seed {
        node = node.with_coordinates(position, cover_map).unwrap();
    }
    HypercubeOverlay::new(Arc::new(node), Arc::new(net.clone())).unwrap()
}

/// Bind `overlay` on `net` and serve every accepted connection in its own
/// task.
pub fn serve_in_background(net: &MemoryNetwork, overlay: &HypercubeOverlay) {
    let listener = net
        .bind(overlay.node_state().self_endpoint().clone())
        .unwrap();
    let overlay = overlay.clone();
    tokio::spawn(async move {
        while let Ok(connection) = listener.accept().await {
            let overlay = overlay.clone();
            tokio::spawn(async move { overlay.serve(connection.as_ref()).await });
        }
    });
}

/// A connected (remote, local) pair for driving one node by hand.
pub fn wire(remote: &str, local: &str) -> (MemoryConnection, MemoryConnection) {
    memory_pair(
        mem_endpoint(remote),
        mem_endpoint(local),
        &TransportConfig::default(),
    )
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
