//! # Concurrent Updates
//!
//! Updates arriving on different connections at overlapping times must leave
//! Node State equal to exactly one of the submitted pairs.

#[cfg(test)]
mod tests {
    use crate::support::{memory_node, wire};
    use hc_01_transport::{Connection, MemoryNetwork};
    use hc_02_service_dispatch::notify;
    use hc_03_hypercube_overlay::{
        Coordinates, NodeStateReader, SetPositionAndCoverMapRequest, SET_POSITION_AND_COVER_MAP,
    };
    use rand::Rng;
    use shared_types::Request;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn random_pair(rng: &mut impl Rng, dimensions: usize) -> Coordinates {
        let position: Vec<f64> = (0..dimensions).map(|_| rng.gen_range(0.0..1.0)).collect();
        // Cover map derived from the position so a torn pair is detectable.
        let cover_map = position.iter().flat_map(|x| [x / 2.0, x * 2.0]).collect();
        Coordinates::new(position, cover_map)
    }

    fn is_consistent(coords: &Coordinates) -> bool {
        let expected: Vec<f64> = coords
            .position
            .iter()
            .flat_map(|x| [x / 2.0, x * 2.0])
            .collect();
        coords.cover_map == expected
    }

    fn request(coords: &Coordinates) -> Request {
        Request::with_payload(
            SET_POSITION_AND_COVER_MAP,
            &SetPositionAndCoverMapRequest {
                position_vector: coords.position.clone(),
                cover_map_vector: coords.cover_map.clone(),
            },
        )
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_connections_last_writer_wins_whole_pair() {
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let node = memory_node(&MemoryNetwork::new(), "node-a", Some(3), None);
            let first = random_pair(&mut rng, 3);
            let second = random_pair(&mut rng, 3);

            let (b_side, a_side_1) = wire("node-b", "node-a");
            let (c_side, a_side_2) = wire("node-c", "node-a");

            let serve_1 = {
                let node = node.clone();
                tokio::spawn(async move { node.serve(&a_side_1).await })
            };
            let serve_2 = {
                let node = node.clone();
                tokio::spawn(async move { node.serve(&a_side_2).await })
            };

            let (sent_1, sent_2) = tokio::join!(
                async {
                    notify(&b_side, request(&first)).await?;
                    b_side.close().await
                },
                async {
                    notify(&c_side, request(&second)).await?;
                    c_side.close().await
                },
            );
            sent_1.unwrap();
            sent_2.unwrap();
            serve_1.await.unwrap();
            serve_2.await.unwrap();

            let state = node.node_state().snapshot();
            assert!(
                state == first || state == second,
                "state {state:?} matches neither submitted pair"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_torn_pairs() {
        let node = memory_node(&MemoryNetwork::new(), "node-a", Some(4), None);
        let stop = Arc::new(AtomicBool::new(false));

        let reader = {
            let state = Arc::clone(node.node_state());
            let stop = Arc::clone(&stop);
            tokio::task::spawn_blocking(move || {
                let mut observed = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    let snapshot = state.snapshot();
                    assert!(is_consistent(&snapshot), "torn read: {snapshot:?}");
                    observed += 1;
                }
                observed
            })
        };

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let node = node.clone();
                tokio::spawn(async move {
                    let (remote, local) = wire(&format!("writer-{i}"), "node-a");
                    let server = {
                        let node = node.clone();
                        tokio::spawn(async move { node.serve(&local).await })
                    };
                    let updates: Vec<_> = {
                        let mut rng = rand::thread_rng();
                        (0..100).map(|_| random_pair(&mut rng, 4)).collect()
                    };
                    for update in &updates {
                        notify(&remote, request(update)).await.unwrap();
                    }
                    remote.close().await.unwrap();
                    server.await.unwrap()
                })
            })
            .collect();

        for writer in writers {
            let summary = writer.await.unwrap();
            assert_eq!(summary.requests, 100);
            assert_eq!(summary.failures, 0);
        }
        stop.store(true, Ordering::Relaxed);

        assert!(reader.await.unwrap() > 0);
        assert!(is_consistent(&node.node_state().snapshot()));
    }
}
