//! # Node Runtime
//!
//! Owns the overlay, the TCP accept loop and the shutdown signal.
//!
//! ## Startup Sequence
//!
//! 1. Build Node State from the configured initial coordinates
//! 2. Register the hypercube services on a fresh dispatcher
//! 3. Bind the TCP listener and spawn the accept loop
//! 4. Assign the initial coordinates to neighbors (if enabled)
//!
//! Every accepted connection gets its own task running the serving loop.
//! Those tasks watch the same shutdown signal as the accept loop, and
//! [`NodeRuntime::shutdown`] returns only after all of them have closed
//! their connections.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hc_01_transport::{Listener, TcpConnector, TcpListenerAdapter, TransportError};
use hc_02_service_dispatch::RegistrationError;
use hc_03_hypercube_overlay::{HypercubeOverlay, NodeState, NodeStateError, NodeStateReader};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::container::{ConfigError, NodeConfig};

/// First pause after a failed accept. Doubles per consecutive failure.
const ACCEPT_BACKOFF_INITIAL: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Errors that stop the node from starting.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid initial coordinates: {0}")]
    NodeState(#[from] NodeStateError),

    #[error("Service registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Node already started")]
    AlreadyStarted,
}

/// The running node.
pub struct NodeRuntime {
    config: NodeConfig,
    overlay: HypercubeOverlay,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    started: AtomicBool,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Wire the subsystems. Nothing is bound until [`NodeRuntime::start`].
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let mut node = NodeState::new(config.self_endpoint()?);
        if let Some(dimensions) = config.overlay.dimensions {
            node = node.with_dimensions(dimensions);
        }
        let initial = config.initial_coordinates();
        if !initial.position.is_empty() || !initial.cover_map.is_empty() {
            node = node.with_coordinates(initial.position, initial.cover_map)?;
        }

        let connector = Arc::new(TcpConnector::new(config.transport_config()));
        let overlay = HypercubeOverlay::new(Arc::new(node), connector)?;
        let (shutdown_tx, _) = watch::channel(false);

        info!(
            node = %overlay.node_state().self_endpoint(),
            services = ?overlay.dispatcher().registered_services(),
            "Node runtime created"
        );

        Ok(Self {
            config,
            overlay,
            shutdown_tx,
            started: AtomicBool::new(false),
            accept_task: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn overlay(&self) -> &HypercubeOverlay {
        &self.overlay
    }

    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Bind the listener, start accepting peers and announce to neighbors.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// the configured port is 0.
    pub async fn start(&self) -> Result<SocketAddr, RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let bound = async {
            let listener = TcpListenerAdapter::bind(
                &self.config.network.listen_addr,
                self.config.transport_config(),
            )
            .await?;
            let local_addr = listener.local_addr()?;
            Ok::<_, TransportError>((listener, local_addr))
        }
        .await;
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                self.started.store(false, Ordering::Release);
                return Err(e.into());
            }
        };
        self.overlay.dispatcher().start_serving();

        let task = tokio::spawn(accept_loop(
            listener,
            self.overlay.clone(),
            self.shutdown_tx.subscribe(),
        ));
        *self.accept_task.lock() = Some(task);

        info!(
            listen = %local_addr,
            node = %self.overlay.node_state().self_endpoint(),
            "Node is accepting peers"
        );

        if self.config.overlay.announce_on_start {
            self.announce().await?;
        }

        Ok(local_addr)
    }

    /// Assign this node's current pair to the configured neighbors.
    ///
    /// Each neighbor replaces its own coordinates with the pair, so this is
    /// meant for seeding peers that should take over this node's region.
    async fn announce(&self) -> Result<(), RuntimeError> {
        let neighbors = self.config.neighbor_endpoints()?;
        if neighbors.is_empty() {
            debug!("No neighbors configured, skipping announcement");
            return Ok(());
        }

        match self.overlay.announce(&neighbors).await {
            Ok(report) => {
                for failure in &report.failed {
                    warn!(
                        neighbor = %failure.target,
                        error = %failure.error,
                        "Neighbor did not receive initial coordinates"
                    );
                }
                info!(
                    delivered = report.delivered.len(),
                    failed = report.failed.len(),
                    "Initial coordinates announced"
                );
            }
            Err(e) => error!(error = %e, "Failed to announce initial coordinates"),
        }
        Ok(())
    }

    /// Stop accepting peers, close every connection being served and wait
    /// for all serving tasks to exit.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);

        let task = self.accept_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(error = %e, "Accept loop ended abnormally");
            }
        }
        info!("Shutdown complete");
    }
}

async fn accept_loop(
    listener: TcpListenerAdapter,
    overlay: HypercubeOverlay,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut connections = JoinSet::new();
    let mut backoff = ACCEPT_BACKOFF_INITIAL;

    loop {
        let accepted = tokio::select! {
            biased;
            _ = shutdown.wait_for(|stop| *stop) => break,
            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    error!(error = %e, "Serving task ended abnormally");
                }
                continue;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok(connection) => {
                backoff = ACCEPT_BACKOFF_INITIAL;
                let overlay = overlay.clone();
                let mut shutdown = shutdown.clone();
                connections.spawn(async move {
                    let interrupted = tokio::select! {
                        biased;
                        _ = shutdown.wait_for(|stop| *stop) => true,
                        _ = overlay.serve(connection.as_ref()) => false,
                    };
                    if interrupted {
                        debug!(peer = %connection.peer(), "Closing connection for shutdown");
                        if let Err(e) = connection.close().await {
                            debug!(error = %e, "Close failed during shutdown");
                        }
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, retry_in = ?backoff, "Accept failed");
                tokio::select! {
                    biased;
                    _ = shutdown.wait_for(|stop| *stop) => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = next_backoff(backoff);
            }
        }
    }

    let open = connections.len();
    while let Some(result) = connections.join_next().await {
        if let Err(e) = result {
            error!(error = %e, "Serving task ended abnormally");
        }
    }
    info!(closed = open, "Accept loop stopped");
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(ACCEPT_BACKOFF_MAX)
}
