//! # Hypercube Overlay Node
//!
//! Runs one overlay node over TCP.
//!
//! ## Usage
//!
//! ```text
//! node-runtime [CONFIG_PATH]
//! ```
//!
//! The config path may also come from `HC_CONFIG`. Log verbosity follows
//! `RUST_LOG` (default `info`).
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration (file, then environment overrides)
//! 3. Wire Node State, dispatcher and overlay
//! 4. Accept peers until Ctrl+C

use std::path::PathBuf;

use anyhow::{Context, Result};
use node_runtime::container::config::CONFIG_PATH_ENV;
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = NodeConfig::from_sources(config_path().as_deref())
        .context("Failed to load node configuration")?;

    let runtime = NodeRuntime::new(config).context("Failed to wire node subsystems")?;
    let addr = runtime.start().await.context("Failed to start node")?;

    info!("===========================================");
    info!("  Hypercube Overlay Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Listening on {}", addr);
    info!("===========================================");

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    // Graceful shutdown
    runtime.shutdown().await;

    Ok(())
}
