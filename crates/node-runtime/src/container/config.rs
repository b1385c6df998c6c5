//! # Node Configuration
//!
//! Loaded from a TOML file, then adjusted by environment overrides.
//!
//! ## Config File Format
//!
//! ```toml
//! [network]
//! listen_addr = "127.0.0.1:7400"
//! advertised_endpoint = "tcp://127.0.0.1:7400"
//! read_timeout_secs = 30
//! connect_timeout_secs = 10
//! max_frame_bytes = 1048576
//!
//! [overlay]
//! dimensions = 2
//! initial_position = [0.5, 0.5]
//! initial_cover_map = [0.0, 1.0, 0.0, 1.0]
//! neighbors = ["tcp://127.0.0.1:7401"]
//! announce_on_start = true
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable               | Field                        |
//! |------------------------|------------------------------|
//! | `HC_LISTEN_ADDR`       | `network.listen_addr`        |
//! | `HC_READ_TIMEOUT_SECS` | `network.read_timeout_secs`  |

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use hc_01_transport::{TransportConfig, DEFAULT_MAX_FRAME_SIZE};
use hc_03_hypercube_overlay::Coordinates;
use serde::Deserialize;
use shared_types::Endpoint;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "HC_CONFIG";
/// Overrides `network.listen_addr`.
pub const LISTEN_ADDR_ENV: &str = "HC_LISTEN_ADDR";
/// Overrides `network.read_timeout_secs`.
pub const READ_TIMEOUT_ENV: &str = "HC_READ_TIMEOUT_SECS";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Listener and transport settings.
    pub network: NetworkConfig,
    /// Initial coordinates and neighbors.
    pub overlay: OverlayConfig,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// TCP address to accept peers on.
    pub listen_addr: String,
    /// Endpoint peers should use to reach this node. Derived from
    /// `listen_addr` when unset.
    pub advertised_endpoint: Option<String>,
    /// Per-connection idle limit. Unset means wait indefinitely.
    pub read_timeout_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub max_frame_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7400".to_string(),
            advertised_endpoint: None,
            read_timeout_secs: None,
            connect_timeout_secs: 10,
            max_frame_bytes: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Required position length, if fixed.
    pub dimensions: Option<usize>,
    pub initial_position: Vec<f64>,
    pub initial_cover_map: Vec<f64>,
    /// Peers that `announce_on_start` assigns the initial pair to.
    pub neighbors: Vec<String>,
    /// On start, make every neighbor adopt this node's initial pair as its
    /// own coordinates.
    pub announce_on_start: bool,
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value parsed but is not usable.
    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the effective configuration: file (when given and present),
    /// then environment overrides, then validation.
    pub fn from_sources(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(path)?
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(LISTEN_ADDR_ENV) {
            info!("Listen address overridden by {}", LISTEN_ADDR_ENV);
            self.network.listen_addr = addr;
        }

        if let Some(secs) = lookup(READ_TIMEOUT_ENV) {
            let secs = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "read_timeout_secs",
                reason: format!("{READ_TIMEOUT_ENV} is not a number of seconds: {secs:?}"),
            })?;
            self.network.read_timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Check that every value is usable before the node starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        self.self_endpoint()?;
        self.neighbor_endpoints()?;

        if self.network.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.network.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_frame_bytes",
                reason: "must be greater than zero".into(),
            });
        }

        let initial = self.initial_coordinates();
        // No initial coordinates means "not placed yet".
        let dimensions = if initial.position.is_empty() && initial.cover_map.is_empty() {
            None
        } else {
            self.overlay.dimensions
        };
        initial
            .validate(dimensions)
            .map_err(|e| ConfigError::InvalidValue {
                field: "initial_position",
                reason: e.to_string(),
            })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.network
            .listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "listen_addr",
                reason: e.to_string(),
            })
    }

    /// The endpoint this node advertises, `tcp://<listen_addr>` by default.
    pub fn self_endpoint(&self) -> Result<Endpoint, ConfigError> {
        let address = match &self.network.advertised_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("tcp://{}", self.network.listen_addr),
        };
        Endpoint::parse(&address).map_err(|e| ConfigError::InvalidValue {
            field: "advertised_endpoint",
            reason: e.to_string(),
        })
    }

    pub fn neighbor_endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        self.overlay
            .neighbors
            .iter()
            .map(|neighbor| {
                Endpoint::parse(neighbor).map_err(|e| ConfigError::InvalidValue {
                    field: "neighbors",
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    #[must_use]
    pub fn initial_coordinates(&self) -> Coordinates {
        Coordinates::new(
            self.overlay.initial_position.clone(),
            self.overlay.initial_cover_map.clone(),
        )
    }

    /// Transport settings derived from `[network]`.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            read_timeout: self.network.read_timeout_secs.map(Duration::from_secs),
            connect_timeout: Duration::from_secs(self.network.connect_timeout_secs),
            max_frame_size: self.network.max_frame_bytes,
            ..TransportConfig::default()
        }
    }
}
