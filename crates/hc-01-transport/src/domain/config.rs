use std::time::Duration;

/// Default maximum frame size (1 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Default per-direction channel capacity for in-memory connections.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Transport tunables shared by every adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound on a single `receive`. `None` waits forever.
    pub read_timeout: Option<Duration>,
    /// Upper bound on establishing an outbound connection.
    pub connect_timeout: Duration,
    /// Largest accepted encoded message.
    pub max_frame_size: usize,
    /// Buffered messages per direction before `send` waits (in-memory only).
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            connect_timeout: Duration::from_secs(10),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl TransportConfig {
    /// Set the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the maximum frame size.
    #[must_use]
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }
}
