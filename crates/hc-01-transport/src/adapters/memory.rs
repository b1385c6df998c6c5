use super::{with_read_timeout, CloseSignal};
use crate::domain::{TransportConfig, TransportError};
use crate::ports::{Connection, Connector, Listener};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Endpoint, Message};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Scheme served by the in-memory adapter.
pub const MEMORY_SCHEME: &str = "mem";

// ============================================================================
// MemoryConnection
// ============================================================================

/// One half of an in-process connection.
///
/// Each direction is a bounded channel, so `send` waits when the peer falls
/// `channel_capacity` messages behind. Closing drops the outbound sender and
/// closes the inbound receiver: the peer drains what was already queued,
/// then sees `Disconnected` on both `receive` and `send`.
pub struct MemoryConnection {
    local: Endpoint,
    peer: Endpoint,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    inbound: tokio::sync::Mutex<mpsc::Receiver<Message>>,
    closed: CloseSignal,
    read_timeout: Option<Duration>,
}

impl MemoryConnection {
    /// The endpoint this half speaks for.
    #[must_use]
    pub fn local(&self) -> &Endpoint {
        &self.local
    }

    fn sender(&self) -> Result<mpsc::Sender<Message>, TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        self.outbound
            .lock()
            .clone()
            .ok_or(TransportError::ConnectionClosed)
    }

    async fn receive_inner(&self) -> Result<Message, TransportError> {
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            biased;
            () = self.closed.closed() => Err(TransportError::ConnectionClosed),
            message = inbound.recv() => message.ok_or(TransportError::Disconnected),
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn peer(&self) -> &Endpoint {
        &self.peer
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        let sender = self.sender()?;
        tokio::select! {
            biased;
            () = self.closed.closed() => Err(TransportError::ConnectionClosed),
            sent = sender.send(message) => sent.map_err(|_| TransportError::Disconnected),
        }
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        let result = with_read_timeout(self.read_timeout, self.receive_inner()).await;
        if let Err(TransportError::Timeout(limit)) = &result {
            debug!(peer = %self.peer, timeout = ?limit, "Read timeout, closing connection");
            self.close().await?;
        }
        result
    }

    async fn close(&self) -> Result<(), TransportError> {
        if !self.closed.close() {
            return Ok(());
        }
        self.outbound.lock().take();
        // A pending receive observes the signal and releases the lock.
        self.inbound.lock().await.close();
        debug!(local = %self.local, peer = %self.peer, "Memory connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }
}

/// Two directly connected halves: `(half at a, half at b)`.
#[must_use]
pub fn memory_pair(
    a: Endpoint,
    b: Endpoint,
    config: &TransportConfig,
) -> (MemoryConnection, MemoryConnection) {
    let capacity = config.channel_capacity.max(1);
    let (a_to_b, b_from_a) = mpsc::channel(capacity);
    let (b_to_a, a_from_b) = mpsc::channel(capacity);

    let left = MemoryConnection {
        local: a.clone(),
        peer: b.clone(),
        outbound: Mutex::new(Some(a_to_b)),
        inbound: tokio::sync::Mutex::new(a_from_b),
        closed: CloseSignal::new(),
        read_timeout: config.read_timeout,
    };
    let right = MemoryConnection {
        local: b,
        peer: a,
        outbound: Mutex::new(Some(b_to_a)),
        inbound: tokio::sync::Mutex::new(b_from_a),
        closed: CloseSignal::new(),
        read_timeout: config.read_timeout,
    };
    (left, right)
}

// ============================================================================
// MemoryNetwork - in-process listener registry
// ============================================================================

type Registry = Arc<Mutex<HashMap<Endpoint, mpsc::Sender<MemoryConnection>>>>;

/// In-process network of `mem://` listeners.
///
/// Cloning shares the same registry, so one network can be handed to every
/// simulated node.
#[derive(Clone)]
pub struct MemoryNetwork {
    listeners: Registry,
    config: TransportConfig,
    next_client: Arc<AtomicU64>,
}

impl MemoryNetwork {
    /// Create an empty network with default transport settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create an empty network.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
            config,
            next_client: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start listening on `endpoint`.
    ///
    /// # Errors
    ///
    /// `UnsupportedScheme` for non-`mem` endpoints, `AddressInUse` if a live
    /// listener already holds the endpoint.
    pub fn bind(&self, endpoint: Endpoint) -> Result<MemoryListener, TransportError> {
        if endpoint.scheme() != MEMORY_SCHEME {
            return Err(TransportError::UnsupportedScheme(endpoint.scheme().to_string()));
        }
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        {
            let mut listeners = self.listeners.lock();
            if listeners.get(&endpoint).is_some_and(|l| !l.is_closed()) {
                return Err(TransportError::AddressInUse(endpoint.to_string()));
            }
            listeners.insert(endpoint.clone(), tx);
        }
        debug!(endpoint = %endpoint, "Memory listener bound");
        Ok(MemoryListener {
            endpoint,
            incoming: tokio::sync::Mutex::new(rx),
            listeners: Arc::clone(&self.listeners),
        })
    }

    /// Whether a live listener holds `endpoint`.
    #[must_use]
    pub fn is_bound(&self, endpoint: &Endpoint) -> bool {
        self.listeners
            .lock()
            .get(endpoint)
            .is_some_and(|l| !l.is_closed())
    }

    fn client_endpoint(&self) -> Result<Endpoint, TransportError> {
        let id = self.next_client.fetch_add(1, Ordering::Relaxed);
        Endpoint::parse(&format!("{MEMORY_SCHEME}://client-{id}"))
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MemoryNetwork {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>, TransportError> {
        if endpoint.scheme() != MEMORY_SCHEME {
            return Err(TransportError::UnsupportedScheme(endpoint.scheme().to_string()));
        }
        let unreachable = |reason: &str| TransportError::Unreachable {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let acceptor = self
            .listeners
            .lock()
            .get(endpoint)
            .cloned()
            .ok_or_else(|| unreachable("no listener bound"))?;

        let (client, server) = memory_pair(self.client_endpoint()?, endpoint.clone(), &self.config);
        acceptor
            .send(server)
            .await
            .map_err(|_| unreachable("listener closed"))?;
        Ok(Box::new(client))
    }
}

/// Accepts in-process connections for one `mem://` endpoint.
///
/// Dropping the listener unbinds the endpoint.
pub struct MemoryListener {
    endpoint: Endpoint,
    incoming: tokio::sync::Mutex<mpsc::Receiver<MemoryConnection>>,
    listeners: Registry,
}

#[async_trait]
impl Listener for MemoryListener {
    fn local_endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn accept(&self) -> Result<Box<dyn Connection>, TransportError> {
        let connection = self
            .incoming
            .lock()
            .await
            .recv()
            .await
            .ok_or(TransportError::Disconnected)?;
        Ok(Box::new(connection))
    }
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        self.listeners.lock().remove(&self.endpoint);
    }
}
