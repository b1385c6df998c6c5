use super::framing::{encode_frame, read_frame};
use super::{with_read_timeout, CloseSignal};
use crate::domain::{TransportConfig, TransportError};
use crate::ports::{Connection, Connector, Listener};
use async_trait::async_trait;
use shared_types::{Endpoint, Message};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, trace};

/// Scheme served by the TCP adapter.
pub const TCP_SCHEME: &str = "tcp";

// ============================================================================
// TcpConnection
// ============================================================================

/// Framed message connection over a TCP stream.
///
/// The read and write halves are locked independently: a serving task can
/// block in `receive` while replies or outbound requests go through `send`.
pub struct TcpConnection {
    peer: Endpoint,
    reader: tokio::sync::Mutex<OwnedReadHalf>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    closed: CloseSignal,
    config: TransportConfig,
}

impl TcpConnection {
    /// Wrap an established stream.
    pub fn new(stream: TcpStream, peer: Endpoint, config: TransportConfig) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
        }
        let (reader, writer) = stream.into_split();
        Self {
            peer,
            reader: tokio::sync::Mutex::new(reader),
            writer: tokio::sync::Mutex::new(writer),
            closed: CloseSignal::new(),
            config,
        }
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await.map_err(TransportError::from_io)?;
        writer.flush().await.map_err(TransportError::from_io)
    }

    async fn receive_inner(&self) -> Result<Message, TransportError> {
        let mut reader = self.reader.lock().await;
        tokio::select! {
            biased;
            () = self.closed.closed() => Err(TransportError::ConnectionClosed),
            frame = read_frame(&mut *reader, self.config.max_frame_size) => frame,
        }
    }
}

#[async_trait]
impl Connection for TcpConnection {
    fn peer(&self) -> &Endpoint {
        &self.peer
    }

    async fn send(&self, message: Message) -> Result<(), TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        let frame = encode_frame(&message, self.config.max_frame_size)?;
        trace!(peer = %self.peer, kind = message.kind(), bytes = frame.len(), "Sending frame");
        tokio::select! {
            biased;
            () = self.closed.closed() => Err(TransportError::ConnectionClosed),
            written = self.write_frame(&frame) => written,
        }
    }

    async fn receive(&self) -> Result<Message, TransportError> {
        if self.closed.is_closed() {
            return Err(TransportError::ConnectionClosed);
        }
        let result = with_read_timeout(self.config.read_timeout, self.receive_inner()).await;
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
        // Pending sends observe the signal and release the writer lock.
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            // The peer may already be gone; the socket is released either way.
            debug!(peer = %self.peer, error = %e, "TCP shutdown failed");
        }
        debug!(peer = %self.peer, "TCP connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.is_closed()
    }
}

// ============================================================================
// TcpConnector
// ============================================================================

/// Opens `tcp://host:port` connections.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    config: TransportConfig,
}

impl TcpConnector {
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn Connection>, TransportError> {
        if endpoint.scheme() != TCP_SCHEME {
            return Err(TransportError::UnsupportedScheme(endpoint.scheme().to_string()));
        }
        let unreachable = |reason: String| TransportError::Unreachable {
            endpoint: endpoint.to_string(),
            reason,
        };
        let authority = endpoint
            .authority()
            .ok_or_else(|| unreachable("endpoint has no port".to_string()))?;

        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(&authority))
            .await
            .map_err(|_| unreachable(format!("connect timed out after {:?}", self.config.connect_timeout)))?
            .map_err(|e| unreachable(e.to_string()))?;

        debug!(peer = %endpoint, "TCP connection established");
        Ok(Box::new(TcpConnection::new(
            stream,
            endpoint.clone(),
            self.config.clone(),
        )))
    }
}

// ============================================================================
// TcpListenerAdapter
// ============================================================================

/// Accepts framed TCP connections.
pub struct TcpListenerAdapter {
    listener: TcpListener,
    endpoint: Endpoint,
    config: TransportConfig,
}

impl TcpListenerAdapter {
    /// Bind to a local address (e.g. `"127.0.0.1:0"`).
    ///
    /// # Errors
    ///
    /// Returns `Io` if the bind fails.
    pub async fn bind(addr: &str, config: TransportConfig) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        let endpoint =
            Endpoint::tcp(local).map_err(|e| TransportError::Malformed(e.to_string()))?;
        debug!(endpoint = %endpoint, "TCP listener bound");
        Ok(Self {
            listener,
            endpoint,
            config,
        })
    }

    /// The bound socket address.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }
}

#[async_trait]
impl Listener for TcpListenerAdapter {
    fn local_endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn accept(&self) -> Result<Box<dyn Connection>, TransportError> {
        let (stream, remote) = self.listener.accept().await?;
        let peer = Endpoint::tcp(remote).map_err(|e| TransportError::Malformed(e.to_string()))?;
        debug!(peer = %peer, "Accepted TCP connection");
        Ok(Box::new(TcpConnection::new(stream, peer, self.config.clone())))
    }
}
