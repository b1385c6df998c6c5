//! # Connection Serving Loop
//!
//! Reads requests off one connection and dispatches them in arrival order
//! until the connection ends. Per-request failures are logged and counted;
//! only transport failures end the loop.

use hc_01_transport::{Connection, TransportError};
use shared_types::Message;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::domain::{CloseReason, ConnectionSummary, DispatchError, DispatchOutcome};

/// Serve `connection` until the peer disconnects, the read times out or the
/// transport fails. The connection is closed on every exit path.
pub async fn serve_connection(
    dispatcher: &Dispatcher,
    connection: &dyn Connection,
) -> ConnectionSummary {
    let mut summary = ConnectionSummary::new(connection.peer().clone());
    debug!(peer = %summary.peer, "[Serve] Connection opened");

    loop {
        let message = match connection.receive().await {
            Ok(message) => message,
            Err(TransportError::Disconnected) => {
                summary.close_reason = CloseReason::PeerDisconnected;
                break;
            }
            Err(TransportError::ConnectionClosed) => {
                warn!(peer = %summary.peer, "[Serve] Connection closed locally while being served");
                summary.close_reason = CloseReason::LocallyClosed;
                break;
            }
            Err(TransportError::Timeout(limit)) => {
                debug!(peer = %summary.peer, timeout = ?limit, "[Serve] Read timed out");
                summary.close_reason = CloseReason::Timeout;
                break;
            }
            Err(e) => {
                warn!(peer = %summary.peer, error = %e, "[Serve] Receive failed");
                summary.close_reason = CloseReason::TransportFailure(e.to_string());
                break;
            }
        };

        let request = match message {
            Message::Request(request) => request,
            Message::Response(_) => {
                warn!(peer = %summary.peer, "[Serve] Ignoring unsolicited response");
                continue;
            }
        };

        summary.requests += 1;
        match dispatcher.dispatch(request, connection).await {
            Ok(DispatchOutcome::Responded) => summary.responses += 1,
            Ok(DispatchOutcome::NoResponse) => {}
            Err(DispatchError::Transport(e)) => {
                summary.failures += 1;
                warn!(peer = %summary.peer, error = %e, "[Serve] Reply failed, dropping connection");
                summary.close_reason = CloseReason::TransportFailure(e.to_string());
                break;
            }
            Err(e) => {
                summary.failures += 1;
                debug!(peer = %summary.peer, error = %e, "[Serve] Request failed");
            }
        }
    }

    if let Err(e) = connection.close().await {
        debug!(peer = %summary.peer, error = %e, "[Serve] Close failed");
    }

    info!(
        peer = %summary.peer,
        requests = summary.requests,
        responses = summary.responses,
        failures = summary.failures,
        reason = %summary.close_reason,
        "[Serve] Connection finished"
    );
    summary
}
