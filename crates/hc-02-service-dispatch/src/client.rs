//! Outbound helpers for talking to a remote dispatcher.

use hc_01_transport::{Connection, TransportError};
use serde::de::DeserializeOwned;
use shared_types::{decode, Message, Request};
use tracing::debug;

use crate::domain::CallError;

/// Send a fire-and-forget request. Returns once the message is handed to
/// the transport; nothing is awaited from the peer.
pub async fn notify(
    connection: &dyn Connection,
    mut request: Request,
) -> Result<(), TransportError> {
    request.expects_response = false;
    debug!(service = %request.service, peer = %connection.peer(), "Sending notification");
    connection.send(request.into()).await
}

/// Send a request and wait for its response payload.
///
/// An error response from the peer surfaces as [`CallError::Remote`].
pub async fn call(connection: &dyn Connection, mut request: Request) -> Result<Vec<u8>, CallError> {
    request.expects_response = true;
    debug!(service = %request.service, peer = %connection.peer(), "Sending call");
    connection.send(request.into()).await?;

    match connection.receive().await? {
        Message::Response(response) => response.result.map_err(CallError::Remote),
        other => Err(CallError::UnexpectedMessage(other.kind())),
    }
}

/// [`call`], decoding the response payload as `T`.
pub async fn call_as<T: DeserializeOwned>(
    connection: &dyn Connection,
    request: Request,
) -> Result<T, CallError> {
    let payload = call(connection, request).await?;
    Ok(decode(&payload)?)
}
