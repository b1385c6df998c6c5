//! Frame format for stream transports.
//!
//! `[length:4][version:2][body:N]`
//!
//! - **length**: big-endian u32, size of `version + body`
//! - **version**: big-endian u16, [`shared_types::PROTOCOL_VERSION`]
//! - **body**: bincode encoding of the [`Message`]

use crate::domain::TransportError;
use shared_types::{Message, PROTOCOL_VERSION};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Length prefix size in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

const VERSION_SIZE: usize = 2;

/// Encode a message into a complete frame.
pub fn encode_frame(message: &Message, max_frame_size: usize) -> Result<Vec<u8>, TransportError> {
    let body = bincode::serialize(message).map_err(|e| TransportError::Malformed(e.to_string()))?;
    let len = VERSION_SIZE + body.len();
    if len > max_frame_size {
        return Err(TransportError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }
    let len_prefix = u32::try_from(len).map_err(|_| TransportError::FrameTooLarge {
        size: len,
        max: max_frame_size,
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + len);
    frame.extend_from_slice(&len_prefix.to_be_bytes());
    frame.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode the part of a frame that follows the length prefix.
pub fn decode_frame_body(bytes: &[u8]) -> Result<Message, TransportError> {
    if bytes.len() < VERSION_SIZE {
        return Err(TransportError::Malformed(format!(
            "frame of {} bytes has no version",
            bytes.len()
        )));
    }
    let version = u16::from_be_bytes([bytes[0], bytes[1]]);
    if version != PROTOCOL_VERSION {
        return Err(TransportError::Malformed(format!(
            "unsupported protocol version {version} (expected {PROTOCOL_VERSION})"
        )));
    }
    bincode::deserialize(&bytes[VERSION_SIZE..]).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Read one frame from `reader`.
///
/// The announced length is checked against `max_frame_size` before any
/// buffer is allocated.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Message, TransportError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u32().await.map_err(TransportError::from_io)? as usize;
    if len > max_frame_size {
        return Err(TransportError::FrameTooLarge {
            size: len,
            max: max_frame_size,
        });
    }
    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(TransportError::from_io)?;
    decode_frame_body(&body)
}
