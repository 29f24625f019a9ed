//! A single-shot Minecraft Server List Ping query: connect, handshake,
//! status request, read, decode. One query owns exactly one TCP connection
//! for its whole lifetime and always closes it, success or failure.

use std::time::Duration;

use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};

use crate::{
    codec::{self, frame},
    protocol::{self, StatusResponse},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// All the ways a query can fail. Callers typically only care whether a
/// query succeeded; the variant is kept around for diagnostics and logs.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("connection refused")]
    ConnectRefused,
    #[error("timed out connecting")]
    ConnectTimeout,
    #[error("timed out reading response")]
    ReadTimeout,
    #[error("connection closed mid-frame")]
    EofDuringFrame,
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] codec::MalformedFrame),
    #[error("server replied with unexpected packet id {0}")]
    ProtocolViolation(i32),
    #[error("invalid status json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Performs one SLP status query against `host:port`.
pub async fn query(
    host: &str,
    port: u16,
    protocol_version: i32,
    query_timeout: Duration,
) -> Result<StatusResponse, Failure> {
    let mut stream = timeout(query_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| Failure::ConnectTimeout)?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                Failure::ConnectRefused
            } else {
                Failure::Io(e)
            }
        })?;

    timeout(query_timeout, query_inner(&mut stream, host, port, protocol_version))
        .await
        .map_err(|_| Failure::ReadTimeout)?
}

async fn query_inner(
    stream: &mut TcpStream,
    host: &str,
    port: u16,
    protocol_version: i32,
) -> Result<StatusResponse, Failure> {
    let handshake = protocol::encode_handshake(
        protocol_version,
        host,
        port,
        protocol::NEXT_STATE_STATUS,
    );
    stream.write_all(&frame(&handshake)).await?;

    let status_request = protocol::encode_status_request();
    stream.write_all(&frame(&status_request)).await?;
    stream.flush().await?;

    let declared_len = codec::read_varint(stream).await?;
    if declared_len < 0 {
        return Err(Failure::MalformedFrame(codec::MalformedFrame::NegativeLength(
            declared_len,
        )));
    }

    let mut body = vec![0u8; declared_len as usize];
    match stream.read_exact(&mut body).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(Failure::EofDuringFrame);
        }
        Err(e) => return Err(Failure::Io(e)),
    }

    let (packet_id, id_len) = codec::decode_varint(&body)?;
    if packet_id != 0x00 {
        return Err(Failure::ProtocolViolation(packet_id));
    }

    let (str_len, str_len_bytes) = codec::decode_varint(&body[id_len..])?;
    if str_len < 0 || str_len > codec::MAX_STRING_LEN {
        return Err(Failure::MalformedFrame(codec::MalformedFrame::StringTooLong(
            str_len,
        )));
    }

    let json_start = id_len + str_len_bytes;
    let json_end = json_start + str_len as usize;
    let json_bytes = body
        .get(json_start..json_end)
        .ok_or(Failure::EofDuringFrame)?;

    let json_str = std::str::from_utf8(json_bytes)
        .map_err(|_| Failure::MalformedFrame(codec::MalformedFrame::InvalidUtf8))?;

    let status: StatusResponse = serde_json::from_str(json_str)?;
    Ok(status)
}
