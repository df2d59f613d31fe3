//! Primary/replica handshake and the replica-side apply loop.
//!
//! The handshake is fixed: PING, REPLCONF listening-port, REPLCONF capa
//! psync2, then PSYNC ? -1. The primary answers PSYNC with a FULLRESYNC line
//! and a snapshot framed as `$<len>\r\n<bytes>` with no trailing CRLF. After
//! the snapshot, every frame the primary sends is a command to apply locally.

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::commands::{Dispatcher, Session};
use crate::resp::{RespError, RespValue};

/// Hex dump of an empty RDB snapshot, served to every replica after
/// FULLRESYNC. The keyspace starts empty, so there is nothing else to ship.
const EMPTY_SNAPSHOT_HEX: &str = "524544495330303131fa0972656469732d76657205372e322e30fa0a7265\
6469732d62697473c040fa056374696d65c26d08bc65fa08757365642d6d656dc2b0c41000fa08616f662d62617365c0\
00fff06e3bfec0ff5aa2";

pub fn empty_snapshot() -> Vec<u8> {
    hex::decode(EMPTY_SNAPSHOT_HEX).expect("snapshot hex is well-formed")
}

#[derive(Error, Debug)]
pub enum ReplicationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed by primary")]
    ConnectionClosed,
    #[error(transparent)]
    Protocol(#[from] RespError),
    #[error("unexpected response from primary")]
    UnexpectedResponse,
}

/// Writes the FULLRESYNC reply followed by the snapshot payload.
pub async fn send_full_resync<W>(writer: &mut W, reply: &str) -> tokio::io::Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    let snapshot = empty_snapshot();

    writer.write_all(reply.as_bytes()).await?;
    writer
        .write_all(format!("${}\r\n", snapshot.len()).as_bytes())
        .await?;
    writer.write_all(&snapshot).await?;
    writer.flush().await
}

/// Connects to the primary, runs the handshake, then applies the replayed
/// command stream to the local keyspace under the replication session (which
/// produces no wire responses).
pub async fn run_replica(
    host: &str,
    port: u16,
    listening_port: u16,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), ReplicationError> {
    let mut stream = TcpStream::connect((host, port)).await?;
    let mut buffer = BytesMut::with_capacity(4096);

    let reply = roundtrip(&mut stream, &mut buffer, &["PING"]).await?;
    expect_simple(&reply, "PONG")?;

    let reply = roundtrip(
        &mut stream,
        &mut buffer,
        &["REPLCONF", "listening-port", &listening_port.to_string()],
    )
    .await?;
    expect_simple(&reply, "OK")?;

    let reply = roundtrip(&mut stream, &mut buffer, &["REPLCONF", "capa", "psync2"]).await?;
    expect_simple(&reply, "OK")?;

    let reply = roundtrip(&mut stream, &mut buffer, &["PSYNC", "?", "-1"]).await?;
    validate_full_resync(&reply)?;

    read_snapshot(&mut stream, &mut buffer).await?;
    info!(%host, port, "handshake complete, applying primary stream");

    let mut session = Session::replication();

    loop {
        while let Some(frame) = RespValue::decode(&mut buffer)? {
            dispatcher.dispatch(&mut session, frame).await;
        }

        if stream.read_buf(&mut buffer).await? == 0 {
            debug!("primary closed the replication stream");
            return Ok(());
        }
    }
}

async fn roundtrip(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    parts: &[&str],
) -> Result<RespValue, ReplicationError> {
    let command = RespValue::Array(
        parts
            .iter()
            .map(|part| RespValue::BulkString(part.to_string()))
            .collect(),
    );

    stream.write_all(command.encode().as_bytes()).await?;
    stream.flush().await?;

    read_frame(stream, buffer).await
}

async fn read_frame(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
) -> Result<RespValue, ReplicationError> {
    loop {
        if let Some(frame) = RespValue::decode(buffer)? {
            return Ok(frame);
        }

        if stream.read_buf(buffer).await? == 0 {
            return Err(ReplicationError::ConnectionClosed);
        }
    }
}

fn expect_simple(reply: &RespValue, expected: &str) -> Result<(), ReplicationError> {
    match reply {
        RespValue::SimpleString(value) if value == expected => Ok(()),
        _ => Err(ReplicationError::UnexpectedResponse),
    }
}

fn validate_full_resync(reply: &RespValue) -> Result<(), ReplicationError> {
    let RespValue::SimpleString(line) = reply else {
        return Err(ReplicationError::UnexpectedResponse);
    };

    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.len() != 3 || parts[0] != "FULLRESYNC" {
        return Err(ReplicationError::UnexpectedResponse);
    }

    if !is_valid_replication_id(parts[1]) || parts[2].parse::<u64>().is_err() {
        return Err(ReplicationError::UnexpectedResponse);
    }

    Ok(())
}

fn is_valid_replication_id(id: &str) -> bool {
    id.len() == 40 && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Consumes the `$<len>\r\n<bytes>` snapshot frame. The payload carries no
/// trailing CRLF, so the generic frame decoder cannot be used here.
async fn read_snapshot(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
) -> Result<(), ReplicationError> {
    let length = loop {
        if let Some(terminator) = buffer.windows(2).position(|window| window == b"\r\n") {
            if buffer[0] != b'$' {
                return Err(ReplicationError::UnexpectedResponse);
            }

            let length = std::str::from_utf8(&buffer[1..terminator])
                .map_err(|_| ReplicationError::UnexpectedResponse)?
                .parse::<usize>()
                .map_err(|_| ReplicationError::UnexpectedResponse)?;

            buffer.advance(terminator + 2);
            break length;
        }

        if stream.read_buf(buffer).await? == 0 {
            return Err(ReplicationError::ConnectionClosed);
        }
    };

    while buffer.len() < length {
        if stream.read_buf(buffer).await? == 0 {
            return Err(ReplicationError::ConnectionClosed);
        }
    }

    buffer.advance(length);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{empty_snapshot, is_valid_replication_id, validate_full_resync};
    use crate::resp::RespValue;

    #[test]
    fn test_empty_snapshot_payload() {
        let snapshot = empty_snapshot();

        assert!(snapshot.starts_with(b"REDIS0011"));
        assert_eq!(snapshot.len(), 88);
    }

    #[test]
    fn test_is_valid_replication_id() {
        let test_cases = [
            ("8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb", true),
            ("ABCDEF1234567890ABCDEF1234567890ABCDEF12", true),
            ("8371b4fb1155b71f4a04d3e1bc3e18c4a990aee", false),
            ("8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeba", false),
            ("8371b4fb1155b71f4a04d3e1bc3e18c4a990ae$g", false),
            ("", false),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                is_valid_replication_id(input),
                expected,
                "validating {:?}",
                input
            );
        }
    }

    #[test]
    fn test_validate_full_resync() {
        let valid = RespValue::SimpleString(
            "FULLRESYNC 8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb 0".to_string(),
        );
        assert!(validate_full_resync(&valid).is_ok());

        let test_cases = vec![
            RespValue::SimpleString("FULLRESYNC".to_string()),
            RespValue::SimpleString("RESYNC abc 0".to_string()),
            RespValue::SimpleString("FULLRESYNC tooshort 0".to_string()),
            RespValue::SimpleString(
                "FULLRESYNC 8371b4fb1155b71f4a04d3e1bc3e18c4a990aeeb x".to_string(),
            ),
            RespValue::Integer(0),
        ];

        for input in test_cases {
            assert!(
                validate_full_resync(&input).is_err(),
                "validating {:?}",
                input
            );
        }
    }
}
