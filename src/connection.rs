//! Per-connection read/dispatch/write loop.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::commands::{Dispatched, Dispatcher, Session};
use crate::replication;
use crate::resp::RespValue;

/// Serves one client until it disconnects or desynchronizes the protocol.
///
/// Frames are decoded out of a growing receive buffer, so pipelined commands
/// and commands split across reads both work. A protocol error is reported
/// once and the connection dropped; recoverable command errors were already
/// turned into error replies by the dispatcher.
pub async fn handle_client(stream: TcpStream, dispatcher: Arc<Dispatcher>, peer: String) {
    let mut session = Session::client(&peer);
    let mut buffer = BytesMut::with_capacity(4096);
    let (mut reader, mut writer) = stream.into_split();

    loop {
        loop {
            let frame = match RespValue::decode(&mut buffer) {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) => {
                    warn!(%peer, error = %err, "protocol error, closing connection");
                    let _ = writer.write_all(err.as_string().as_bytes()).await;
                    return;
                }
            };

            match dispatcher.dispatch(&mut session, frame).await {
                Dispatched::Reply(response) => {
                    if let Err(err) = write_response(&mut writer, response.as_bytes()).await {
                        warn!(%peer, error = %err, "failed to write response");
                        return;
                    }
                }
                Dispatched::FullResync(reply) => {
                    if let Err(err) = replication::send_full_resync(&mut writer, &reply).await {
                        warn!(%peer, error = %err, "failed to send snapshot");
                        return;
                    }
                }
                Dispatched::NoResponse => {}
            }
        }

        match reader.read_buf(&mut buffer).await {
            Ok(0) => {
                debug!(%peer, "client disconnected");
                return;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%peer, error = %err, "failed to read from client");
                return;
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &[u8]) -> tokio::io::Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    writer.write_all(response).await?;
    writer.flush().await?;

    Ok(())
}
