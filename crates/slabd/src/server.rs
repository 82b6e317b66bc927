//! TCP accept loop and per-connection RESP framing

use anyhow::Result;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::handler::{CommandHandler, SharedCache};
use crate::resp::{RespValue, MAX_BULK_LEN};

/// Most unparsed bytes a connection may hold: one maximal bulk string plus
/// room for the rest of its command.
const MAX_BUFFERED: usize = 2 * MAX_BULK_LEN;

/// Accept connections forever, one task per client
pub async fn serve(listener: TcpListener, cache: SharedCache) -> Result<()> {
    serve_with_buffer_limit(listener, cache, MAX_BUFFERED).await
}

async fn serve_with_buffer_limit(
    listener: TcpListener,
    cache: SharedCache,
    max_buffered: usize,
) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let handler = CommandHandler::new(SharedCache::clone(&cache));

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, handler, max_buffered).await {
                        error!("Error handling client {}: {}", addr, e);
                    }
                    info!("Connection closed: {}", addr);
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(
    mut stream: TcpStream,
    handler: CommandHandler,
    max_buffered: usize,
) -> Result<()> {
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        if stream.read_buf(&mut buffer).await? == 0 {
            return Ok(());
        }

        // Drain every complete frame; keep any partial tail for the next read
        loop {
            match RespValue::parse(&mut buffer) {
                Ok(Some(cmd)) => {
                    let response = handler.handle(cmd);
                    stream.write_all(&response.to_bytes()).await?;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Parse error: {}", e);
                    let reply = RespValue::error(format!("ERR Protocol error: {}", e));
                    stream.write_all(&reply.to_bytes()).await?;
                    buffer.clear();
                    break;
                }
            }
        }

        if buffer.len() > max_buffered {
            warn!("Client buffered {} bytes without a complete frame", buffer.len());
            let reply = RespValue::error("ERR Protocol error: request too large");
            stream.write_all(&reply.to_bytes()).await?;
            return Ok(());
        }
    }
}
