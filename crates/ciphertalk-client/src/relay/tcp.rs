//! TCP relay bridge and server.
//!
//! Each JSON frame is preceded by its length as a u32 little-endian prefix.
//! Frames that fail to decode are logged and skipped; I/O errors and EOF end
//! the connection.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};

use ciphertalk_core::defaults::{CHANNEL_CAPACITY, SHUTDOWN_GRACE_MS};
use ciphertalk_core::{ClientFrame, Error, RelayFrame, Result};

use super::{read_frame, write_frame, Broker, ConnectionId, RelayBridge, RelayLink};

/// Connects to a relay server over TCP.
#[derive(Debug, Clone)]
pub struct TcpRelay {
    addr: String,
}

impl TcpRelay {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl RelayBridge for TcpRelay {
    async fn connect(&self) -> Result<RelayLink> {
        let stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            Error::RelayDisconnected(format!("Failed to connect to {}: {}", self.addr, e))
        })?;
        info!(peer_addr = %self.addr, "Connected to relay");

        let (read_half, write_half) = stream.into_split();
        let (outbound, mut outbound_rx) = mpsc::channel::<ClientFrame>(CHANNEL_CAPACITY);
        let (inbound_tx, inbound) = mpsc::channel::<RelayFrame>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut writer = BufWriter::new(write_half);
            while let Some(frame) = outbound_rx.recv().await {
                trace!(event = frame.event_name(), "Sending frame");
                if let Err(e) = write_frame(&mut writer, &frame).await {
                    warn!(error = %e, "Relay write failed");
                    break;
                }
            }
            let _ = writer.shutdown().await;
        });

        tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            loop {
                let data = match read_frame(&mut reader).await {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        debug!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Relay read failed");
                        break;
                    }
                };
                match serde_json::from_slice::<RelayFrame>(&data) {
                    Ok(frame) => {
                        trace!(event = frame.event_name(), frame_len = data.len(), "Received frame");
                        if inbound_tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, frame_len = data.len(), "Dropping malformed relay frame");
                    }
                }
            }
        });

        Ok(RelayLink { outbound, inbound })
    }
}

/// Serve `broker` on `listener` until `shutdown` resolves, then send
/// `disconnect` to every client.
///
/// Returns once every connection has flushed its queue, or after
/// [`SHUTDOWN_GRACE_MS`] when a client does not go away.
pub async fn serve<F>(listener: TcpListener, broker: Broker, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!(peer_addr = ?listener.local_addr().ok(), "Relay listening");
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                broker.shutdown().await;
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let (id, rx) = broker.attach().await;
                        info!(connection_id = id, peer_addr = %peer, "Client connected");
                        connections.spawn(handle_connection(stream, broker.clone(), id, rx));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                }
            }
            // Reap finished connections so the set does not grow without bound.
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    let drained = tokio::time::timeout(Duration::from_millis(SHUTDOWN_GRACE_MS), async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!(
            connections = connections.len(),
            "Connections still open after shutdown grace period, aborting"
        );
        connections.shutdown().await;
    }

    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    broker: Broker,
    id: ConnectionId,
    mut frames: mpsc::Receiver<RelayFrame>,
) {
    let (read_half, write_half) = stream.into_split();

    // Ends when the broker drops our sender: on detach, or after queuing
    // `disconnect` during shutdown.
    let mut writer_task = tokio::spawn(async move {
        let mut writer = BufWriter::new(write_half);
        while let Some(frame) = frames.recv().await {
            if let Err(e) = write_frame(&mut writer, &frame).await {
                warn!(connection_id = id, error = %e, "Client write failed");
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let writer_done = tokio::select! {
        _ = read_client_frames(read_half, &broker, id) => false,
        _ = &mut writer_task => true,
    };

    broker.detach(id).await;
    if !writer_done {
        let _ = writer_task.await;
    }
    info!(connection_id = id, "Client disconnected");
}

async fn read_client_frames(read_half: OwnedReadHalf, broker: &Broker, id: ConnectionId) {
    let mut reader = BufReader::new(read_half);
    loop {
        match read_frame(&mut reader).await {
            Ok(Some(data)) => match serde_json::from_slice::<ClientFrame>(&data) {
                Ok(frame) => {
                    let leaving = matches!(frame, ClientFrame::Leave(_));
                    broker.handle(id, frame).await;
                    if leaving {
                        return;
                    }
                }
                Err(e) => {
                    warn!(connection_id = id, error = %e, "Dropping malformed client frame");
                }
            },
            Ok(None) => return,
            Err(e) => {
                warn!(connection_id = id, error = %e, "Client read failed");
                return;
            }
        }
    }
}
