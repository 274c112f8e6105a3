//! Relay bridges.
//!
//! The relay is a pub/sub broker between clients. A client sees it only as a
//! [`RelayLink`]: a sender for [`ClientFrame`]s and a receiver of
//! [`RelayFrame`]s. The inbound receiver closing means the relay is gone.
//!
//! - [`LocalRelay`] runs a [`Broker`] in-process (tests, demos).
//! - [`TcpRelay`] connects to a `ciphertalk-relay` over TCP using
//!   length-prefixed JSON frames.

mod broker;
mod local;
mod tcp;

pub use broker::{Broker, ConnectionId};
pub use local::LocalRelay;
pub use tcp::{serve, TcpRelay};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use ciphertalk_core::defaults::MAX_FRAME_BYTES;
use ciphertalk_core::{ClientFrame, Error, RelayFrame, Result};

/// A client's connection to the relay.
#[derive(Debug)]
pub struct RelayLink {
    pub outbound: mpsc::Sender<ClientFrame>,
    pub inbound: mpsc::Receiver<RelayFrame>,
}

/// Something a client can connect through.
#[async_trait]
pub trait RelayBridge: Send + Sync {
    /// Open a new connection.
    async fn connect(&self) -> Result<RelayLink>;
}

/// Write one length-prefixed JSON frame.
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = serde_json::to_vec(frame)?;
    if data.len() > MAX_FRAME_BYTES {
        return Err(Error::MalformedEnvelope(format!(
            "Frame too large: {} bytes",
            data.len()
        )));
    }

    let len = data.len() as u32;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame body.
///
/// Returns `Ok(None)` when the peer closed the connection between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(Error::MalformedEnvelope(format!(
            "Frame too large: {} bytes",
            len
        )));
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).await?;
    Ok(Some(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphertalk_core::{Departure, WireMessage};

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let (mut a, mut b) = tokio::io::duplex(4096);

        let frame = ClientFrame::Message(WireMessage {
            username: "alice".into(),
            message: "hello".into(),
            target_username: None,
            signature: None,
        });
        write_frame(&mut a, &frame).await.unwrap();

        let data = read_frame(&mut b).await.unwrap().unwrap();
        let parsed: ClientFrame = serde_json::from_slice(&data).unwrap();
        assert_eq!(parsed, frame);
    }

    #[tokio::test]
    async fn test_frame_prefix_is_little_endian() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let frame = ClientFrame::Leave(Departure {
            username: "bob".into(),
        });
        write_frame(&mut a, &frame).await.unwrap();

        let mut prefix = [0u8; 4];
        b.read_exact(&mut prefix).await.unwrap();
        let expected = serde_json::to_vec(&frame).unwrap().len() as u32;
        assert_eq!(u32::from_le_bytes(prefix), expected);
    }

    #[tokio::test]
    async fn test_read_frame_clean_eof() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);
        assert!(read_frame(&mut b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&((MAX_FRAME_BYTES as u32) + 1).to_le_bytes())
            .await
            .unwrap();

        assert!(matches!(
            read_frame(&mut b).await,
            Err(Error::MalformedEnvelope(_))
        ));
    }
}
