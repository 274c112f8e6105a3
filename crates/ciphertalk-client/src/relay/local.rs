//! In-process relay bridge.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use ciphertalk_core::defaults::CHANNEL_CAPACITY;
use ciphertalk_core::{ClientFrame, Result};

use super::{Broker, RelayBridge, RelayLink};

/// Connects clients to a [`Broker`] in the same process.
#[derive(Clone, Default)]
pub struct LocalRelay {
    broker: Broker,
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge onto an existing broker.
    pub fn with_broker(broker: Broker) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }
}

#[async_trait]
impl RelayBridge for LocalRelay {
    async fn connect(&self) -> Result<RelayLink> {
        let (id, inbound) = self.broker.attach().await;
        let (outbound, mut rx) = mpsc::channel::<ClientFrame>(CHANNEL_CAPACITY);

        let broker = self.broker.clone();
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                broker.handle(id, frame).await;
            }
            // Client dropped its sender.
            debug!(connection_id = id, "Local link closed");
            broker.detach(id).await;
        });

        Ok(RelayLink { outbound, inbound })
    }
}
