//! Reference relay semantics, independent of transport.
//!
//! - `registerPublicKey`: store the key, send `init` (full snapshot, the
//!   registrant included) to that connection and `newUser` to every other.
//! - `message`: fan out to every connection, the sender included.
//! - `leave` or connection close: drop the connection. Keys are kept.
//! - shutdown: send `disconnect` to everyone.
//!
//! Delivery uses a bounded queue per connection. A connection whose queue is
//! full misses that frame.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use ciphertalk_core::defaults::CONNECTION_QUEUE_CAPACITY;
use ciphertalk_core::{ClientFrame, KeyAnnouncement, PublicKey, RelayFrame};

/// Broker-assigned connection number.
pub type ConnectionId = u64;

struct Connection {
    username: Option<String>,
    tx: mpsc::Sender<RelayFrame>,
}

#[derive(Default)]
struct BrokerState {
    /// Registration order is preserved in snapshots.
    keys: Vec<(String, PublicKey)>,
    connections: HashMap<ConnectionId, Connection>,
}

impl BrokerState {
    fn upsert_key(&mut self, username: &str, key: PublicKey) {
        match self.keys.iter_mut().find(|(name, _)| name == username) {
            Some(entry) => entry.1 = key,
            None => self.keys.push((username.to_string(), key)),
        }
    }

    fn deliver(&self, id: ConnectionId, frame: RelayFrame) {
        if let Some(conn) = self.connections.get(&id) {
            if let Err(e) = conn.tx.try_send(frame) {
                warn!(connection_id = id, error = %e, "Dropping frame for connection");
            }
        }
    }

    fn deliver_where<F>(&self, frame: &RelayFrame, mut include: F)
    where
        F: FnMut(ConnectionId) -> bool,
    {
        for (&id, conn) in &self.connections {
            if !include(id) {
                continue;
            }
            if let Err(e) = conn.tx.try_send(frame.clone()) {
                warn!(connection_id = id, error = %e, "Dropping frame for connection");
            }
        }
    }
}

/// Shared relay broker. Cloning shares state.
#[derive(Clone, Default)]
pub struct Broker {
    state: Arc<Mutex<BrokerState>>,
    next_id: Arc<AtomicU64>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Frames for it arrive on the returned receiver.
    pub async fn attach(&self) -> (ConnectionId, mpsc::Receiver<RelayFrame>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(CONNECTION_QUEUE_CAPACITY);

        let mut state = self.state.lock().await;
        state.connections.insert(id, Connection { username: None, tx });
        debug!(
            connection_id = id,
            connections = state.connections.len(),
            "Connection attached"
        );
        (id, rx)
    }

    /// Route one frame received from connection `id`.
    pub async fn handle(&self, id: ConnectionId, frame: ClientFrame) {
        let mut state = self.state.lock().await;
        if !state.connections.contains_key(&id) {
            debug!(connection_id = id, event = frame.event_name(), "Frame from detached connection");
            return;
        }

        match frame {
            ClientFrame::RegisterPublicKey(KeyAnnouncement {
                username,
                public_key,
            }) => {
                state.upsert_key(&username, public_key);
                if let Some(conn) = state.connections.get_mut(&id) {
                    conn.username = Some(username.clone());
                }
                info!(
                    connection_id = id,
                    username = %username,
                    fingerprint = %public_key.fingerprint(),
                    user_count = state.keys.len(),
                    "User registered"
                );

                state.deliver(id, RelayFrame::Init(state.keys.clone()));
                let announcement = RelayFrame::NewUser(KeyAnnouncement {
                    username,
                    public_key,
                });
                state.deliver_where(&announcement, |other| other != id);
            }
            ClientFrame::Message(message) => {
                debug!(
                    connection_id = id,
                    sender = %message.username,
                    "Fanning out message"
                );
                state.deliver_where(&RelayFrame::Message(message), |_| true);
            }
            ClientFrame::Leave(departure) => {
                state.connections.remove(&id);
                info!(connection_id = id, username = %departure.username, "User left");
            }
        }
    }

    /// Drop connection `id`. Its registered key stays in the snapshot.
    pub async fn detach(&self, id: ConnectionId) {
        let mut state = self.state.lock().await;
        if let Some(conn) = state.connections.remove(&id) {
            debug!(
                connection_id = id,
                username = conn.username.as_deref().unwrap_or("(unregistered)"),
                "Connection detached"
            );
        }
    }

    /// Send `disconnect` to every connection and forget them.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        info!(connections = state.connections.len(), "Relay shutting down");
        state.deliver_where(&RelayFrame::Disconnect, |_| true);
        state.connections.clear();
    }

    /// Number of registered usernames.
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.keys.len()
    }

    /// Number of attached connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }
}
