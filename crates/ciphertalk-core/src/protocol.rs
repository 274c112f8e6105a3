//! Relay wire protocol.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` with
//! camelCase payload fields:
//!
//! ```text
//! client → relay   registerPublicKey  {"username": "alice", "publicKey": "<base64>"}
//! relay  → client  init               [["alice", "<base64>"], ["bob", "<base64>"]]
//! relay  → client  newUser            {"username": "carol", "publicKey": "<base64>"}
//! both             message            {"username": "alice", "message": "...", "targetUsername": "bob"}
//!                                     {"username": "alice", "message": "...", "signature": "<base64>"}
//! relay  → client  disconnect
//! client → relay   leave              {"username": "alice"}
//! ```
//!
//! [`WireMessage`] is what travels; [`Envelope`] is the validated, typed view
//! a client works with.

use std::fmt;
use std::str::FromStr;

use ciphertalk_crypto::PublicKey;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

// ============================================================================
// Variant
// ============================================================================

/// Which sub-protocol a client runs. A session uses exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Directed secrets sealed to one recipient; broadcasts in plaintext.
    #[default]
    Confidentiality,
    /// Every message signed; impersonation is possible and detected.
    Integrity,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Confidentiality => "confidentiality",
            Variant::Integrity => "integrity",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confidentiality" | "encryption" => Ok(Variant::Confidentiality),
            "integrity" | "signature" => Ok(Variant::Integrity),
            other => Err(Error::Config(format!(
                "Unknown variant {:?} (expected \"confidentiality\" or \"integrity\")",
                other
            ))),
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A username paired with its public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAnnouncement {
    pub username: String,
    pub public_key: PublicKey,
}

/// Departure notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Departure {
    pub username: String,
}

/// Chat message as carried by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

// ============================================================================
// Frames
// ============================================================================

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientFrame {
    RegisterPublicKey(KeyAnnouncement),
    Message(WireMessage),
    Leave(Departure),
}

impl ClientFrame {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientFrame::RegisterPublicKey(_) => "registerPublicKey",
            ClientFrame::Message(_) => "message",
            ClientFrame::Leave(_) => "leave",
        }
    }
}

/// Frames the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum RelayFrame {
    /// Full registry snapshot, sent once after registration.
    ///
    /// Entries with a bad key are dropped one by one when decoding.
    #[serde(deserialize_with = "deserialize_snapshot")]
    Init(Vec<(String, PublicKey)>),
    NewUser(KeyAnnouncement),
    Message(WireMessage),
    Disconnect,
}

fn deserialize_snapshot<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, PublicKey)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let total = raw.len();
    let entries: Vec<(String, PublicKey)> = raw
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping malformed key snapshot entry");
                None
            }
        })
        .collect();
    if entries.len() < total {
        warn!(
            user_count = entries.len(),
            skipped = total - entries.len(),
            "Key snapshot had malformed entries"
        );
    }
    Ok(entries)
}

impl RelayFrame {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            RelayFrame::Init(_) => "init",
            RelayFrame::NewUser(_) => "newUser",
            RelayFrame::Message(_) => "message",
            RelayFrame::Disconnect => "disconnect",
        }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// A validated chat message.
///
/// Immutable once built: constructed on send, converted to a [`WireMessage`]
/// for transmission, rebuilt by the receiver with [`Envelope::from_wire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Broadcast in the clear.
    Plain { sender: String, text: String },
    /// Sealed to `target`; `ciphertext` is base64 CTSEAL1.
    Encrypted {
        sender: String,
        target: String,
        ciphertext: String,
    },
    /// Broadcast in the clear with a base64 Ed25519 signature.
    Signed {
        sender: String,
        text: String,
        signature: String,
    },
}

impl Envelope {
    /// Username the message claims to come from.
    pub fn sender(&self) -> &str {
        match self {
            Envelope::Plain { sender, .. }
            | Envelope::Encrypted { sender, .. }
            | Envelope::Signed { sender, .. } => sender,
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        match self {
            Envelope::Plain { sender, text } => WireMessage {
                username: sender.clone(),
                message: text.clone(),
                target_username: None,
                signature: None,
            },
            Envelope::Encrypted {
                sender,
                target,
                ciphertext,
            } => WireMessage {
                username: sender.clone(),
                message: ciphertext.clone(),
                target_username: Some(target.clone()),
                signature: None,
            },
            Envelope::Signed {
                sender,
                text,
                signature,
            } => WireMessage {
                username: sender.clone(),
                message: text.clone(),
                target_username: None,
                signature: Some(signature.clone()),
            },
        }
    }

    /// Interpret a received message under `variant`.
    ///
    /// Integrity clients require username, message and signature to be
    /// present and non-empty. Confidentiality clients require a username and
    /// treat a non-empty `targetUsername` as a sealed payload.
    pub fn from_wire(wire: WireMessage, variant: Variant) -> Result<Self> {
        if wire.username.is_empty() {
            return Err(Error::MalformedEnvelope("message without username".into()));
        }

        match variant {
            Variant::Confidentiality => match wire.target_username {
                Some(target) if !target.is_empty() => Ok(Envelope::Encrypted {
                    sender: wire.username,
                    target,
                    ciphertext: wire.message,
                }),
                _ => Ok(Envelope::Plain {
                    sender: wire.username,
                    text: wire.message,
                }),
            },
            Variant::Integrity => {
                if wire.message.is_empty() {
                    return Err(Error::MalformedEnvelope(format!(
                        "message from {} has no content",
                        wire.username
                    )));
                }
                match wire.signature {
                    Some(signature) if !signature.is_empty() => Ok(Envelope::Signed {
                        sender: wire.username,
                        text: wire.message,
                        signature,
                    }),
                    _ => Err(Error::MalformedEnvelope(format!(
                        "message from {} has no signature",
                        wire.username
                    ))),
                }
            }
        }
    }
}
