//! X25519 key agreement for sealed payloads.
//!
//! # Protocol
//!
//! For sealing:
//! 1. Sender generates an ephemeral X25519 secret
//! 2. Sender computes: shared = X25519(ephemeral_secret, recipient_public)
//! 3. Sender derives the message key via HKDF, salted with the ephemeral public key
//!
//! For opening:
//! 1. Recipient computes: shared = X25519(recipient_secret, ephemeral_public)
//! 2. Recipient derives the same message key
//!
//! The recipient's long-term key is fixed for the session, so there is no
//! forward secrecy beyond the per-message ephemeral.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::generate_random;
use crate::error::{CryptoError, CryptoResult};

/// Domain separation context for HKDF.
const HKDF_INFO_MESSAGE_KEY: &[u8] = b"ciphertalk-seal-message-key-v1";

/// Derived message key (32 bytes for AES-256).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MessageKey([u8; 32]);

impl MessageKey {
    /// Get the raw bytes of the derived key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// A fresh ephemeral X25519 secret and its public half.
pub struct Ephemeral {
    secret: StaticSecret,
    /// Public half, carried in the sealed header.
    pub public: [u8; 32],
}

impl Ephemeral {
    /// Generate a new ephemeral secret.
    pub fn generate() -> Self {
        let mut bytes: [u8; 32] = generate_random();
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();
        let public = *X25519Public::from(&secret).as_bytes();
        Self { secret, public }
    }
}

/// Derive a message key from an X25519 shared secret using HKDF-SHA256.
fn derive_message_key(shared: &[u8; 32], ephemeral_public: &[u8; 32]) -> CryptoResult<MessageKey> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared);
    let mut key = [0u8; 32];
    hkdf.expand(HKDF_INFO_MESSAGE_KEY, &mut key)
        .map_err(|e| CryptoError::Encryption(format!("HKDF expand failed: {}", e)))?;
    Ok(MessageKey(key))
}

/// Message key for sealing to `recipient` (sender side).
pub fn derive_for_seal(
    ephemeral: &Ephemeral,
    recipient: &X25519Public,
) -> CryptoResult<MessageKey> {
    let shared = ephemeral.secret.diffie_hellman(recipient);
    derive_message_key(shared.as_bytes(), &ephemeral.public)
}

/// Message key for opening a payload sealed with `ephemeral_public` (recipient side).
pub fn derive_for_open(
    recipient: &StaticSecret,
    ephemeral_public: &[u8; 32],
) -> CryptoResult<MessageKey> {
    let shared = recipient.diffie_hellman(&X25519Public::from(*ephemeral_public));
    derive_message_key(shared.as_bytes(), ephemeral_public)
}
