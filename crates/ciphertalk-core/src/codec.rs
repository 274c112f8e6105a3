//! Message codec: sealing, opening, signing and verifying chat payloads.
//!
//! A client runs exactly one sub-protocol per session:
//!
//! - **Confidentiality**: [`encrypt`] seals text to one recipient's public
//!   key; [`MessageCodec::decrypt`] opens it with our identity. Broadcasts are
//!   never encrypted.
//! - **Integrity**: [`MessageCodec::sign`] signs raw message bytes;
//!   [`verify`] checks a signature against the *registered* key of the
//!   username embedded in the message, never a key carried in the message.

use ciphertalk_crypto::{seal_text, verify_text, CryptoError, PublicKey};
use tracing::warn;

use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::protocol::Envelope;
use crate::registry::KeyRegistry;
use crate::session::Dispatch;

/// Outcome of verifying a signed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Signature present but does not match (or is not a signature at all).
    Invalid,
    /// No public key on record for the claimed sender.
    Unverifiable,
}

impl Verification {
    /// Map to the error taxonomy for callers that propagate.
    pub fn into_result(self, sender: &str) -> Result<()> {
        match self {
            Verification::Valid => Ok(()),
            Verification::Invalid => Err(Error::SignatureInvalid(sender.to_string())),
            Verification::Unverifiable => Err(Error::SignatureUnverifiable(sender.to_string())),
        }
    }
}

/// Seal `plaintext` to `recipient`, returning base64 ciphertext.
pub fn encrypt(plaintext: &str, recipient: &PublicKey) -> Result<String> {
    Ok(seal_text(plaintext, recipient)?)
}

/// Verify a base64 `signature` over `message` against `key`.
pub fn verify(message: &str, signature: &str, key: &PublicKey) -> Verification {
    match verify_text(message, signature, key) {
        Ok(()) => Verification::Valid,
        Err(CryptoError::BadSignature) | Err(CryptoError::MalformedSignature(_)) => {
            Verification::Invalid
        }
        Err(e) => {
            warn!(error = %e, "Unexpected verification error");
            Verification::Invalid
        }
    }
}

/// Codec bound to the local identity and key registry.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec<'a> {
    identity: &'a Identity,
    registry: &'a KeyRegistry,
}

impl<'a> MessageCodec<'a> {
    pub fn new(identity: &'a Identity, registry: &'a KeyRegistry) -> Self {
        Self { identity, registry }
    }

    /// Seal `plaintext` to the registered key of `target`.
    ///
    /// Fails with [`Error::RecipientUnknown`] when `target` has no key; the
    /// caller must not fall back to sending plaintext.
    pub fn encrypt_to(&self, plaintext: &str, target: &str) -> Result<String> {
        let key = self
            .registry
            .lookup(target)
            .map_err(|_| Error::RecipientUnknown(target.to_string()))?;
        encrypt(plaintext, &key)
    }

    /// Open a sealed payload with our private key.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        self.identity.open(ciphertext)
    }

    /// Sign `message` with our private key.
    pub fn sign(&self, message: &str) -> String {
        self.identity.sign(message)
    }

    /// Verify a signature against `claimed_sender`'s registered key.
    pub fn verify(&self, message: &str, signature: &str, claimed_sender: &str) -> Verification {
        match self.registry.lookup(claimed_sender) {
            Ok(key) => verify(message, signature, &key),
            Err(_) => Verification::Unverifiable,
        }
    }

    /// Build the outgoing envelope for `text` under `dispatch`.
    pub fn outgoing(&self, dispatch: &Dispatch, text: &str) -> Result<Envelope> {
        let me = self.identity.username().to_string();
        match dispatch {
            Dispatch::Plain => Ok(Envelope::Plain {
                sender: me,
                text: text.to_string(),
            }),
            Dispatch::EncryptTo(target) => Ok(Envelope::Encrypted {
                sender: me,
                target: target.clone(),
                ciphertext: self.encrypt_to(text, target)?,
            }),
            // The keypair is fixed; only the claimed username changes.
            Dispatch::SignAs(as_username) => Ok(Envelope::Signed {
                sender: as_username.clone(),
                text: text.to_string(),
                signature: self.sign(text),
            }),
        }
    }
}
