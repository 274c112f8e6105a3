//! Ed25519 signatures over raw message bytes.
//!
//! Signatures travel as base64 text next to the plaintext message; they add
//! integrity, never confidentiality.

use ed25519_dalek::{Signature, Signer};

use crate::error::{CryptoError, CryptoResult};
use crate::format::{base64_decode, base64_encode};
use crate::keys::{PrivateKey, PublicKey};

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Sign `message` with our private key.
pub fn sign(message: &[u8], private_key: &PrivateKey) -> [u8; SIGNATURE_LENGTH] {
    private_key.signing_key().sign(message).to_bytes()
}

/// Verify `signature` over `message` against `public_key`.
///
/// Uses strict verification, so malleated signatures and small-order keys are
/// rejected as [`CryptoError::BadSignature`].
pub fn verify(message: &[u8], signature: &[u8], public_key: &PublicKey) -> CryptoResult<()> {
    let bytes: [u8; SIGNATURE_LENGTH] = signature.try_into().map_err(|_| {
        CryptoError::MalformedSignature(format!(
            "Expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        ))
    })?;
    let signature = Signature::from_bytes(&bytes);

    public_key
        .verifying_key()?
        .verify_strict(message, &signature)
        .map_err(|_| CryptoError::BadSignature)
}

/// Sign UTF-8 text and return the signature as base64.
pub fn sign_text(message: &str, private_key: &PrivateKey) -> String {
    base64_encode(&sign(message.as_bytes(), private_key))
}

/// Verify a base64 signature over UTF-8 text.
pub fn verify_text(message: &str, signature: &str, public_key: &PublicKey) -> CryptoResult<()> {
    let bytes =
        base64_decode(signature).map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
    verify(message.as_bytes(), &bytes, public_key)
}
