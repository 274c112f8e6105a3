//! Error types for cryptographic operations.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key bytes do not describe a valid key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid fingerprint format.
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Sealed payload is structurally broken (bad magic, truncated, bad header).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Base64 text could not be decoded.
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Sealed payload names a different recipient than the key we hold.
    #[error("Payload is addressed to {0}, not to this key")]
    NotAddressedToUs(String),

    /// Decryption failed - wrong key or corrupted data.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Signature bytes are not a well-formed signature.
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Signature does not match the message and key.
    #[error("Signature verification failed")]
    BadSignature,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
