//! Error types for ciphertalk.

use ciphertalk_crypto::CryptoError;
use thiserror::Error;

/// Result type alias using ciphertalk's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ciphertalk operations.
///
/// Everything except [`Error::RelayDisconnected`] is scoped to a single
/// message or command: the client reports it and keeps running.
#[derive(Error, Debug)]
pub enum Error {
    /// No public key on record for the user a secret message is addressed to
    #[error("Recipient unknown: {0}")]
    RecipientUnknown(String),

    /// Registry lookup for a username failed
    #[error("No public key registered for {0}")]
    RegistryMiss(String),

    /// Sealed payload could not be opened with our key
    #[error("Decrypt failure: {0}")]
    DecryptFailure(String),

    /// Signature does not match the claimed sender's registered key
    #[error("Signature invalid for {0}")]
    SignatureInvalid(String),

    /// Claimed sender has no registered key to verify against
    #[error("Signature unverifiable for {0}")]
    SignatureUnverifiable(String),

    /// Relay frame or message missing required fields
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Relay closed the session
    #[error("Relay disconnected: {0}")]
    RelayDisconnected(String),

    /// Username does not match the `\w+` grammar
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Socket or stdin I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Lower-level key or payload error
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether this error ends the client session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::RelayDisconnected(_))
    }
}
