//! Human-friendly fingerprints for public keys.
//!
//! Fingerprints are derived from public keys using BLAKE3 hashing and
//! Base58Check encoding. They are what users compare out of band and what
//! sealed payloads name as their recipient.
//!
//! # Format
//!
//! ```text
//! ct:<version><hash><checksum>
//!
//! - Prefix: "ct:"
//! - Version: 1 byte (0x01 for v1)
//! - Hash: 20 bytes of BLAKE3(public_key)
//! - Checksum: 4 bytes of BLAKE3(version || hash)
//! - Encoding: Base58 (Bitcoin alphabet)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::PublicKey;

/// Fingerprint version byte.
const FINGERPRINT_VERSION: u8 = 0x01;

/// Fingerprint prefix.
const FINGERPRINT_PREFIX: &str = "ct:";

/// Length of the hash portion (truncated BLAKE3).
const HASH_LENGTH: usize = 20;

/// Length of the checksum.
const CHECKSUM_LENGTH: usize = 4;

/// A checksummed fingerprint derived from a public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Create a fingerprint from a public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let full_hash = blake3::hash(public_key.as_bytes());

        let mut payload = Vec::with_capacity(1 + HASH_LENGTH + CHECKSUM_LENGTH);
        payload.push(FINGERPRINT_VERSION);
        payload.extend_from_slice(&full_hash.as_bytes()[..HASH_LENGTH]);

        let checksum_hash = blake3::hash(&payload);
        payload.extend_from_slice(&checksum_hash.as_bytes()[..CHECKSUM_LENGTH]);

        Self(format!(
            "{}{}",
            FINGERPRINT_PREFIX,
            bs58::encode(&payload).into_string()
        ))
    }

    /// Parse a fingerprint string, validating prefix, version and checksum.
    pub fn parse(s: &str) -> CryptoResult<Self> {
        let encoded = s.strip_prefix(FINGERPRINT_PREFIX).ok_or_else(|| {
            CryptoError::InvalidFingerprint(format!(
                "Fingerprint must start with '{}'",
                FINGERPRINT_PREFIX
            ))
        })?;

        let payload = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| CryptoError::InvalidFingerprint(format!("Invalid Base58: {}", e)))?;

        let expected_len = 1 + HASH_LENGTH + CHECKSUM_LENGTH;
        if payload.len() != expected_len {
            return Err(CryptoError::InvalidFingerprint(format!(
                "Invalid fingerprint length: expected {}, got {}",
                expected_len,
                payload.len()
            )));
        }

        if payload[0] != FINGERPRINT_VERSION {
            return Err(CryptoError::InvalidFingerprint(format!(
                "Unsupported fingerprint version: {}",
                payload[0]
            )));
        }

        let (body, checksum) = payload.split_at(1 + HASH_LENGTH);
        let computed = blake3::hash(body);
        if checksum != &computed.as_bytes()[..CHECKSUM_LENGTH] {
            return Err(CryptoError::InvalidFingerprint(
                "Invalid checksum - fingerprint may be corrupted".to_string(),
            ));
        }

        Ok(Self(s.to_string()))
    }

    /// Get the fingerprint as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
