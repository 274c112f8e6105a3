//! CTSEAL1 format for payloads sealed to a single recipient.
//!
//! # Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Magic: "CTSEAL1\n" (8 bytes)                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Header Length: u32 LE (4 bytes)                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Header (JSON)                                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Encrypted Data (AES-256-GCM ciphertext + 16-byte tag)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Header Structure
//!
//! ```json
//! {
//!   "version": 1,
//!   "ephemeral_pubkey": "<base64>",
//!   "recipient": "ct:...",
//!   "nonce": "<base64>",
//!   "created_at": "2026-10-19T09:30:00+00:00"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, CryptoResult};
use crate::fingerprint::Fingerprint;
use crate::format::{base64_array12, base64_array32};

/// Magic bytes for CTSEAL1 format.
pub const MAGIC_BYTES: &[u8; 8] = b"CTSEAL1\n";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Bytes before the JSON header: magic + length.
const PREAMBLE_LEN: usize = 12;

/// CTSEAL1 header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealHeader {
    /// Format version (currently 1).
    pub version: u8,

    /// Sender's ephemeral X25519 public key.
    #[serde(with = "base64_array32")]
    pub ephemeral_pubkey: [u8; 32],

    /// Fingerprint of the key this payload is sealed to.
    pub recipient: Fingerprint,

    /// AES-GCM nonce.
    #[serde(with = "base64_array12")]
    pub nonce: [u8; 12],

    /// Creation timestamp (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl SealHeader {
    /// Create a new header stamped with the current time.
    pub fn new(ephemeral_pubkey: [u8; 32], recipient: Fingerprint, nonce: [u8; 12]) -> Self {
        Self {
            version: FORMAT_VERSION,
            ephemeral_pubkey,
            recipient,
            nonce,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Serialize header to bytes (magic + length + JSON).
pub fn serialize_header(header: &SealHeader) -> CryptoResult<Vec<u8>> {
    let json = serde_json::to_vec(header)?;

    let mut output = Vec::with_capacity(PREAMBLE_LEN + json.len());
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&(json.len() as u32).to_le_bytes());
    output.extend_from_slice(&json);

    Ok(output)
}

/// Parse header from bytes.
///
/// Returns the header and a slice to the remaining data (ciphertext).
pub fn parse_header(data: &[u8]) -> CryptoResult<(SealHeader, &[u8])> {
    if data.len() < PREAMBLE_LEN {
        return Err(CryptoError::InvalidFormat(
            "Data too short for CTSEAL1 header".to_string(),
        ));
    }

    if !is_sealed(data) {
        return Err(CryptoError::InvalidFormat(
            "Invalid magic bytes - not CTSEAL1 format".to_string(),
        ));
    }

    let header_len = u32::from_le_bytes([data[8], data[9], data[10], data[11]]) as usize;
    let body = &data[PREAMBLE_LEN..];

    if body.len() < header_len {
        return Err(CryptoError::InvalidFormat(format!(
            "Data too short: expected {} bytes for header, got {}",
            header_len,
            body.len()
        )));
    }

    let (header_json, ciphertext) = body.split_at(header_len);
    let header: SealHeader = serde_json::from_slice(header_json)
        .map_err(|e| CryptoError::InvalidFormat(format!("Invalid header JSON: {}", e)))?;

    if header.version != FORMAT_VERSION {
        return Err(CryptoError::InvalidFormat(format!(
            "Unsupported format version: {}",
            header.version
        )));
    }

    Ok((header, ciphertext))
}

/// Check if data starts with the CTSEAL1 magic.
pub fn is_sealed(data: &[u8]) -> bool {
    data.len() >= 8 && &data[0..8] == MAGIC_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    fn create_test_header() -> SealHeader {
        let recipient = Keypair::generate();
        SealHeader::new([9u8; 32], recipient.public.fingerprint(), [42u8; 12])
    }

    #[test]
    fn test_serialize_parse_header() {
        let header = create_test_header();
        let mut data = serialize_header(&header).unwrap();
        data.extend_from_slice(b"encrypted data here");

        let (parsed, remaining) = parse_header(&data).unwrap();

        assert_eq!(parsed.version, FORMAT_VERSION);
        assert_eq!(parsed.ephemeral_pubkey, header.ephemeral_pubkey);
        assert_eq!(parsed.recipient, header.recipient);
        assert_eq!(parsed.nonce, header.nonce);
        assert_eq!(remaining, b"encrypted data here");
    }

    #[test]
    fn test_is_sealed() {
        let data = serialize_header(&create_test_header()).unwrap();

        assert!(is_sealed(&data));
        assert!(!is_sealed(b"hello bob"));
        assert!(!is_sealed(b"MMPKE01\n"));
    }

    #[test]
    fn test_parse_header_invalid_magic() {
        let result = parse_header(b"INVALID!\x00\x00\x00\x00{}");
        assert!(matches!(result, Err(CryptoError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_header_too_short() {
        assert!(parse_header(b"short").is_err());
    }

    #[test]
    fn test_parse_header_truncated_json() {
        let data = serialize_header(&create_test_header()).unwrap();
        let result = parse_header(&data[..data.len() - 5]);
        assert!(result.unwrap_err().to_string().contains("Data too short"));
    }

    #[test]
    fn test_header_json_fields() {
        let json = serde_json::to_string(&create_test_header()).unwrap();

        assert!(json.contains("\"ephemeral_pubkey\":"));
        assert!(json.contains("\"recipient\":\"ct:"));
        assert!(json.contains("\"nonce\":"));
        assert!(json.contains("\"created_at\":"));
    }
}
