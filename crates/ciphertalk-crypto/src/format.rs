//! Shared encoding utilities.

use base64::Engine;

use crate::error::{CryptoError, CryptoResult};

/// Encode bytes as standard base64.
pub fn base64_encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Decode a standard base64 string to bytes.
pub fn base64_decode(data: &str) -> CryptoResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| CryptoError::InvalidBase64(e.to_string()))
}

/// Decode base64 into a fixed-size array, rejecting any other length.
pub fn base64_decode_array<const N: usize>(data: &str) -> CryptoResult<[u8; N]> {
    let bytes = base64_decode(data)?;
    if bytes.len() != N {
        return Err(CryptoError::InvalidBase64(format!(
            "Expected {} bytes, got {}",
            N,
            bytes.len()
        )));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Serde helper for base64-encoded 32-byte arrays.
pub(crate) mod base64_array32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::base64_encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::base64_decode_array::<32>(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for base64-encoded 12-byte nonces.
pub(crate) mod base64_array12 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 12], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::base64_encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 12], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::base64_decode_array::<12>(&s).map_err(serde::de::Error::custom)
    }
}
