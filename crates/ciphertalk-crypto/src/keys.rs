//! Keypair generation and the two views of one keypair.
//!
//! A ciphertalk keypair is an Ed25519 keypair. Signatures use it directly.
//! Sealed payloads use its X25519 form:
//!
//! - public: the Edwards point mapped to its Montgomery u-coordinate
//! - private: the low half of `SHA-512(seed)`, the same scalar Ed25519 signs with
//!
//! so a single `Keypair::generate()` is enough for both protocol variants.
//!
//! # Security
//!
//! - Seeds are wiped when dropped
//! - Private keys never implement `Serialize` and their `Debug` output is redacted
//! - Random number generation uses the thread-local CSPRNG

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};
use crate::fingerprint::Fingerprint;
use crate::format::{base64_decode_array, base64_encode};

/// Ed25519 public key (32 bytes).
///
/// Always holds a point that decodes on the curve; construction from
/// untrusted bytes goes through [`PublicKey::from_bytes`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Create a public key from raw bytes, rejecting bytes that are not a curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> CryptoResult<Self> {
        VerifyingKey::from_bytes(&bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parse a base64-encoded public key as carried on the relay.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = base64_decode_array::<32>(encoded)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Base64 form used on the wire.
    pub fn to_base64(&self) -> String {
        base64_encode(&self.0)
    }

    /// Compressed Edwards point bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short human-readable fingerprint of this key.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_public_key(self)
    }

    pub(crate) fn verifying_key(&self) -> CryptoResult<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// X25519 form of this key, used as a sealing target.
    pub(crate) fn to_x25519(&self) -> CryptoResult<X25519Public> {
        let point = CompressedEdwardsY(self.0)
            .decompress()
            .ok_or_else(|| CryptoError::InvalidKey("not a valid Edwards point".to_string()))?;
        Ok(X25519Public::from(point.to_montgomery().to_bytes()))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Ed25519 private seed (32 bytes) with automatic zeroization.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Create a private key from a raw seed.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Ed25519 verifying key for this seed.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key().verifying_key().to_bytes())
    }

    pub(crate) fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }

    /// X25519 form of this key, used to open sealed payloads.
    pub(crate) fn to_x25519(&self) -> StaticSecret {
        let mut expanded = [0u8; 64];
        expanded.copy_from_slice(&Sha512::digest(self.0));
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&expanded[..32]);
        let secret = StaticSecret::from(scalar);
        expanded.zeroize();
        scalar.zeroize();
        secret
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Ed25519 keypair usable for both sealing and signing.
pub struct Keypair {
    /// Announced to the relay.
    pub public: PublicKey,
    /// Signing seed; never leaves the process.
    pub private: PrivateKey,
}

impl Keypair {
    /// Fresh identity keypair from the OS RNG.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);

        let private = PrivateKey(seed);
        seed.zeroize();

        Self {
            public: private.public_key(),
            private,
        }
    }

    /// Rebuild a keypair around a known Ed25519 seed.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { public, private }
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();

        assert_ne!(kp1.public.as_bytes(), kp2.public.as_bytes());
    }

    #[test]
    fn test_private_key_derives_public() {
        let kp = Keypair::generate();
        assert_eq!(kp.public, kp.private.public_key());
    }

    #[test]
    fn test_keypair_from_private() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::from_private(PrivateKey::from_bytes(kp1.private.0));
        assert_eq!(kp1.public, kp2.public);
    }

    #[test]
    fn test_x25519_views_agree() {
        let kp = Keypair::generate();

        let from_public = kp.public.to_x25519().unwrap();
        let from_private = X25519Public::from(&kp.private.to_x25519());

        assert_eq!(from_public.as_bytes(), from_private.as_bytes());
    }

    #[test]
    fn test_public_key_base64_roundtrip() {
        let kp = Keypair::generate();
        let parsed = PublicKey::from_base64(&kp.public.to_base64()).unwrap();
        assert_eq!(kp.public, parsed);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        let result = PublicKey::from_base64(&base64_encode(&[1u8; 16]));
        assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        let result = PublicKey::from_base64("-----BEGIN PUBLIC KEY-----");
        assert!(result.is_err());
    }

    #[test]
    fn test_public_key_serialization() {
        let kp = Keypair::generate();
        let json = serde_json::to_string(&kp.public).unwrap();
        let parsed: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(kp.public, parsed);
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let kp = Keypair::generate();
        let debug = format!("{:?}", kp.private);
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_keypair_debug() {
        let kp = Keypair::generate();
        let debug = format!("{:?}", kp);
        assert!(debug.contains("Keypair"));
        assert!(debug.contains("PublicKey(ct:"));
        assert!(debug.contains("REDACTED"));
    }
}
