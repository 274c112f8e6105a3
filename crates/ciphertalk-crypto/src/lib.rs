//! # ciphertalk-crypto
//!
//! Cryptographic primitives for ciphertalk.
//!
//! One Ed25519 keypair per participant backs both protocol variants: it signs
//! messages directly, and its X25519 form is the target of sealed payloads.
//!
//! ## Cryptographic Primitives
//!
//! - **Identity keys**: Ed25519
//! - **Key exchange**: X25519 (same keys, Montgomery form) with per-message ephemerals
//! - **Symmetric cipher**: AES-256-GCM (AEAD)
//! - **Key derivation**: HKDF-SHA256
//! - **Fingerprints**: BLAKE3 hash with Base58Check encoding
//!
//! ## Sealed Format (CTSEAL1)
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Magic: "CTSEAL1\n" (8 bytes)                    │
//! ├─────────────────────────────────────────────────┤
//! │ Header Length: u32 LE (4 bytes)                 │
//! ├─────────────────────────────────────────────────┤
//! │ Header (JSON with ephemeral key, recipient)     │
//! ├─────────────────────────────────────────────────┤
//! │ Encrypted Data (AES-256-GCM)                    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//!
//! ```rust
//! use ciphertalk_crypto::{open_text, seal_text, sign_text, verify_text, Keypair};
//!
//! let bob = Keypair::generate();
//! let sealed = seal_text("meet at noon", &bob.public).unwrap();
//! assert_eq!(open_text(&sealed, &bob.private).unwrap(), "meet at noon");
//!
//! let alice = Keypair::generate();
//! let signature = sign_text("hello all", &alice.private);
//! assert!(verify_text("hello all", &signature, &alice.public).is_ok());
//! ```

pub mod cipher;
pub mod ecdh;
pub mod error;
pub mod fingerprint;
pub mod format;
pub mod keys;
pub mod seal;
pub mod seal_format;
pub mod signature;

// Re-export commonly used types
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::Fingerprint;
pub use format::{base64_decode, base64_encode};
pub use keys::{Keypair, PrivateKey, PublicKey};
pub use seal::{open, open_text, seal, seal_text};
pub use seal_format::{is_sealed, SealHeader, MAGIC_BYTES};
pub use signature::{sign, sign_text, verify, verify_text, SIGNATURE_LENGTH};

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// One keypair serves both sealing and signing.
    #[test]
    fn test_one_keypair_both_uses() {
        let bob = Keypair::generate();

        let sealed = seal(b"for bob", &bob.public).unwrap();
        assert!(is_sealed(&sealed));
        assert_eq!(open(&sealed, &bob.private).unwrap(), b"for bob");

        let signature = sign(b"from bob", &bob.private);
        assert!(verify(b"from bob", &signature, &bob.public).is_ok());
    }
}
