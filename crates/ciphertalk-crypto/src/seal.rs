//! Public-key sealing to exactly one recipient.
//!
//! # Sealing Flow
//!
//! 1. Generate an ephemeral X25519 secret
//! 2. Derive the message key against the recipient's X25519 public key
//! 3. Encrypt plaintext with the message key using AES-256-GCM
//! 4. Serialize CTSEAL1 (header names the recipient fingerprint)
//!
//! # Opening Flow
//!
//! 1. Parse CTSEAL1 header
//! 2. Reject early if the header names a different recipient
//! 3. Derive the message key from our X25519 secret and the ephemeral public key
//! 4. Decrypt and authenticate the ciphertext

use crate::cipher::{decrypt_body, encrypt_body};
use crate::ecdh::{derive_for_open, derive_for_seal, Ephemeral};
use crate::error::{CryptoError, CryptoResult};
use crate::format::{base64_decode, base64_encode};
use crate::keys::{PrivateKey, PublicKey};
use crate::seal_format::{parse_header, serialize_header, SealHeader};

/// Seal `plaintext` so only the holder of `recipient`'s private key can open it.
///
/// Every call uses a fresh ephemeral key and nonce, so sealing the same
/// plaintext twice gives different output.
pub fn seal(plaintext: &[u8], recipient: &PublicKey) -> CryptoResult<Vec<u8>> {
    let ephemeral = Ephemeral::generate();
    let key = derive_for_seal(&ephemeral, &recipient.to_x25519()?)?;
    let (nonce, ciphertext) = encrypt_body(&key, plaintext)?;

    let header = SealHeader::new(ephemeral.public, recipient.fingerprint(), nonce);
    let mut output = serialize_header(&header)?;
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Open a sealed payload with our private key.
///
/// # Errors
///
/// - [`CryptoError::InvalidFormat`] if the payload is not CTSEAL1
/// - [`CryptoError::NotAddressedToUs`] if it names another recipient
/// - [`CryptoError::Decryption`] if authentication fails
pub fn open(sealed: &[u8], private_key: &PrivateKey) -> CryptoResult<Vec<u8>> {
    let (header, ciphertext) = parse_header(sealed)?;

    let ours = private_key.public_key().fingerprint();
    if header.recipient != ours {
        return Err(CryptoError::NotAddressedToUs(header.recipient.to_string()));
    }

    let key = derive_for_open(&private_key.to_x25519(), &header.ephemeral_pubkey)?;
    decrypt_body(&key, &header.nonce, ciphertext)
}

/// Seal UTF-8 text and return it as base64, the form carried in chat messages.
pub fn seal_text(plaintext: &str, recipient: &PublicKey) -> CryptoResult<String> {
    Ok(base64_encode(&seal(plaintext.as_bytes(), recipient)?))
}

/// Open a base64 sealed payload and decode it as UTF-8 text.
pub fn open_text(encoded: &str, private_key: &PrivateKey) -> CryptoResult<String> {
    let sealed = base64_decode(encoded)?;
    let plaintext = open(&sealed, private_key)?;
    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decryption("Plaintext is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    #[test]
    fn test_seal_open_roundtrip() {
        let bob = Keypair::generate();
        let sealed = seal(b"Hello, Bob!", &bob.public).unwrap();
        let opened = open(&sealed, &bob.private).unwrap();

        assert_eq!(opened, b"Hello, Bob!");
    }

    #[test]
    fn test_open_wrong_key() {
        let bob = Keypair::generate();
        let eve = Keypair::generate();

        let sealed = seal(b"Secret for Bob only", &bob.public).unwrap();
        let result = open(&sealed, &eve.private);

        assert!(matches!(result, Err(CryptoError::NotAddressedToUs(_))));
    }

    #[test]
    fn test_open_forged_recipient_still_fails() {
        let bob = Keypair::generate();
        let eve = Keypair::generate();

        // Rewrite the header so it names Eve; the key agreement still targets Bob.
        let sealed = seal(b"Secret for Bob only", &bob.public).unwrap();
        let (mut header, ciphertext) = parse_header(&sealed).unwrap();
        header.recipient = eve.public.fingerprint();
        let mut forged = serialize_header(&header).unwrap();
        forged.extend_from_slice(ciphertext);

        let result = open(&forged, &eve.private);
        assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn test_tamper_detection() {
        let bob = Keypair::generate();
        let mut sealed = seal(b"Important data", &bob.public).unwrap();

        let len = sealed.len();
        sealed[len - 1] ^= 0xFF;

        assert!(matches!(
            open(&sealed, &bob.private),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_seal_empty_plaintext() {
        let bob = Keypair::generate();
        let sealed = seal(b"", &bob.public).unwrap();
        assert!(open(&sealed, &bob.private).unwrap().is_empty());
    }

    #[test]
    fn test_different_seals_different_output() {
        let bob = Keypair::generate();

        let sealed1 = seal(b"Same message", &bob.public).unwrap();
        let sealed2 = seal(b"Same message", &bob.public).unwrap();

        assert_ne!(sealed1, sealed2);
        assert_eq!(
            open(&sealed1, &bob.private).unwrap(),
            open(&sealed2, &bob.private).unwrap()
        );
    }

    #[test]
    fn test_text_roundtrip_unicode() {
        let bob = Keypair::generate();
        let encoded = seal_text("ciao, ¿qué tal? 🔐", &bob.public).unwrap();
        assert_eq!(open_text(&encoded, &bob.private).unwrap(), "ciao, ¿qué tal? 🔐");
    }

    #[test]
    fn test_open_text_rejects_non_base64() {
        let bob = Keypair::generate();
        let result = open_text("hello bob, this is not sealed", &bob.private);
        assert!(matches!(result, Err(CryptoError::InvalidBase64(_))));
    }
}
