//! AES-256-GCM body encryption for sealed messages.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use crate::ecdh::MessageKey;
use crate::error::{CryptoError, CryptoResult};

pub const NONCE_LENGTH: usize = 12;

/// Fill an array from the OS-seeded thread RNG.
pub fn generate_random<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn body_cipher(key: &MessageKey) -> Aes256Gcm {
    // A MessageKey is always 32 bytes, which is exactly an AES-256 key.
    Aes256Gcm::new(key.as_bytes().into())
}

/// Encrypt a message body under a fresh random nonce.
///
/// Returns the nonce (stored in the seal header) and ciphertext with the
/// 16-byte tag appended.
pub fn encrypt_body(
    key: &MessageKey,
    plaintext: &[u8],
) -> CryptoResult<([u8; NONCE_LENGTH], Vec<u8>)> {
    let nonce: [u8; NONCE_LENGTH] = generate_random();
    let ciphertext = body_cipher(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption("message body encryption failed".into()))?;
    Ok((nonce, ciphertext))
}

/// Decrypt and authenticate a message body.
pub fn decrypt_body(
    key: &MessageKey,
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    body_cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption("message body failed authentication".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdh::{derive_for_seal, Ephemeral};
    use crate::keys::Keypair;

    fn message_key() -> MessageKey {
        let recipient = Keypair::generate().public.to_x25519().unwrap();
        derive_for_seal(&Ephemeral::generate(), &recipient).unwrap()
    }

    #[test]
    fn test_body_roundtrip_adds_tag() {
        let key = message_key();
        let (nonce, ciphertext) = encrypt_body(&key, b"meet at the usual place").unwrap();

        assert_eq!(ciphertext.len(), "meet at the usual place".len() + 16);
        assert_eq!(
            decrypt_body(&key, &nonce, &ciphertext).unwrap(),
            b"meet at the usual place"
        );
    }

    #[test]
    fn test_fresh_nonce_per_body() {
        let key = message_key();
        let (n1, c1) = encrypt_body(&key, b"same").unwrap();
        let (n2, c2) = encrypt_body(&key, b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_other_key_rejected() {
        let (nonce, ciphertext) = encrypt_body(&message_key(), b"for bob").unwrap();
        let result = decrypt_body(&message_key(), &nonce, &ciphertext);
        assert!(matches!(result, Err(CryptoError::Decryption(_))));
    }

    #[test]
    fn test_flipped_bit_rejected() {
        let key = message_key();
        let (nonce, mut ciphertext) = encrypt_body(&key, b"for bob").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(decrypt_body(&key, &nonce, &ciphertext).is_err());
    }
}
