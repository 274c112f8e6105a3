//! Integration tests for ciphertalk key material, sealing and signatures.
//!
//! This test suite validates:
//! - Sealing correctness (seal/open roundtrips, recipient binding)
//! - Signature correctness (valid, wrong message, wrong key)
//! - Wire forms (base64 public keys, base64 sealed text, fingerprints)
//! - Error handling for malformed input

use ciphertalk_crypto::seal_format::parse_header;
use ciphertalk_crypto::{
    base64_encode, is_sealed, open, open_text, seal, seal_text, sign_text, verify_text,
    CryptoError, Fingerprint, Keypair, PublicKey, MAGIC_BYTES,
};

// ============================================================================
// Test Category 1: Sealing
// ============================================================================

#[test]
fn test_seal_open_roundtrip_text() {
    let bob = Keypair::generate();
    let message = "This is a secret message that only bob should read.";

    let encoded = seal_text(message, &bob.public).unwrap();
    let decoded = open_text(&encoded, &bob.private).unwrap();

    assert_eq!(message, decoded);
}

#[test]
fn test_only_recipient_can_open() {
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    let carol = Keypair::generate();

    let encoded = seal_text("bob only", &bob.public).unwrap();

    assert_eq!(open_text(&encoded, &bob.private).unwrap(), "bob only");
    assert!(matches!(
        open_text(&encoded, &carol.private),
        Err(CryptoError::NotAddressedToUs(_))
    ));
    assert!(open_text(&encoded, &alice.private).is_err());
}

#[test]
fn test_sealed_bytes_carry_magic_and_recipient() {
    let bob = Keypair::generate();
    let sealed = seal(b"payload", &bob.public).unwrap();

    assert!(is_sealed(&sealed));
    assert_eq!(&sealed[..8], MAGIC_BYTES);
    let (header, _) = parse_header(&sealed).unwrap();
    assert_eq!(header.recipient, bob.public.fingerprint());
}

#[test]
fn test_sealed_text_does_not_contain_plaintext() {
    let bob = Keypair::generate();
    let encoded = seal_text("launch codes 1234", &bob.public).unwrap();
    assert!(!encoded.contains("launch codes"));
}

#[test]
fn test_open_plain_base64_is_format_error() {
    let bob = Keypair::generate();
    let not_sealed = base64_encode(b"just some text that was never sealed");

    assert!(matches!(
        open_text(&not_sealed, &bob.private),
        Err(CryptoError::InvalidFormat(_))
    ));
}

#[test]
fn test_open_truncated_payload() {
    let bob = Keypair::generate();
    let sealed = seal(b"payload", &bob.public).unwrap();

    assert!(open(&sealed[..sealed.len() / 2], &bob.private).is_err());
}

#[test]
fn test_large_message() {
    let bob = Keypair::generate();
    let message = "x".repeat(64 * 1024);

    let encoded = seal_text(&message, &bob.public).unwrap();
    assert_eq!(open_text(&encoded, &bob.private).unwrap(), message);
}

// ============================================================================
// Test Category 2: Signatures
// ============================================================================

#[test]
fn test_sign_verify_text() {
    let alice = Keypair::generate();
    let signature = sign_text("hello from alice", &alice.private);

    assert!(verify_text("hello from alice", &signature, &alice.public).is_ok());
}

#[test]
fn test_signature_for_other_message_rejected() {
    let alice = Keypair::generate();
    let signature = sign_text("first message", &alice.private);

    assert!(matches!(
        verify_text("second message", &signature, &alice.public),
        Err(CryptoError::BadSignature)
    ));
}

#[test]
fn test_signature_bound_to_key() {
    let alice = Keypair::generate();
    let mallory = Keypair::generate();

    // Mallory signs and claims to be alice.
    let signature = sign_text("transfer everything", &mallory.private);

    assert!(verify_text("transfer everything", &signature, &alice.public).is_err());
    assert!(verify_text("transfer everything", &signature, &mallory.public).is_ok());
}

// ============================================================================
// Test Category 3: Wire forms
// ============================================================================

#[test]
fn test_public_key_wire_roundtrip() {
    let kp = Keypair::generate();

    let wire = kp.public.to_base64();
    let parsed = PublicKey::from_base64(&wire).unwrap();

    assert_eq!(kp.public, parsed);
    assert_eq!(kp.public.fingerprint(), parsed.fingerprint());
}

#[test]
fn test_public_key_json_is_base64_string() {
    let kp = Keypair::generate();
    let json = serde_json::to_string(&kp.public).unwrap();

    assert_eq!(json, format!("\"{}\"", kp.public.to_base64()));
}

#[test]
fn test_fingerprint_roundtrip() {
    let kp = Keypair::generate();
    let fp = kp.public.fingerprint();

    let parsed: Fingerprint = fp.to_string().parse().unwrap();
    assert_eq!(fp, parsed);
}
