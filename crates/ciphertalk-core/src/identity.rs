//! Local identity: the registered username and the only copy of the keypair.
//!
//! The private key never leaves this type. Callers sign and open through it
//! and get the public half for announcements.

use ciphertalk_crypto::{open_text, sign_text, Fingerprint, Keypair, PublicKey};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::protocol::KeyAnnouncement;

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").unwrap());

/// Whether `name` is a valid username (`\w+`).
pub fn is_valid_username(name: &str) -> bool {
    USERNAME_RE.is_match(name)
}

/// This process's identity.
pub struct Identity {
    username: String,
    keypair: Keypair,
}

impl Identity {
    /// Generate a fresh keypair for `username`.
    pub fn generate(username: impl Into<String>) -> Result<Self> {
        Self::with_keypair(username, Keypair::generate())
    }

    /// Bind an existing keypair to `username`.
    pub fn with_keypair(username: impl Into<String>, keypair: Keypair) -> Result<Self> {
        let username = username.into();
        if !is_valid_username(&username) {
            return Err(Error::InvalidUsername(username));
        }
        Ok(Self { username, keypair })
    }

    /// The registered username. Never changes, even while impersonating.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.keypair.public.fingerprint()
    }

    /// `registerPublicKey` payload for this identity.
    pub fn announcement(&self) -> KeyAnnouncement {
        KeyAnnouncement {
            username: self.username.clone(),
            public_key: self.keypair.public,
        }
    }

    /// Base64 signature over `message`.
    pub fn sign(&self, message: &str) -> String {
        sign_text(message, &self.keypair.private)
    }

    /// Open a base64 sealed payload addressed to us.
    pub fn open(&self, ciphertext: &str) -> Result<String> {
        open_text(ciphertext, &self.keypair.private)
            .map_err(|e| Error::DecryptFailure(e.to_string()))
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("fingerprint", &self.fingerprint())
            .field("private", &"[REDACTED]")
            .finish()
    }
}
