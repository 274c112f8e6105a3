//! Per-client directory of username → public key.
//!
//! Filled wholesale from the relay's `init` snapshot and extended by `newUser`
//! announcements. Entries are never removed during a session.

use std::collections::HashMap;

use ciphertalk_crypto::PublicKey;

use crate::error::{Error, Result};

/// Username → public key mapping. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: HashMap<String, PublicKey>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry with a snapshot.
    ///
    /// Duplicate usernames keep the last entry.
    pub fn initialize<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, PublicKey)>,
    {
        self.keys = entries.into_iter().collect();
    }

    /// Insert or overwrite a single entry. Returns the key it replaced.
    pub fn register(&mut self, username: impl Into<String>, key: PublicKey) -> Option<PublicKey> {
        self.keys.insert(username.into(), key)
    }

    /// Public key for `username`, or [`Error::RegistryMiss`].
    pub fn lookup(&self, username: &str) -> Result<PublicKey> {
        self.keys
            .get(username)
            .copied()
            .ok_or_else(|| Error::RegistryMiss(username.to_string()))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.keys.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Registered usernames, sorted.
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphertalk_crypto::Keypair;

    #[test]
    fn test_initialize_and_lookup() {
        let alice = Keypair::generate();
        let bob = Keypair::generate();

        let mut registry = KeyRegistry::new();
        registry.initialize(vec![
            ("alice".to_string(), alice.public),
            ("bob".to_string(), bob.public),
        ]);

        assert_eq!(registry.lookup("bob").unwrap(), bob.public);
        assert!(matches!(
            registry.lookup("eve"),
            Err(Error::RegistryMiss(ref name)) if name == "eve"
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_initialize_replaces_wholesale() {
        let old = Keypair::generate();
        let new = Keypair::generate();

        let mut registry = KeyRegistry::new();
        registry.register("mallory", old.public);
        registry.initialize(vec![("alice".to_string(), new.public)]);

        assert!(!registry.contains("mallory"));
        assert!(registry.contains("alice"));
    }

    #[test]
    fn test_initialize_duplicate_keeps_last() {
        let first = Keypair::generate();
        let second = Keypair::generate();

        let mut registry = KeyRegistry::new();
        registry.initialize(vec![
            ("alice".to_string(), first.public),
            ("alice".to_string(), second.public),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("alice").unwrap(), second.public);
    }

    #[test]
    fn test_register_overwrites() {
        let first = Keypair::generate();
        let second = Keypair::generate();

        let mut registry = KeyRegistry::new();
        assert!(registry.register("bob", first.public).is_none());
        assert_eq!(registry.register("bob", second.public), Some(first.public));
        assert_eq!(registry.register("bob", second.public), Some(second.public));
        assert_eq!(registry.lookup("bob").unwrap(), second.public);
    }

    #[test]
    fn test_usernames_sorted() {
        let mut registry = KeyRegistry::new();
        assert!(registry.is_empty());

        for name in ["carol", "alice", "bob"] {
            registry.register(name, Keypair::generate().public);
        }
        assert_eq!(registry.usernames(), vec!["alice", "bob", "carol"]);
    }
}
