//! Client and relay configuration.
//!
//! Values come from the environment (after `.env` is loaded) and can be
//! overridden by command-line flags in the binaries.

use ciphertalk_core::defaults::{
    ENV_RELAY_ADDR, ENV_RELAY_BIND, ENV_USERNAME, ENV_VARIANT, RELAY_ADDR, RELAY_BIND,
};
use ciphertalk_core::{is_valid_username, Error, Result, Variant};

/// Configuration for the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Relay `host:port`.
    pub relay_addr: String,
    /// Username to register. Prompted for when absent.
    pub username: Option<String>,
    /// Which sub-protocol to run.
    pub variant: Variant,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_addr: RELAY_ADDR.to_string(),
            username: None,
            variant: Variant::default(),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `CIPHERTALK_RELAY_ADDR` | `127.0.0.1:3000` | Relay to connect to |
    /// | `CIPHERTALK_USERNAME` | (prompt) | Username to register |
    /// | `CIPHERTALK_VARIANT` | `confidentiality` | `confidentiality` or `integrity` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let relay_addr = lookup(ENV_RELAY_ADDR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| RELAY_ADDR.to_string());

        let username = lookup(ENV_USERNAME)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let variant = match lookup(ENV_VARIANT) {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => Variant::default(),
        };

        let config = Self {
            relay_addr,
            username,
            variant,
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the relay address.
    pub fn with_relay_addr(mut self, addr: impl Into<String>) -> Self {
        self.relay_addr = addr.into();
        self
    }

    /// Override the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Override the variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Reject usernames outside the `\w+` grammar.
    pub fn validate(&self) -> Result<()> {
        match &self.username {
            Some(name) if !is_valid_username(name) => Err(Error::InvalidUsername(name.clone())),
            _ => Ok(()),
        }
    }
}

/// Configuration for the relay server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address to listen on.
    pub bind_addr: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: RELAY_BIND.to_string(),
        }
    }
}

impl RelayConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `CIPHERTALK_RELAY_BIND` | `127.0.0.1:3000` | Listen address |
    pub fn from_env() -> Self {
        let bind_addr = std::env::var(ENV_RELAY_BIND)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| RELAY_BIND.to_string());
        Self { bind_addr }
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}
