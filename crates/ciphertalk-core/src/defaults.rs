//! Centralized default constants for ciphertalk.
//!
//! Binaries, the relay broker and tests reference these instead of defining
//! their own magic numbers.

// =============================================================================
// RELAY
// =============================================================================

/// Relay address clients connect to when none is configured.
pub const RELAY_ADDR: &str = "127.0.0.1:3000";

/// Address the relay binary listens on when none is configured.
pub const RELAY_BIND: &str = "127.0.0.1:3000";

/// Largest JSON frame accepted on a relay connection (1 MiB).
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Capacity of the relay broker's per-connection outbound queue.
pub const CONNECTION_QUEUE_CAPACITY: usize = 256;

/// How long the relay waits for connections to flush `disconnect` on shutdown.
pub const SHUTDOWN_GRACE_MS: u64 = 2_000;

// =============================================================================
// CLIENT
// =============================================================================

/// Capacity of the client's input, relay and notice channels.
pub const CHANNEL_CAPACITY: usize = 64;

/// Prompt shown when no username is configured.
pub const USERNAME_PROMPT: &str = "Enter your username: ";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Env var holding the relay address for clients.
pub const ENV_RELAY_ADDR: &str = "CIPHERTALK_RELAY_ADDR";

/// Env var holding the username to register.
pub const ENV_USERNAME: &str = "CIPHERTALK_USERNAME";

/// Env var selecting the protocol variant.
pub const ENV_VARIANT: &str = "CIPHERTALK_VARIANT";

/// Env var holding the relay bind address.
pub const ENV_RELAY_BIND: &str = "CIPHERTALK_RELAY_BIND";
