//! Structured logging schema and field name constants for ciphertalk.
//!
//! Every crate uses these names for its structured `tracing` fields so logs
//! from clients and the relay can be queried the same way.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Session cannot continue (relay unreachable, bind failure) |
//! | WARN  | Per-message failure: undecryptable, bad signature, malformed frame |
//! | INFO  | Lifecycle events (connect, register, join, leave, shutdown) |
//! | DEBUG | Mode transitions, frame routing decisions |
//! | TRACE | Per-frame I/O |
//!
//! Private keys and decrypted plaintext are never logged. Keys appear only
//! as fingerprints.

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "client", "relay", "core"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "broker", "tcp", "session", "codec"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "register", "send", "receive", "fan_out"
pub const OPERATION: &str = "op";

// ─── Participant fields ────────────────────────────────────────────────────

/// Username registered by the local client.
pub const USERNAME: &str = "username";

/// Username embedded in a received message.
pub const SENDER: &str = "sender";

/// Username a secret message is addressed to.
pub const RECIPIENT: &str = "recipient";

/// Public key fingerprint (`ct:...`).
pub const FINGERPRINT: &str = "fingerprint";

/// Protocol variant ("confidentiality", "integrity").
pub const VARIANT: &str = "variant";

// ─── Relay fields ──────────────────────────────────────────────────────────

/// Relay event name ("init", "newUser", "message", ...).
pub const EVENT: &str = "event";

/// Broker-assigned connection number.
pub const CONNECTION_ID: &str = "connection_id";

/// Remote socket address.
pub const PEER_ADDR: &str = "peer_addr";

/// Number of registered users.
pub const USER_COUNT: &str = "user_count";

/// Sorted usernames known to a client's key registry.
pub const USERS: &str = "users";

/// Byte length of a frame.
pub const FRAME_LEN: &str = "frame_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
