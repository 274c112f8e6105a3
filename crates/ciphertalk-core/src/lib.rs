//! # ciphertalk-core
//!
//! Protocol core for ciphertalk clients.
//!
//! Each client owns an [`Identity`], a [`KeyRegistry`] fed by the relay, and a
//! [`SessionModeController`] that turns input lines into [`Outcome`]s. The
//! [`MessageCodec`] seals, opens, signs and verifies payloads using the keys
//! those two hold. Relay traffic is typed by [`ClientFrame`] and [`RelayFrame`].

pub mod codec;
pub mod command;
pub mod defaults;
pub mod error;
pub mod identity;
pub mod logging;
pub mod notice;
pub mod protocol;
pub mod registry;
pub mod session;

// Re-export commonly used types at crate root
pub use codec::{MessageCodec, Verification};
pub use command::Command;
pub use error::{Error, Result};
pub use identity::{is_valid_username, Identity};
pub use notice::Notice;
pub use protocol::{
    ClientFrame, Departure, Envelope, KeyAnnouncement, RelayFrame, Variant, WireMessage,
};
pub use registry::KeyRegistry;
pub use session::{Dispatch, Outcome, SessionMode, SessionModeController};

pub use ciphertalk_crypto::{Fingerprint, PublicKey};
