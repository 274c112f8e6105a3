//! User-facing output.
//!
//! The client emits [`Notice`] values instead of printing; the binary renders
//! them with `Display`. Tests assert on the variants.

use std::fmt;

use ciphertalk_crypto::Fingerprint;

/// One line of console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Connected,
    Welcome { username: String },
    UsersInChat(usize),
    UserJoined {
        username: String,
        fingerprint: Fingerprint,
    },

    // Confidentiality mode transitions
    SecretStarted { target: String },
    SecretEnded { target: String },
    NotChattingSecretly,

    // Integrity mode transitions
    Impersonating { username: String },
    NoSuchUser { username: String },
    IdentityRestored { username: String },

    // Received messages
    Chat { sender: String, text: String },
    Secret { sender: String, text: String },
    SecretForOther { sender: String, target: String },
    Undecryptable { sender: String },
    KeyNotFound { sender: String },
    VerificationFailed { sender: String },

    /// An outgoing message was rejected before transmission.
    SendFailed { reason: String },

    ServerDisconnected,
    Exiting,
}

impl Notice {
    /// Warnings are rendered on stderr by the binary.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Notice::NoSuchUser { .. }
                | Notice::Undecryptable { .. }
                | Notice::KeyNotFound { .. }
                | Notice::VerificationFailed { .. }
                | Notice::SendFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Connected => write!(f, "Connected to the server"),
            Notice::Welcome { username } => write!(f, "Welcome, {} to the chat", username),
            Notice::UsersInChat(n) => write!(f, "There are currently {} users in the chat", n),
            Notice::UserJoined {
                username,
                fingerprint,
            } => write!(f, "{} joined the chat ({})", username, fingerprint),
            Notice::SecretStarted { target } => write!(f, "Now secretly chatting with {}", target),
            Notice::SecretEnded { target } => {
                write!(f, "No more secretly chatting with {}", target)
            }
            Notice::NotChattingSecretly => write!(f, "You are not secretly chatting with anyone"),
            Notice::Impersonating { username } => write!(f, "impersonating {}", username),
            Notice::NoSuchUser { username } => write!(f, "No such user \"{}\" exists.", username),
            Notice::IdentityRestored { username } => write!(f, "Now you are {}", username),
            Notice::Chat { sender, text } => write!(f, "{}: {}", sender, text),
            Notice::Secret { sender, text } => write!(f, "{} (secret): {}", sender, text),
            Notice::SecretForOther { sender, target } => {
                write!(f, "{} sent a secret message to {}", sender, target)
            }
            Notice::Undecryptable { sender } => write!(
                f,
                "Error: Secret message from {} could not be decrypted.",
                sender
            ),
            Notice::KeyNotFound { sender } => write!(
                f,
                "Warning: Public key for {} not found. This user may be fake.",
                sender
            ),
            Notice::VerificationFailed { sender } => write!(
                f,
                "Warning: Message from {} failed verification. This user may be fake.",
                sender
            ),
            Notice::SendFailed { reason } => write!(f, "Error: {}", reason),
            Notice::ServerDisconnected => write!(f, "Server disconnected, Exiting..."),
            Notice::Exiting => write!(f, "Exiting..."),
        }
    }
}
