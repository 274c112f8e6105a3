//! Addressing mode state machine.
//!
//! ```text
//! confidentiality:  Broadcast ──!secret u──▶ Directed(u) ──!exit──▶ Broadcast
//!                                            Directed(u) ──!secret v──▶ Directed(v)
//!
//! integrity:        Sending(me) ──!impersonate u (registered)──▶ Sending(u)
//!                   Sending(_)  ──!exit──▶ Sending(me)
//! ```
//!
//! The controller decides *how* chat text is sent ([`Dispatch`]); the codec
//! does the sealing or signing.

use tracing::debug;

use crate::command::{self, Command};
use crate::notice::Notice;
use crate::protocol::Variant;
use crate::registry::KeyRegistry;

/// Current addressing mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Plaintext to everyone.
    Broadcast,
    /// Sealed to one user.
    Directed { target: String },
    /// Signed, claiming to be `as_username`.
    Sending { as_username: String },
}

/// How a chat line leaves the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Plain,
    EncryptTo(String),
    SignAs(String),
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Chat text to transmit.
    Send { dispatch: Dispatch, text: String },
    /// Mode changed (or was reported); nothing to transmit.
    Notice(Notice),
}

/// Per-client addressing state.
#[derive(Debug, Clone)]
pub struct SessionModeController {
    variant: Variant,
    registered: String,
    mode: SessionMode,
}

impl SessionModeController {
    pub fn new(variant: Variant, registered_username: impl Into<String>) -> Self {
        let registered = registered_username.into();
        let mode = match variant {
            Variant::Confidentiality => SessionMode::Broadcast,
            Variant::Integrity => SessionMode::Sending {
                as_username: registered.clone(),
            },
        };
        Self {
            variant,
            registered,
            mode,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn registered_username(&self) -> &str {
        &self.registered
    }

    /// Parse `line` with this session's grammar and apply it.
    ///
    /// Returns `None` for blank lines.
    pub fn handle_line(&mut self, line: &str, registry: &KeyRegistry) -> Option<Outcome> {
        command::parse(line, self.variant).map(|cmd| self.apply(cmd, registry))
    }

    /// Apply a parsed command.
    ///
    /// `!impersonate` is checked against `registry`; `!secret` is not, so a
    /// secret to an unknown user fails later, at send time.
    pub fn apply(&mut self, command: Command, registry: &KeyRegistry) -> Outcome {
        match (self.variant, command) {
            (Variant::Confidentiality, Command::Secret(target)) => {
                debug!(recipient = %target, "Directed mode");
                self.mode = SessionMode::Directed {
                    target: target.clone(),
                };
                Outcome::Notice(Notice::SecretStarted { target })
            }
            (Variant::Confidentiality, Command::Exit) => {
                match std::mem::replace(&mut self.mode, SessionMode::Broadcast) {
                    SessionMode::Directed { target } => {
                        debug!(recipient = %target, "Broadcast mode");
                        Outcome::Notice(Notice::SecretEnded { target })
                    }
                    _ => Outcome::Notice(Notice::NotChattingSecretly),
                }
            }
            (Variant::Integrity, Command::Impersonate(username)) => {
                if registry.contains(&username) {
                    debug!(username = %username, "Impersonating");
                    self.mode = SessionMode::Sending {
                        as_username: username.clone(),
                    };
                    Outcome::Notice(Notice::Impersonating { username })
                } else {
                    Outcome::Notice(Notice::NoSuchUser { username })
                }
            }
            (Variant::Integrity, Command::Exit) => {
                self.mode = SessionMode::Sending {
                    as_username: self.registered.clone(),
                };
                Outcome::Notice(Notice::IdentityRestored {
                    username: self.registered.clone(),
                })
            }
            (_, Command::Chat(text)) => Outcome::Send {
                dispatch: self.dispatch(),
                text,
            },
            // Commands from the other variant's grammar are plain content here.
            (_, Command::Secret(user)) => Outcome::Send {
                dispatch: self.dispatch(),
                text: format!("!secret {}", user),
            },
            (_, Command::Impersonate(user)) => Outcome::Send {
                dispatch: self.dispatch(),
                text: format!("!impersonate {}", user),
            },
        }
    }

    /// How chat text is sent in the current mode.
    pub fn dispatch(&self) -> Dispatch {
        match &self.mode {
            SessionMode::Broadcast => Dispatch::Plain,
            SessionMode::Directed { target } => Dispatch::EncryptTo(target.clone()),
            SessionMode::Sending { as_username } => Dispatch::SignAs(as_username.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphertalk_crypto::Keypair;

    fn registry_with(names: &[&str]) -> KeyRegistry {
        let mut registry = KeyRegistry::new();
        for name in names {
            registry.register(*name, Keypair::generate().public);
        }
        registry
    }

    #[test]
    fn test_confidentiality_initial_state() {
        let session = SessionModeController::new(Variant::Confidentiality, "alice");
        assert_eq!(session.mode(), &SessionMode::Broadcast);
        assert_eq!(session.dispatch(), Dispatch::Plain);
    }

    #[test]
    fn test_secret_then_exit() {
        let registry = registry_with(&["alice", "bob"]);
        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");

        assert_eq!(
            session.handle_line("!secret bob", &registry),
            Some(Outcome::Notice(Notice::SecretStarted {
                target: "bob".into()
            }))
        );
        assert_eq!(session.dispatch(), Dispatch::EncryptTo("bob".into()));

        assert_eq!(
            session.handle_line("hi bob", &registry),
            Some(Outcome::Send {
                dispatch: Dispatch::EncryptTo("bob".into()),
                text: "hi bob".into()
            })
        );

        assert_eq!(
            session.handle_line("!exit", &registry),
            Some(Outcome::Notice(Notice::SecretEnded {
                target: "bob".into()
            }))
        );
        assert_eq!(session.mode(), &SessionMode::Broadcast);
    }

    #[test]
    fn test_secret_does_not_check_registry() {
        let registry = KeyRegistry::new();
        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");

        session.handle_line("!secret ghost", &registry);
        assert_eq!(
            session.mode(),
            &SessionMode::Directed {
                target: "ghost".into()
            }
        );
    }

    #[test]
    fn test_secret_retargets() {
        let registry = KeyRegistry::new();
        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");

        session.handle_line("!secret bob", &registry);
        session.handle_line("!secret carol", &registry);
        assert_eq!(session.dispatch(), Dispatch::EncryptTo("carol".into()));
    }

    #[test]
    fn test_exit_in_broadcast_is_noop() {
        let registry = KeyRegistry::new();
        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");

        assert_eq!(
            session.handle_line("!exit", &registry),
            Some(Outcome::Notice(Notice::NotChattingSecretly))
        );
        assert_eq!(session.mode(), &SessionMode::Broadcast);
    }

    #[test]
    fn test_blank_line_ignored() {
        let registry = KeyRegistry::new();
        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");
        assert_eq!(session.handle_line("   ", &registry), None);
    }

    #[test]
    fn test_impersonate_registered() {
        let registry = registry_with(&["alice", "bob"]);
        let mut session = SessionModeController::new(Variant::Integrity, "alice");
        assert_eq!(session.dispatch(), Dispatch::SignAs("alice".into()));

        assert_eq!(
            session.handle_line("!impersonate bob", &registry),
            Some(Outcome::Notice(Notice::Impersonating {
                username: "bob".into()
            }))
        );
        assert_eq!(
            session.mode(),
            &SessionMode::Sending {
                as_username: "bob".into()
            }
        );
    }

    #[test]
    fn test_impersonate_unregistered_rejected() {
        let registry = registry_with(&["alice"]);
        let mut session = SessionModeController::new(Variant::Integrity, "alice");

        assert_eq!(
            session.handle_line("!impersonate carol", &registry),
            Some(Outcome::Notice(Notice::NoSuchUser {
                username: "carol".into()
            }))
        );
        assert_eq!(session.dispatch(), Dispatch::SignAs("alice".into()));
    }

    #[test]
    fn test_exit_restores_registered() {
        let registry = registry_with(&["alice", "bob"]);
        let mut session = SessionModeController::new(Variant::Integrity, "alice");

        session.handle_line("!impersonate bob", &registry);
        assert_eq!(
            session.handle_line("!exit", &registry),
            Some(Outcome::Notice(Notice::IdentityRestored {
                username: "alice".into()
            }))
        );
        assert_eq!(session.dispatch(), Dispatch::SignAs("alice".into()));
        assert_eq!(session.registered_username(), "alice");
    }

    #[test]
    fn test_foreign_commands_are_content() {
        let registry = registry_with(&["bob"]);

        let mut session = SessionModeController::new(Variant::Integrity, "alice");
        assert_eq!(
            session.apply(Command::Secret("bob".into()), &registry),
            Outcome::Send {
                dispatch: Dispatch::SignAs("alice".into()),
                text: "!secret bob".into()
            }
        );

        let mut session = SessionModeController::new(Variant::Confidentiality, "alice");
        assert_eq!(
            session.handle_line("!impersonate bob", &registry),
            Some(Outcome::Send {
                dispatch: Dispatch::Plain,
                text: "!impersonate bob".into()
            })
        );
    }
}
