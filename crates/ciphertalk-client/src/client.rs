//! Chat client actor.
//!
//! One task owns the identity, key registry and session mode and `select!`s
//! over input lines, relay frames and a shutdown signal. Nothing is shared,
//! so nothing is locked.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use ciphertalk_core::{
    ClientFrame, Departure, Envelope, Error, Identity, KeyAnnouncement, KeyRegistry,
    MessageCodec, Notice, Outcome, RelayFrame, Result, SessionModeController, Variant,
    Verification,
};

use crate::relay::RelayLink;

/// Why the client loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Relay sent `disconnect` or went away.
    Disconnected,
    /// Shutdown signal (Ctrl-C).
    Interrupted,
    /// Input source closed.
    InputClosed,
}

/// A single chat participant.
pub struct ChatClient {
    identity: Identity,
    registry: KeyRegistry,
    session: SessionModeController,
    notices: mpsc::Sender<Notice>,
}

impl ChatClient {
    pub fn new(identity: Identity, variant: Variant, notices: mpsc::Sender<Notice>) -> Self {
        let session = SessionModeController::new(variant, identity.username());
        Self {
            identity,
            registry: KeyRegistry::new(),
            session,
            notices,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn session(&self) -> &SessionModeController {
        &self.session
    }

    /// Register with the relay, then process input and relay frames until the
    /// relay disconnects, input closes or `shutdown` resolves.
    #[instrument(skip_all, fields(username = %self.identity.username(), variant = %self.session.variant()))]
    pub async fn run<F>(
        mut self,
        link: RelayLink,
        mut input: mpsc::Receiver<String>,
        shutdown: F,
    ) -> Result<Exit>
    where
        F: Future<Output = ()>,
    {
        let RelayLink {
            outbound,
            mut inbound,
        } = link;
        tokio::pin!(shutdown);

        outbound
            .send(ClientFrame::RegisterPublicKey(self.identity.announcement()))
            .await
            .map_err(|_| Error::RelayDisconnected("relay link closed before register".into()))?;
        info!(fingerprint = %self.identity.fingerprint(), "Registered public key");
        self.notify(Notice::Welcome {
            username: self.identity.username().to_string(),
        })
        .await;

        let exit = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    self.leave(&outbound).await;
                    self.notify(Notice::Exiting).await;
                    break Exit::Interrupted;
                }
                frame = inbound.recv() => {
                    let Some(frame) = frame else {
                        info!("Relay link closed");
                        self.notify(Notice::ServerDisconnected).await;
                        break Exit::Disconnected;
                    };
                    match self.handle_frame(frame).await {
                        Ok(()) => {}
                        Err(e) if e.is_fatal() => {
                            info!(error = %e, "Relay ended the session");
                            self.notify(Notice::ServerDisconnected).await;
                            break Exit::Disconnected;
                        }
                        Err(e) => warn!(error = %e, "Failed to handle relay frame"),
                    }
                }
                line = input.recv() => {
                    let Some(line) = line else {
                        self.leave(&outbound).await;
                        break Exit::InputClosed;
                    };
                    if let Err(e) = self.handle_line(&line, &outbound).await {
                        if e.is_fatal() {
                            self.notify(Notice::ServerDisconnected).await;
                            break Exit::Disconnected;
                        }
                        warn!(error = %e, "Failed to handle input line");
                    }
                }
            }
        };

        debug!(?exit, "Client loop finished");
        Ok(exit)
    }

    /// Apply one line of user input.
    ///
    /// Per-message failures (unknown recipient) are reported as notices and
    /// return `Ok`. Only a closed relay link is an error.
    pub async fn handle_line(
        &mut self,
        line: &str,
        outbound: &mpsc::Sender<ClientFrame>,
    ) -> Result<()> {
        let outcome = match self.session.handle_line(line, &self.registry) {
            Some(outcome) => outcome,
            None => return Ok(()),
        };

        let (dispatch, text) = match outcome {
            Outcome::Notice(notice) => {
                self.notify(notice).await;
                return Ok(());
            }
            Outcome::Send { dispatch, text } => (dispatch, text),
        };

        let codec = MessageCodec::new(&self.identity, &self.registry);
        let envelope = match codec.outgoing(&dispatch, &text) {
            Ok(envelope) => envelope,
            Err(Error::RecipientUnknown(target)) => {
                warn!(recipient = %target, "No public key for recipient, message not sent");
                self.notify(Notice::SendFailed {
                    reason: format!("Target user \"{}\" not found, message not sent.", target),
                })
                .await;
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "Failed to prepare message");
                self.notify(Notice::SendFailed {
                    reason: e.to_string(),
                })
                .await;
                return Ok(());
            }
        };

        outbound
            .send(ClientFrame::Message(envelope.to_wire()))
            .await
            .map_err(|_| Error::RelayDisconnected("relay link closed".into()))
    }

    /// Apply one relay frame.
    ///
    /// Returns [`Error::RelayDisconnected`] for `disconnect`; everything else
    /// is handled locally.
    pub async fn handle_frame(&mut self, frame: RelayFrame) -> Result<()> {
        match frame {
            RelayFrame::Init(entries) => {
                self.registry.initialize(entries);
                info!(
                    user_count = self.registry.len(),
                    users = ?self.registry.usernames(),
                    "Received key snapshot"
                );
                self.notify(Notice::UsersInChat(self.registry.len())).await;
            }
            RelayFrame::NewUser(KeyAnnouncement {
                username,
                public_key,
            }) => {
                let fingerprint = public_key.fingerprint();
                if self.registry.register(username.clone(), public_key).is_some() {
                    debug!(username = %username, "Replaced registered key");
                }
                info!(username = %username, fingerprint = %fingerprint, "User joined");
                self.notify(Notice::UserJoined {
                    username,
                    fingerprint,
                })
                .await;
            }
            RelayFrame::Message(wire) => match Envelope::from_wire(wire, self.session.variant()) {
                Ok(envelope) => self.receive(envelope).await,
                Err(e) => warn!(error = %e, "Dropping malformed message"),
            },
            RelayFrame::Disconnect => {
                return Err(Error::RelayDisconnected("relay sent disconnect".into()));
            }
        }
        Ok(())
    }

    async fn receive(&self, envelope: Envelope) {
        let me = self.identity.username();
        match envelope {
            Envelope::Plain { sender, text } => {
                if sender != me {
                    self.notify(Notice::Chat { sender, text }).await;
                }
            }
            Envelope::Encrypted {
                sender,
                target,
                ciphertext,
            } => {
                if sender == me {
                    return;
                }
                if target != me {
                    debug!(sender = %sender, recipient = %target, "Secret for another user");
                    self.notify(Notice::SecretForOther { sender, target }).await;
                    return;
                }
                let codec = MessageCodec::new(&self.identity, &self.registry);
                match codec.decrypt(&ciphertext) {
                    Ok(text) => self.notify(Notice::Secret { sender, text }).await,
                    Err(e) => {
                        warn!(sender = %sender, error = %e, "Secret message could not be decrypted");
                        self.notify(Notice::Undecryptable { sender }).await;
                    }
                }
            }
            Envelope::Signed {
                sender,
                text,
                signature,
            } => {
                let codec = MessageCodec::new(&self.identity, &self.registry);
                let verdict = codec.verify(&text, &signature, &sender);
                match verdict {
                    Verification::Valid => {}
                    Verification::Invalid => {
                        self.notify(Notice::VerificationFailed {
                            sender: sender.clone(),
                        })
                        .await;
                    }
                    Verification::Unverifiable => {
                        self.notify(Notice::KeyNotFound {
                            sender: sender.clone(),
                        })
                        .await;
                    }
                }
                if let Err(e) = verdict.into_result(&sender) {
                    warn!(sender = %sender, error = %e, "Untrusted message");
                }
                self.notify(Notice::Chat { sender, text }).await;
            }
        }
    }

    async fn leave(&self, outbound: &mpsc::Sender<ClientFrame>) {
        let departure = ClientFrame::Leave(Departure {
            username: self.identity.username().to_string(),
        });
        if outbound.send(departure).await.is_err() {
            debug!("Relay link already closed, leave not sent");
        }
    }

    async fn notify(&self, notice: Notice) {
        // Nobody listening is fine: output is best-effort.
        let _ = self.notices.send(notice).await;
    }
}
