//! # ciphertalk-client
//!
//! Runnable pieces around the protocol core: the [`ChatClient`] actor, relay
//! bridges ([`LocalRelay`], [`TcpRelay`]), the reference [`Broker`], and the
//! configuration and tracing setup used by the `ciphertalk` and
//! `ciphertalk-relay` binaries.

pub mod client;
pub mod config;
pub mod input;
pub mod relay;
pub mod telemetry;

pub use client::{ChatClient, Exit};
pub use config::{ClientConfig, RelayConfig};
pub use relay::{Broker, LocalRelay, RelayBridge, RelayLink, TcpRelay};
