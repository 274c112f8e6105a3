//! ciphertalk: interactive chat client.
//!
//! Connects to a relay, registers a fresh keypair and chats on stdin/stdout.
//! Logs go to stderr (or `LOG_FILE`).

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use ciphertalk_client::input::spawn_line_reader;
use ciphertalk_client::{telemetry, ChatClient, ClientConfig, RelayBridge, TcpRelay};
use ciphertalk_core::defaults::{CHANNEL_CAPACITY, USERNAME_PROMPT};
use ciphertalk_core::{is_valid_username, Identity, Notice, Variant};

#[derive(Parser)]
#[command(name = "ciphertalk")]
#[command(author, version, about = "Secure chat over a ciphertalk relay")]
struct Cli {
    /// Relay address (host:port)
    #[arg(short, long)]
    relay: Option<String>,

    /// Username to register (prompted for when omitted)
    #[arg(short, long)]
    username: Option<String>,

    /// Protocol variant: confidentiality or integrity
    #[arg(short, long)]
    variant: Option<Variant>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = telemetry::init(
        "ciphertalk=info,ciphertalk_client=info,ciphertalk_core=info",
        "ciphertalk.log",
    );

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(relay) = cli.relay {
        config = config.with_relay_addr(relay);
    }
    if let Some(username) = cli.username {
        config = config.with_username(username);
    }
    if let Some(variant) = cli.variant {
        config = config.with_variant(variant);
    }
    config.validate()?;
    info!(relay_addr = %config.relay_addr, variant = %config.variant, "Starting client");

    let relay = TcpRelay::new(config.relay_addr.clone());
    let link = relay
        .connect()
        .await
        .with_context(|| format!("Could not reach relay at {}", config.relay_addr))?;
    println!("{}", Notice::Connected);

    let (input_tx, mut input_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()), input_tx)
        .context("Failed to start stdin reader")?;

    let username = match config.username {
        Some(name) => name,
        None => prompt_username(&mut input_rx).await?,
    };
    let identity = Identity::generate(username)?;

    let (notice_tx, mut notice_rx) = mpsc::channel::<Notice>(CHANNEL_CAPACITY);
    let printer = tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            if notice.is_warning() {
                eprintln!("{}", notice);
            } else {
                println!("{}", notice);
            }
        }
    });

    let client = ChatClient::new(identity, config.variant, notice_tx);
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let exit = client.run(link, input_rx, shutdown).await?;

    // The client owned the only notice sender; wait for the printer to drain.
    // The stdin thread is detached and may still be blocked on a read.
    let _ = printer.await;
    info!(?exit, "Client exited");
    Ok(())
}

async fn prompt_username(lines: &mut mpsc::Receiver<String>) -> anyhow::Result<String> {
    loop {
        print!("{}", USERNAME_PROMPT);
        std::io::stdout().flush()?;

        let line = lines
            .recv()
            .await
            .context("stdin closed before a username was entered")?;
        let name = line.trim();
        if is_valid_username(name) {
            return Ok(name.to_string());
        }
        eprintln!("Usernames may only contain letters, digits and underscores.");
    }
}
