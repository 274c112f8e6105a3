//! ciphertalk-relay: reference relay server.
//!
//! Stores announced public keys and fans frames out between connected
//! clients. Ctrl-C sends `disconnect` to everyone and exits.

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use ciphertalk_client::relay::{serve, Broker};
use ciphertalk_client::{telemetry, RelayConfig};

#[derive(Parser)]
#[command(name = "ciphertalk-relay")]
#[command(author, version, about = "Relay server for ciphertalk clients")]
struct Cli {
    /// Address to listen on (host:port)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = telemetry::init(
        "ciphertalk_relay=info,ciphertalk_client=info,ciphertalk_core=info",
        "ciphertalk-relay.log",
    );

    let cli = Cli::parse();
    let mut config = RelayConfig::from_env();
    if let Some(bind) = cli.bind {
        config = config.with_bind_addr(bind);
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    let broker = Broker::new();
    serve(listener, broker.clone(), async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C");
    })
    .await?;

    info!(user_count = broker.user_count().await, "Relay stopped");
    Ok(())
}
