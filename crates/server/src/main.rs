//! Slither arena session server.

use std::sync::Arc;

use server::{run_item_ticker, Config, Outbound, SessionEngine};
use tokio::sync::mpsc;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,server=debug")),
        )
        .init();

    info!("Slither Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  Name: {}", config.server.name);
    info!("  Arena half extent: {}", config.arena.half_extent);
    info!("  Orb target: {}", config.orbs.target_count);

    let period = config.orbs.replenish_interval();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outbound>();
    let engine = Arc::new(SessionEngine::new(config, Arc::new(tx))?);
    let added = engine.replenish();
    info!("Session ready with {} orbs", added);

    let ticker = tokio::spawn(run_item_ticker(Arc::clone(&engine), period));

    // The connection layer plugs in here; until then deliveries are only logged.
    let drain = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            trace!("-> {:?}: {}", outbound.recipient, outbound.message.kind());
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down ({} players connected)", engine.player_count());
    ticker.abort();
    drain.abort();

    Ok(())
}
