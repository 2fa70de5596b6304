//! # homehubd: home automation hub daemon
//!
//! Composition root that wires the adapters together and runs the router.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize structured logging
//! - Register the adapter kinds this build knows about
//! - Construct the state file and daylight oracle (adapters)
//! - Bootstrap the router from the configured topology
//! - Handle graceful shutdown (SIGTERM/SIGINT), writing a final snapshot
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use homehub_adapter_statefile::JsonStateFile;
use homehub_adapter_suntimes::GoldenHour;
use homehub_app::adapter_table::AdapterKinds;
use homehub_app::bootstrap;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Adapter kinds
    let mut kinds = AdapterKinds::new();
    kinds.register(homehub_adapter_virtual::KIND, homehub_adapter_virtual::factory);

    // Persistence and daylight
    let state_store = JsonStateFile::new(&config.hub.statefile);
    tracing::info!(path = %state_store.path().display(), "using state file");
    let daylight = GoldenHour::default();

    let router = bootstrap::configure(
        config.topology(),
        &kinds,
        config.router_settings(),
        state_store,
        daylight,
    )
    .await
    .context("failed to configure hub")?;

    let shutdown = shutdown_signal().context("failed to install signal handlers")?;
    router.run(shutdown).await;

    tracing::info!("homehubd stopped");
    Ok(())
}

/// Resolves on the first SIGTERM or SIGINT.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!(signal = name, "shutting down");
    })
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to wait for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!(signal = "SIGINT", "shutting down");
    })
}
