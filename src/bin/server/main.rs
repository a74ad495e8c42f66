mod args;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use home_sense::{
    api::{self, AppState},
    config::{LocalSettings, first_configured},
    logger,
    store::RoomStateStore,
};
use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    logger::init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let settings = LocalSettings::load(&args.settings).context("failed to load settings")?;
    let api_key = first_configured(settings.hub.api_key, args.api_key).unwrap_or_default();

    if api_key.is_empty() {
        warn!("API key is not configured, every POST will be rejected with 401");
    }

    let store = Arc::new(RoomStateStore::new());
    let state = AppState::new(store.clone(), &api_key, args.query_format);

    let listener = TcpListener::bind((args.bind, args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.bind, args.port))?;
    info!(
        "listening on http://{} ({:?} queries)",
        listener
            .local_addr()
            .context("failed to get local address")?,
        args.query_format
    );

    api::serve(listener, state, shutdown_signal()).await?;

    info!("stopped with {} room(s): {:?}", store.rooms().len(), store.rooms());

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}
