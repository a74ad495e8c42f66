mod args;
mod ble;

use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use home_sense::{
    config::{HubConfig, LocalSettings},
    logger,
    scan::ScanListener,
    uploader::Uploader,
};
use log::{error, info, warn};

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
    let config = HubConfig::from_settings(
        settings.hub.or(args.hub_settings()),
        Duration::from_secs(args.upload_timeout_secs),
    )
    .context("invalid hub configuration")?;

    if config.api_key.is_empty() {
        warn!("API key is not configured, readings will not be uploaded");
    }

    let uploader = Uploader::new(
        config.server_base_url.as_str(),
        config.api_key.as_str(),
        config.upload_timeout,
    )?;

    info!(
        "relaying {} to {} as {}",
        config.device_address,
        uploader.endpoint(&config.room_id),
        config.room_id
    );

    let listener = Arc::new(ScanListener::new(
        config.device_address,
        config.room_id,
        uploader,
    ));

    ble::scan(listener, tokio::signal::ctrl_c())
        .await
        .context("BLE scan failed")
}
