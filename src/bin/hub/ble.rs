use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use btleplug::{
    api::{Central, CentralEvent, Manager as _, ScanFilter},
    platform::Manager,
};
use home_sense::scan::{Advertisement, ScanListener};
use home_sense::switchbot::SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID;
use log::{info, warn};
use tokio_stream::StreamExt as _;

/// Feeds advertisements from the first Bluetooth adapter into `listener`
/// until `shutdown` resolves or the adapter stops delivering events.
pub async fn scan<F>(listener: Arc<ScanListener>, shutdown: F) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let manager = Manager::new()
        .await
        .context("failed to initialize Bluetooth manager")?;

    let adapters = manager
        .adapters()
        .await
        .context("failed to get Bluetooth adapters")?;

    let adapter = adapters
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no Bluetooth adapters found"))?;

    let mut events = adapter
        .events()
        .await
        .context("failed to subscribe to BLE events")?;

    adapter
        .start_scan(ScanFilter::default())
        .await
        .context("failed to start BLE scan")?;
    listener.start();
    info!("BLE scan started");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("failed to listen for shutdown signal")?;
                info!("shutting down");
                break;
            }
            event = events.next() => {
                let Some(event) = event else {
                    warn!("BLE event stream closed");
                    break;
                };

                let CentralEvent::ManufacturerDataAdvertisement { manufacturer_data, .. } = event
                else {
                    continue;
                };

                if let Some(advertisement) = switchbot_advertisement(manufacturer_data) {
                    listener.on_advertisement(&advertisement);
                }
            }
        }
    }

    listener.stop();
    adapter
        .stop_scan()
        .await
        .context("failed to stop BLE scan")?;

    Ok(())
}

/// Manufacturer data events carry no RSSI, and looking it up costs a round
/// trip to the Bluetooth stack per event, so it is left unset.
fn switchbot_advertisement(manufacturer_data: HashMap<u16, Vec<u8>>) -> Option<Advertisement> {
    if !manufacturer_data.contains_key(&SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID) {
        return None;
    }

    Some(Advertisement {
        manufacturer_data,
        rssi: None,
    })
}
