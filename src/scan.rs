use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use log::{debug, info};
use macaddr::MacAddr6;

use crate::reading::Reading;
use crate::switchbot::decode_manufacturer_data;
use crate::uploader::Uploader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Stopped,
    Scanning,
}

/// One advertisement as delivered by the platform scanner.
#[derive(Debug, Clone, Default)]
pub struct Advertisement {
    pub manufacturer_data: HashMap<u16, Vec<u8>>,

    pub rssi: Option<i16>,
}

/// Turns advertisements from the target sensor into uploads.
///
/// Advertisements may arrive from several threads at once. The last decoded
/// reading is kept in a single cell; each upload gets a copy taken under the
/// same lock as the write.
#[derive(Debug)]
pub struct ScanListener {
    device_address: MacAddr6,
    room_id: String,
    uploader: Uploader,
    state: Mutex<ScanState>,
    latest: Mutex<Option<Reading>>,
}

impl ScanListener {
    pub fn new(device_address: MacAddr6, room_id: impl Into<String>, uploader: Uploader) -> Self {
        Self {
            device_address,
            room_id: room_id.into(),
            uploader,
            state: Mutex::new(ScanState::Stopped),
            latest: Mutex::new(None),
        }
    }

    pub fn start(&self) {
        self.set_state(ScanState::Scanning);
    }

    pub fn stop(&self) {
        self.set_state(ScanState::Stopped);
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn latest(&self) -> Option<Reading> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the readings handed to the uploader.
    pub fn on_advertisement(&self, advertisement: &Advertisement) -> Vec<Reading> {
        if self.state() != ScanState::Scanning {
            return Vec::new();
        }

        let mut dispatched = Vec::new();

        for (&company_id, data) in &advertisement.manufacturer_data {
            let reading =
                match decode_manufacturer_data(company_id, data, &self.device_address, Utc::now())
                {
                    Ok(reading) => reading,
                    Err(rejection) => {
                        debug!("ignored manufacturer data: {rejection}");
                        continue;
                    }
                };

            info!(
                "{} rssi={} temp={}C hum={}% co2={}ppm",
                reading.device_address,
                advertisement
                    .rssi
                    .map_or_else(|| "?".to_string(), |rssi| rssi.to_string()),
                reading.temperature_celsius,
                reading.humidity_percent,
                reading.co2_ppm
            );

            let snapshot = {
                let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
                latest.insert(reading).clone()
            };

            self.uploader.dispatch(self.room_id.clone(), snapshot.clone());
            dispatched.push(snapshot);
        }

        dispatched
    }

    fn set_state(&self, new_state: ScanState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != new_state {
            debug!("scan listener: {:?} -> {new_state:?}", *state);
            *state = new_state;
        }
    }
}
