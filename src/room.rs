use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::{self, Reading};

/// Body of `POST /api/room/{roomId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(default)]
    pub device_address: Option<String>,

    pub co2_ppm: f64,

    pub temperature: f64,

    pub humidity: f64,

    #[serde(default)]
    pub source_timestamp: Option<DateTime<Utc>>,
}

impl RoomUpdate {
    pub fn is_in_range(&self) -> bool {
        reading::is_in_range(self.co2_ppm, self.temperature, self.humidity)
    }
}

impl From<&Reading> for RoomUpdate {
    fn from(reading: &Reading) -> Self {
        Self {
            device_address: Some(reading.device_address.to_string()),
            co2_ppm: reading.co2_ppm as f64,
            temperature: reading.temperature_celsius,
            humidity: reading.humidity_percent as f64,
            source_timestamp: Some(reading.source_timestamp),
        }
    }
}

/// Latest accepted reading for a room, as held by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub room_id: String,

    pub device_address: String,

    pub co2_ppm: f64,

    pub temperature: f64,

    pub humidity: f64,

    pub source_time: Option<DateTime<Utc>>,

    pub last_updated: DateTime<Utc>,
}

impl RoomState {
    pub fn from_update(room_id: String, update: RoomUpdate, last_updated: DateTime<Utc>) -> Self {
        Self {
            room_id,
            device_address: update.device_address.unwrap_or_default(),
            co2_ppm: update.co2_ppm,
            temperature: update.temperature,
            humidity: update.humidity,
            source_time: update.source_timestamp,
            last_updated,
        }
    }

    /// `co2,temperature,humidity`, e.g. `693,21.8,42`.
    pub fn to_csv_line(&self) -> String {
        format!("{},{},{}", self.co2_ppm, self.temperature, self.humidity)
    }
}
