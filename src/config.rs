use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use clap::ValueEnum;
use log::info;
use macaddr::MacAddr6;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.Local.json";

pub const DEFAULT_SERVER_BASE_URL: &str = "http://localhost:5000";

pub const DEFAULT_ROOM_ID: &str = "piramura-room";

/// Local override file, e.g.
///
/// ```json
/// { "Hub": { "ApiKey": "...", "ServerBaseUrl": "https://example.com" } }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct LocalSettings {
    #[serde(rename = "Hub", default)]
    pub hub: HubSettings,
}

impl LocalSettings {
    /// A missing file yields empty settings; an unreadable or malformed one is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("{} not found, using environment only", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings: {}", path.display()));
            }
        };

        let settings = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        info!("{} loaded", path.display());

        Ok(settings)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HubSettings {
    pub api_key: Option<String>,

    pub server_base_url: Option<String>,

    pub room_id: Option<String>,

    pub device_address: Option<String>,
}

impl HubSettings {
    /// Takes each value from `self` unless it is missing or empty.
    pub fn or(self, fallback: HubSettings) -> HubSettings {
        HubSettings {
            api_key: first_configured(self.api_key, fallback.api_key),
            server_base_url: first_configured(self.server_base_url, fallback.server_base_url),
            room_id: first_configured(self.room_id, fallback.room_id),
            device_address: first_configured(self.device_address, fallback.device_address),
        }
    }
}

pub fn first_configured(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.is_empty())
        .or(fallback.filter(|v| !v.is_empty()))
}

#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Empty when not configured.
    pub api_key: String,

    pub server_base_url: String,

    pub room_id: String,

    pub device_address: MacAddr6,

    pub upload_timeout: Duration,
}

impl HubConfig {
    pub fn from_settings(settings: HubSettings, upload_timeout: Duration) -> Result<Self> {
        let device_address = settings
            .device_address
            .ok_or_else(|| anyhow!("device address is not configured"))?;
        let device_address = device_address
            .parse::<MacAddr6>()
            .map_err(|err| anyhow!("invalid device address {device_address}: {err}"))?;

        Ok(Self {
            api_key: settings.api_key.unwrap_or_default(),
            server_base_url: settings
                .server_base_url
                .unwrap_or_else(|| DEFAULT_SERVER_BASE_URL.to_string()),
            room_id: settings
                .room_id
                .unwrap_or_else(|| DEFAULT_ROOM_ID.to_string()),
            device_address,
            upload_timeout,
        })
    }
}

/// How `GET /api/room/{roomId}` renders a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum QueryFormat {
    /// The full room state as JSON.
    #[default]
    Json,
    /// `co2,temperature,humidity` as plain text.
    Csv,
}
