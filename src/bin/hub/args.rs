use std::path::PathBuf;

use clap::Parser;
use home_sense::config::{DEFAULT_SETTINGS_FILE, HubSettings};

/// Values from the settings file win over flags and environment.
#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    #[arg(long, env = "HUB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "HUB_SERVER_BASE_URL")]
    pub server_base_url: Option<String>,

    #[arg(long, env = "HUB_ROOM_ID")]
    pub room_id: Option<String>,

    #[arg(long, env = "HUB_DEVICE_ADDRESS")]
    pub device_address: Option<String>,

    #[arg(long, env = "HUB_UPLOAD_TIMEOUT_SECS", default_value_t = 10)]
    pub upload_timeout_secs: u64,
}

impl Args {
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            api_key: self.api_key.clone(),
            server_base_url: self.server_base_url.clone(),
            room_id: self.room_id.clone(),
            device_address: self.device_address.clone(),
        }
    }
}
