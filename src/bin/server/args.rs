use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::Parser;
use home_sense::config::{DEFAULT_SETTINGS_FILE, QueryFormat};

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Overridden by `Hub.ApiKey` in the settings file.
    #[arg(long, env = "HUB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "QUERY_FORMAT", value_enum, default_value_t = QueryFormat::Json)]
    pub query_format: QueryFormat,
}
