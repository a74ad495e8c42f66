use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use macaddr::MacAddr6;

pub const CO2_PPM_RANGE: RangeInclusive<f64> = 0.0..=10000.0;

pub const TEMPERATURE_CELSIUS_RANGE: RangeInclusive<f64> = -50.0..=60.0;

pub const HUMIDITY_PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// A single measurement decoded from a sensor broadcast.
///
/// The room the reading belongs to is not known when decoding; it is attached
/// by whoever forwards the reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub device_address: MacAddr6,

    pub co2_ppm: u16,

    pub temperature_celsius: f64,

    pub humidity_percent: u8,

    pub source_timestamp: DateTime<Utc>,
}

pub fn is_in_range(co2_ppm: f64, temperature_celsius: f64, humidity_percent: f64) -> bool {
    CO2_PPM_RANGE.contains(&co2_ppm)
        && TEMPERATURE_CELSIUS_RANGE.contains(&temperature_celsius)
        && HUMIDITY_PERCENT_RANGE.contains(&humidity_percent)
}
