use chrono::{DateTime, Utc};
use macaddr::MacAddr6;

use crate::reading::Reading;
use crate::switchbot::Rejection;

// Ref: https://github.com/OpenWonderLabs/SwitchBotAPI-BLE/blob/2bd727ecf7c0898b25ac2df58a4886b5930c9138/README.md?plain=1#L44
pub const SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID: u16 = 0x0969;

/// Shorter SwitchBot frames are a different advertisement sub-type without the
/// measurement block.
pub const METER_PRO_CO2_MANUFACTURER_DATA_MIN_LEN: usize = 16;

const DEVICE_ADDRESS_OFFSET: usize = 0;
const TEMPERATURE_OFFSET: usize = 8;
const HUMIDITY_OFFSET: usize = 10;
const CO2_OFFSET: usize = 13;

/// Decodes a Meter Pro (CO2) manufacturer data block.
///
/// Only frames from `target` are accepted. `measured_at` becomes the
/// reading's source timestamp.
pub fn decode_manufacturer_data(
    company_id: u16,
    manufacturer_data: &[u8],
    target: &MacAddr6,
    measured_at: DateTime<Utc>,
) -> Result<Reading, Rejection> {
    if company_id != SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID {
        return Err(Rejection::ForeignVendor { company_id });
    }

    if manufacturer_data.len() < METER_PRO_CO2_MANUFACTURER_DATA_MIN_LEN {
        return Err(Rejection::ShortFrame {
            len: manufacturer_data.len(),
        });
    }

    let device_address =
        MacAddr6::from(field::<6>(manufacturer_data, DEVICE_ADDRESS_OFFSET)?);
    if device_address != *target {
        return Err(Rejection::OtherDevice { device_address });
    }

    let temperature_celsius = decode_temperature(field(manufacturer_data, TEMPERATURE_OFFSET)?);
    let [humidity] = field::<1>(manufacturer_data, HUMIDITY_OFFSET)?;
    let humidity_percent = decode_humidity(humidity);
    let co2_ppm = decode_co2(field(manufacturer_data, CO2_OFFSET)?);

    Ok(Reading {
        device_address,
        co2_ppm,
        temperature_celsius,
        humidity_percent,
        source_timestamp: measured_at,
    })
}

fn field<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], Rejection> {
    data.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Rejection::ShortFrame { len: data.len() })
}

// The flag bit set means positive.
fn decode_temperature(v: [u8; 2]) -> f64 {
    let fractional_part = (v[0] & 0x0f) as i16;
    let integral_part = (v[1] & 0x7f) as i16;
    let positive_negative_flag = v[1] & 0x80;

    let sign = if positive_negative_flag != 0 {
        1i16
    } else {
        -1i16
    };

    (sign * (integral_part * 10 + fractional_part)) as f64 / 10f64
}

fn decode_humidity(v: u8) -> u8 {
    v & 0x7f
}

fn decode_co2(v: [u8; 2]) -> u16 {
    u16::from_be_bytes(v)
}
