use std::fmt;

use macaddr::MacAddr6;

/// Why a manufacturer data block did not yield a reading.
///
/// None of these are errors: the scanner hears plenty of unrelated traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ForeignVendor { company_id: u16 },
    ShortFrame { len: usize },
    OtherDevice { device_address: MacAddr6 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignVendor { company_id } => {
                write!(f, "not a SwitchBot frame: company id 0x{company_id:04x}")
            }
            Self::ShortFrame { len } => write!(
                f,
                "manufacturer data too short: expected at least {}, got {len}",
                super::METER_PRO_CO2_MANUFACTURER_DATA_MIN_LEN
            ),
            Self::OtherDevice { device_address } => {
                write!(f, "frame from another device: {device_address}")
            }
        }
    }
}

impl std::error::Error for Rejection {}
