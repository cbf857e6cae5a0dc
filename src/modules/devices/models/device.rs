use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Device as seen by the ledger
///
/// The device registry owns the device lifecycle; the ledger only reads the
/// price and flips the status when a contract is created or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// `None` when no price is recorded for the device
    pub base_price: Option<Decimal>,
    pub status: DeviceStatus,
}

/// Device availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Available,
    Sold,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for DeviceStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        match value.as_str() {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            _ => Err(AppError::internal(format!("Invalid device status: {}", value))),
        }
    }
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_price: Some(base_price),
            status: DeviceStatus::Available,
        }
    }

    pub fn is_purchasable(&self) -> bool {
        self.status == DeviceStatus::Available
    }
}
