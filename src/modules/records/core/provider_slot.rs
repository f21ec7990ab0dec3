// Provider attachment slots.
//
// A record carries two interchangeable slots. Each slot is a bundle of fields
// that always moves as a whole: a transfer clears the source bundle and
// overwrites the destination bundle, never a subset of it.

use crate::shared::core::primitives::ProviderId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProviderSlot {
    One,
    Two,
}

impl ProviderSlot {
    pub const ALL: [ProviderSlot; 2] = [ProviderSlot::One, ProviderSlot::Two];

    pub fn number(self) -> u8 {
        match self {
            ProviderSlot::One => 1,
            ProviderSlot::Two => 2,
        }
    }
}

impl From<ProviderSlot> for u8 {
    fn from(slot: ProviderSlot) -> Self {
        slot.number()
    }
}

impl TryFrom<u8> for ProviderSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ProviderSlot::One),
            2 => Ok(ProviderSlot::Two),
            other => Err(format!("unknown provider slot {other}")),
        }
    }
}

impl fmt::Display for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Fiber,
    Dsl,
    Cable,
    Wireless,
    Modem,
    MrNet,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Fiber => "fiber",
            ConnectionType::Dsl => "dsl",
            ConnectionType::Cable => "cable",
            ConnectionType::Wireless => "wireless",
            ConnectionType::Modem => "modem",
            ConnectionType::MrNet => "mrnet",
        }
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fiber" => Ok(ConnectionType::Fiber),
            "dsl" => Ok(ConnectionType::Dsl),
            "cable" => Ok(ConnectionType::Cable),
            "wireless" => Ok(ConnectionType::Wireless),
            "modem" => Ok(ConnectionType::Modem),
            "mrnet" => Ok(ConnectionType::MrNet),
            other => Err(format!("unknown connection type {other:?}")),
        }
    }
}

/// Everything one provider slot holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSlotFields {
    pub provider: Option<ProviderId>,
    pub personal_account: String,
    pub contract_number: String,
    pub tariff: String,
    pub connection_type: Option<ConnectionType>,
    pub modem_number: String,
    pub modem_iccid: String,
    pub provider_settings: String,
    pub provider_equipment: bool,
}

impl ProviderSlotFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Short text shown when a transfer would overwrite this slot.
    pub fn preview(&self) -> String {
        let mut parts = Vec::new();
        if let Some(provider) = self.provider {
            parts.push(format!("provider #{}", provider.0));
        }
        if let Some(kind) = self.connection_type {
            parts.push(kind.as_str().to_string());
        }
        for value in [&self.personal_account, &self.contract_number, &self.tariff] {
            if !value.is_empty() {
                parts.push(value.clone());
            }
        }
        if parts.is_empty() && !self.is_empty() {
            parts.push("settings only".to_string());
        }
        parts.join(", ")
    }
}
