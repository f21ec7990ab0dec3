// Duty kinds and the (user, date) cell key of the roster grid.

use crate::shared::core::primitives::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyKind {
    Phone,
    Day,
    PhoneDay,
    Vacation,
    Busy,
}

impl DutyKind {
    pub const ALL: [DutyKind; 5] = [
        DutyKind::Phone,
        DutyKind::Day,
        DutyKind::PhoneDay,
        DutyKind::Vacation,
        DutyKind::Busy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DutyKind::Phone => "phone",
            DutyKind::Day => "day",
            DutyKind::PhoneDay => "phone_day",
            DutyKind::Vacation => "vacation",
            DutyKind::Busy => "busy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DutyKind::Phone => "Phone",
            DutyKind::Day => "Day shift",
            DutyKind::PhoneDay => "Phone + day",
            DutyKind::Vacation => "Vacation",
            DutyKind::Busy => "Busy",
        }
    }

    /// `duty_type` on the wire: the kind's name, or "" to clear the cell.
    pub fn to_wire(kind: Option<DutyKind>) -> &'static str {
        kind.map(DutyKind::as_str).unwrap_or("")
    }

    pub fn from_wire(raw: &str) -> Result<Option<DutyKind>, String> {
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some)
    }
}

impl FromStr for DutyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DutyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown duty type {value:?}"))
    }
}

/// One cell of the grid. Displays as `7_2024-06-03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub user_id: UserId,
    pub date: NaiveDate,
}

impl CellKey {
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self { user_id, date }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.user_id, self.date.format("%Y-%m-%d"))
    }
}

impl FromStr for CellKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (user, date) = value
            .split_once('_')
            .ok_or_else(|| format!("malformed cell key {value:?}"))?;
        let user_id = user
            .parse::<u64>()
            .map_err(|err| format!("malformed user in {value:?}: {err}"))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|err| format!("malformed date in {value:?}: {err}"))?;
        Ok(CellKey::new(UserId(user_id), date))
    }
}
