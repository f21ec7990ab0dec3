// Ports of the duty roster.

use crate::modules::roster::core::calendar::{DayOverride, DayOverrides, MonthCursor};
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::shared::core::errors::ServiceError;
use crate::shared::core::primitives::UserId;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DutyMap = BTreeMap<CellKey, DutyKind>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarUser {
    pub id: UserId,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

impl CalendarUser {
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Per-user totals for one month, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub user_id: UserId,
    pub name: String,
    pub totals: BTreeMap<DutyKind, u32>,
    /// Every duty day of the month, as counted by the backend.
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthReport {
    pub rows: Vec<ReportRow>,
    pub labels: BTreeMap<DutyKind, String>,
}

#[async_trait]
pub trait RosterService: Send + Sync {
    async fn calendar_users(&self) -> Result<Vec<CalendarUser>, ServiceError>;
    async fn month_duties(&self, month: MonthCursor) -> Result<DutyMap, ServiceError>;
    async fn month_overrides(&self, month: MonthCursor) -> Result<DayOverrides, ServiceError>;
    async fn set_duty(&self, key: CellKey, kind: Option<DutyKind>) -> Result<(), ServiceError>;
    async fn bulk_set_duty(&self, keys: &[CellKey], kind: Option<DutyKind>) -> Result<(), ServiceError>;
    /// `None` removes the override for `date`.
    async fn toggle_holiday(
        &self,
        date: NaiveDate,
        day: Option<DayOverride>,
    ) -> Result<(), ServiceError>;
    async fn clear_month(&self, month: MonthCursor) -> Result<(), ServiceError>;
    async fn report(&self, month: MonthCursor) -> Result<MonthReport, ServiceError>;
}
