// Wire shapes of the /events endpoints.

use crate::modules::roster::core::calendar::DayOverride;
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::modules::roster::core::ports::{MonthReport, ReportRow};
use crate::shared::core::primitives::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lists come either bare or wrapped in a paginated `{ results }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListOrPage<T> {
    List(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> ListOrPage<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListOrPage::List(items) | ListOrPage::Page { results: items } => items,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonthParams {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyEntryDto {
    pub user: UserId,
    pub date: NaiveDate,
    pub duty_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDutyDto {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub duty_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSetDutyDto {
    pub cells: Vec<CellKey>,
    pub duty_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOverrideDto {
    pub date: NaiveDate,
    pub is_holiday: bool,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleHolidayDto {
    pub date: NaiveDate,
    /// `null` removes the override.
    pub is_holiday: Option<bool>,
    #[serde(default)]
    pub note: String,
}

impl ToggleHolidayDto {
    pub fn new(date: NaiveDate, day: Option<DayOverride>) -> Self {
        match day {
            Some(day) => Self {
                date,
                is_holiday: Some(day.is_holiday),
                note: day.note,
            },
            None => Self {
                date,
                is_holiday: None,
                note: String::new(),
            },
        }
    }

    pub fn into_override(self) -> Option<DayOverride> {
        self.is_holiday.map(|is_holiday| DayOverride {
            is_holiday,
            note: self.note,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRowDto {
    pub user_id: UserId,
    pub user_name: String,
    /// Duty kind name to count.
    #[serde(default)]
    pub totals: BTreeMap<String, u32>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthReportDto {
    pub report: Vec<ReportRowDto>,
    pub labels: BTreeMap<String, String>,
}

fn known_kinds<V>(entries: BTreeMap<String, V>) -> BTreeMap<DutyKind, V> {
    entries
        .into_iter()
        .filter_map(|(raw, value)| match raw.parse::<DutyKind>() {
            Ok(kind) => Some((kind, value)),
            Err(err) => {
                tracing::debug!(error = %err, "skipping report column");
                None
            }
        })
        .collect()
}

impl From<MonthReportDto> for MonthReport {
    fn from(dto: MonthReportDto) -> Self {
        MonthReport {
            rows: dto
                .report
                .into_iter()
                .map(|row| ReportRow {
                    user_id: row.user_id,
                    name: row.user_name,
                    totals: known_kinds(row.totals),
                    total: row.total,
                })
                .collect(),
            labels: known_kinds(dto.labels),
        }
    }
}

impl From<MonthReport> for MonthReportDto {
    fn from(report: MonthReport) -> Self {
        MonthReportDto {
            report: report
                .rows
                .into_iter()
                .map(|row| ReportRowDto {
                    user_id: row.user_id,
                    user_name: row.name,
                    total: row.total,
                    totals: row
                        .totals
                        .into_iter()
                        .map(|(kind, count)| (kind.as_str().to_string(), count))
                        .collect(),
                })
                .collect(),
            labels: report
                .labels
                .into_iter()
                .map(|(kind, label)| (kind.as_str().to_string(), label))
                .collect(),
        }
    }
}

#[cfg(test)]
mod roster_wire_tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn it_should_accept_bare_and_paginated_lists() {
        let bare: ListOrPage<DayOverrideDto> =
            serde_json::from_value(json!([{ "date": "2024-06-12", "is_holiday": true }])).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let paged: ListOrPage<DayOverrideDto> =
            serde_json::from_value(json!({ "count": 0, "results": [] })).unwrap();
        assert!(paged.into_vec().is_empty());
    }

    #[rstest]
    fn it_should_send_null_to_remove_an_override() {
        let body = serde_json::to_value(ToggleHolidayDto::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            None,
        ))
        .unwrap();
        assert_eq!(body, json!({ "date": "2024-06-01", "is_holiday": null, "note": "" }));
    }

    #[rstest]
    fn it_should_read_report_columns_by_duty_name() {
        let dto: MonthReportDto = serde_json::from_value(json!({
            "report": [{
                "user_id": 7,
                "user_name": "Alice",
                "totals": { "phone": 3, "vacation": 1 },
                "total": 4
            }],
            "labels": { "phone": "Phone", "vacation": "Vacation", "night": "Night" }
        }))
        .unwrap();
        let report = MonthReport::from(dto);
        assert_eq!(report.rows[0].name, "Alice");
        assert_eq!(report.rows[0].totals[&DutyKind::Phone], 3);
        assert_eq!(report.rows[0].total, 4);
        assert_eq!(report.labels.len(), 2);
    }

    #[rstest]
    fn it_should_nest_totals_under_the_user_row() {
        let mut totals = BTreeMap::new();
        totals.insert(DutyKind::Vacation, 2);
        let body = serde_json::to_value(MonthReportDto::from(MonthReport {
            rows: vec![ReportRow {
                user_id: UserId(7),
                name: "Alice".into(),
                totals,
                total: 2,
            }],
            labels: BTreeMap::new(),
        }))
        .unwrap();
        assert_eq!(
            body["report"][0],
            json!({ "user_id": 7, "user_name": "Alice", "totals": { "vacation": 2 }, "total": 2 })
        );
    }

    #[rstest]
    fn it_should_send_bulk_cells_as_user_and_date() {
        let body = serde_json::to_value(BulkSetDutyDto {
            cells: vec![CellKey::new(UserId(7), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())],
            duty_type: "vacation".into(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "cells": [{ "user_id": 7, "date": "2024-06-03" }], "duty_type": "vacation" })
        );
    }
}
