// RosterService over the REST backend.

use crate::modules::roster::adapters::wire::{
    BulkSetDutyDto, DayOverrideDto, DutyEntryDto, ListOrPage, MonthParams, MonthReportDto,
    SetDutyDto, ToggleHolidayDto,
};
use crate::modules::roster::core::calendar::{DayOverride, DayOverrides, MonthCursor};
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::modules::roster::core::ports::{CalendarUser, DutyMap, MonthReport, RosterService};
use crate::shared::core::errors::ServiceError;
use crate::shared::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

pub struct HttpRosterService {
    api: ApiClient,
}

impl HttpRosterService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn for_month(request: ApiRequest, month: MonthCursor) -> ApiRequest {
    request
        .query("year", month.year())
        .query("month", month.month())
}

#[async_trait]
impl RosterService for HttpRosterService {
    async fn calendar_users(&self) -> Result<Vec<CalendarUser>, ServiceError> {
        let users: ListOrPage<CalendarUser> = self
            .api
            .fetch_json(ApiRequest::get("/auth/users/for_calendar"))
            .await?;
        Ok(users.into_vec())
    }

    async fn month_duties(&self, month: MonthCursor) -> Result<DutyMap, ServiceError> {
        let entries: ListOrPage<DutyEntryDto> = self
            .api
            .fetch_json(for_month(ApiRequest::get("/events"), month))
            .await?;
        let mut duties = DutyMap::new();
        for entry in entries.into_vec() {
            match DutyKind::from_wire(&entry.duty_type) {
                Ok(Some(kind)) => {
                    duties.insert(CellKey::new(entry.user, entry.date), kind);
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(error = %err, "skipping duty entry"),
            }
        }
        Ok(duties)
    }

    async fn month_overrides(&self, month: MonthCursor) -> Result<DayOverrides, ServiceError> {
        let days: ListOrPage<DayOverrideDto> = self
            .api
            .fetch_json(for_month(ApiRequest::get("/events/holidays"), month))
            .await?;
        Ok(days
            .into_vec()
            .into_iter()
            .map(|day| {
                (
                    day.date,
                    DayOverride {
                        is_holiday: day.is_holiday,
                        note: day.note,
                    },
                )
            })
            .collect())
    }

    async fn set_duty(&self, key: CellKey, kind: Option<DutyKind>) -> Result<(), ServiceError> {
        let body = SetDutyDto {
            user_id: key.user_id,
            date: key.date,
            duty_type: DutyKind::to_wire(kind).to_string(),
        };
        self.api
            .send(ApiRequest::post("/events/set_duty").json(&body)?)
            .await
    }

    async fn bulk_set_duty(&self, keys: &[CellKey], kind: Option<DutyKind>) -> Result<(), ServiceError> {
        let body = BulkSetDutyDto {
            cells: keys.to_vec(),
            duty_type: DutyKind::to_wire(kind).to_string(),
        };
        self.api
            .send(ApiRequest::post("/events/bulk_set_duty").json(&body)?)
            .await
    }

    async fn toggle_holiday(
        &self,
        date: NaiveDate,
        day: Option<DayOverride>,
    ) -> Result<(), ServiceError> {
        let body = ToggleHolidayDto::new(date, day);
        self.api
            .send(ApiRequest::post("/events/toggle_holiday").json(&body)?)
            .await
    }

    async fn clear_month(&self, month: MonthCursor) -> Result<(), ServiceError> {
        let body = MonthParams {
            year: month.year(),
            month: month.month(),
        };
        self.api
            .send(ApiRequest::post("/events/clear_month").json(&body)?)
            .await
    }

    async fn report(&self, month: MonthCursor) -> Result<MonthReport, ServiceError> {
        let dto: MonthReportDto = self
            .api
            .fetch_json(for_month(ApiRequest::get("/events/report"), month))
            .await?;
        Ok(dto.into())
    }
}
