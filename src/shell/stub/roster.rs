// /events and calendar user endpoints of the development backend.

use crate::modules::roster::adapters::wire::{
    BulkSetDutyDto, DayOverrideDto, DutyEntryDto, MonthParams, MonthReportDto, SetDutyDto,
    ToggleHolidayDto,
};
use crate::modules::roster::core::calendar::MonthCursor;
use crate::modules::roster::core::duty::{CellKey, DutyKind};
use crate::modules::roster::core::ports::{CalendarUser, RosterService};
use crate::shared::core::access::{PermissionFlag, Principal};
use crate::shared::core::errors::ServiceError;
use crate::shell::stub::{StubError, StubState, body, require};
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};

fn month_of(params: MonthParams) -> Result<MonthCursor, StubError> {
    MonthCursor::new(params.year, params.month)
        .ok_or_else(|| ServiceError::validation("month", format!("invalid month {}", params.month)).into())
}

fn duty_kind(raw: &str) -> Result<Option<DutyKind>, StubError> {
    DutyKind::from_wire(raw).map_err(|err| ServiceError::validation("duty_type", err).into())
}

pub async fn calendar_users(State(state): State<StubState>) -> Result<Json<Vec<CalendarUser>>, StubError> {
    Ok(Json(state.roster.calendar_users().await?))
}

pub async fn month_duties(
    State(state): State<StubState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<DutyEntryDto>>, StubError> {
    let duties = state.roster.month_duties(month_of(params)?).await?;
    Ok(Json(
        duties
            .into_iter()
            .map(|(key, kind)| DutyEntryDto {
                user: key.user_id,
                date: key.date,
                duty_type: kind.as_str().to_string(),
            })
            .collect(),
    ))
}

pub async fn month_overrides(
    State(state): State<StubState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<Vec<DayOverrideDto>>, StubError> {
    let overrides = state.roster.month_overrides(month_of(params)?).await?;
    Ok(Json(
        overrides
            .into_iter()
            .map(|(date, day)| DayOverrideDto {
                date,
                is_holiday: day.is_holiday,
                note: day.note,
            })
            .collect(),
    ))
}

pub async fn set_duty(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<SetDutyDto>, JsonRejection>,
) -> Result<StatusCode, StubError> {
    require(&principal, PermissionFlag::EditClient)?;
    let payload = body(payload)?;
    let kind = duty_kind(&payload.duty_type)?;
    state
        .roster
        .set_duty(CellKey::new(payload.user_id, payload.date), kind)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_set_duty(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<BulkSetDutyDto>, JsonRejection>,
) -> Result<StatusCode, StubError> {
    require(&principal, PermissionFlag::EditClient)?;
    let payload = body(payload)?;
    let kind = duty_kind(&payload.duty_type)?;
    state.roster.bulk_set_duty(&payload.cells, kind).await?;
    tracing::debug!(cells = payload.cells.len(), "bulk duty applied");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_holiday(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ToggleHolidayDto>, JsonRejection>,
) -> Result<StatusCode, StubError> {
    require(&principal, PermissionFlag::EditClient)?;
    let payload = body(payload)?;
    let date = payload.date;
    state.roster.toggle_holiday(date, payload.into_override()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_month(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<MonthParams>, JsonRejection>,
) -> Result<StatusCode, StubError> {
    if !principal.is_admin() {
        return Err(ServiceError::Forbidden("only administrators may clear a month".into()).into());
    }
    let month = month_of(body(payload)?)?;
    state.roster.clear_month(month).await?;
    tracing::info!(year = month.year(), month = month.month(), user = %principal.id, "month cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn report(
    State(state): State<StubState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<MonthReportDto>, StubError> {
    let report = state.roster.report(month_of(params)?).await?;
    Ok(Json(report.into()))
}
