// Development backend.
//
// Purpose
// - Serve the REST contract the console talks to, backed by the in-memory
//   adapters, for local development and the integration tests.
//
// Responsibilities
// - Issue and refresh bearer tokens; reject requests without a live token.
// - Translate ServiceError into the status codes the ApiClient maps back.
// - Enforce the permission checks the real backend applies to destructive calls.

pub mod auth;
pub mod export;
pub mod records;
pub mod roster;

use crate::modules::export::adapters::in_memory_export_service::InMemoryExportService;
use crate::modules::records::adapters::in_memory_record_service::InMemoryRecordService;
use crate::modules::roster::adapters::in_memory_roster_service::InMemoryRosterService;
use crate::modules::roster::core::ports::CalendarUser;
use crate::shared::core::access::{PermissionFlag, Principal};
use crate::shared::core::errors::ServiceError;
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct StubState {
    pub records: Arc<InMemoryRecordService>,
    pub roster: Arc<InMemoryRosterService>,
    pub export: Arc<InMemoryExportService>,
    pub auth: Arc<auth::StubAuth>,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    pub fn new() -> Self {
        Self::with_records(InMemoryRecordService::new())
    }

    pub fn with_records(records: InMemoryRecordService) -> Self {
        let records = Arc::new(records);
        Self {
            export: Arc::new(InMemoryExportService::new(records.clone())),
            records,
            roster: Arc::new(InMemoryRosterService::new()),
            auth: Arc::new(auth::StubAuth::new()),
        }
    }

    /// Registers a login and lists the user on the duty roster.
    pub async fn add_account(&self, password: &str, principal: Principal) {
        self.roster
            .add_user(CalendarUser {
                id: principal.id,
                full_name: principal.full_name.clone(),
                email: principal.email.clone(),
            })
            .await;
        self.auth.add_account(password, principal);
    }
}

/// ServiceError on its way out of a handler.
#[derive(Debug)]
pub struct StubError(pub ServiceError);

impl From<ServiceError> for StubError {
    fn from(err: ServiceError) -> Self {
        StubError(err)
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let detail = |status: StatusCode, message: String| {
            (status, Json(json!({ "detail": message }))).into_response()
        };
        match self.0 {
            ServiceError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ServiceError::NotFound(what) => detail(StatusCode::NOT_FOUND, what),
            ServiceError::Forbidden(why) => detail(StatusCode::FORBIDDEN, why),
            ServiceError::SessionExpired => {
                detail(StatusCode::UNAUTHORIZED, "token is invalid or expired".into())
            }
            ServiceError::Unavailable(why) => detail(StatusCode::SERVICE_UNAVAILABLE, why),
            ServiceError::Unexpected(why) => detail(StatusCode::INTERNAL_SERVER_ERROR, why),
        }
    }
}

pub(crate) fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, StubError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServiceError::validation("detail", rejection.body_text()).into())
}

pub(crate) fn require(principal: &Principal, flag: PermissionFlag) -> Result<(), StubError> {
    if principal.has_perm(flag) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!("missing permission {flag:?}")).into())
    }
}

pub fn router(state: StubState) -> Router {
    let protected = Router::new()
        .route("/auth/users/me", get(auth::me))
        .route("/auth/users/for_calendar", get(roster::calendar_users))
        .route("/records", get(records::list))
        .route("/records/create_draft", post(records::create_draft))
        .route("/records/export_excel", post(export::export_excel))
        .route(
            "/records/{id}",
            get(records::get).patch(records::update).delete(records::delete),
        )
        .route("/records/{id}/discard_draft", delete(records::discard_draft))
        .route("/records/{id}/notes", get(records::notes).post(records::add_note))
        .route("/records/{id}/transfer_modem", post(records::transfer))
        .route("/settings/system", get(export::system_settings))
        .route("/events", get(roster::month_duties))
        .route("/events/holidays", get(roster::month_overrides))
        .route("/events/set_duty", post(roster::set_duty))
        .route("/events/bulk_set_duty", post(roster::bulk_set_duty))
        .route("/events/toggle_holiday", post(roster::toggle_holiday))
        .route("/events/clear_month", post(roster::clear_month))
        .route("/events/report", get(roster::report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .route("/auth/token", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh))
        .merge(protected)
        .with_state(state)
}
