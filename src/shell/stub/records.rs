// /records endpoints of the development backend.

use crate::modules::records::adapters::mappers::record_dto::{RecordDto, RecordPatchDto};
use crate::modules::records::core::ports::{RecordService, TransferRequest};
use crate::modules::records::core::record::{
    Note, RecordFilters, RecordQuery, RecordStatus, RecordSummary,
};
use crate::shared::core::access::{PermissionFlag, Principal};
use crate::shared::core::primitives::{Page, RecordId};
use crate::shell::stub::{StubError, StubState, body, require};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<RecordStatus>,
}

#[derive(Deserialize)]
pub struct NoteBody {
    pub text: String,
}

pub async fn list(
    State(state): State<StubState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<RecordSummary>>, StubError> {
    let query = RecordQuery {
        page: params.page.unwrap_or(1),
        filters: RecordFilters {
            search: params.search,
            status: params.status,
        },
    };
    Ok(Json(state.records.list(&query).await?))
}

pub async fn create_draft(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
) -> Result<(StatusCode, Json<RecordDto>), StubError> {
    require(&principal, PermissionFlag::CreateClient)?;
    let id = state.records.create_draft().await?;
    tracing::debug!(record = %id, user = %principal.id, "draft created");
    let record = state.records.get(id).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn discard_draft(
    State(state): State<StubState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, StubError> {
    state.records.discard_draft(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    State(state): State<StubState>,
    Path(id): Path<RecordId>,
) -> Result<Json<RecordDto>, StubError> {
    Ok(Json(state.records.get(id).await?.into()))
}

pub async fn update(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<RecordId>,
    payload: Result<Json<RecordPatchDto>, JsonRejection>,
) -> Result<Json<RecordDto>, StubError> {
    require(&principal, PermissionFlag::EditClient)?;
    let patch = body(payload)?;
    Ok(Json(state.records.update(id, patch.into()).await?.into()))
}

pub async fn delete(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, StubError> {
    require(&principal, PermissionFlag::DeleteClient)?;
    state.records.delete(id).await?;
    tracing::info!(record = %id, user = %principal.id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn notes(
    State(state): State<StubState>,
    Path(id): Path<RecordId>,
) -> Result<Json<Vec<Note>>, StubError> {
    Ok(Json(state.records.notes(id).await?))
}

pub async fn add_note(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<RecordId>,
    payload: Result<Json<NoteBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), StubError> {
    let payload = body(payload)?;
    let mut note = state.records.add_note(id, &payload.text).await?;
    note.author = Some(principal.display_name().to_string());
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn transfer(
    State(state): State<StubState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<RecordId>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<Value>, StubError> {
    require(&principal, PermissionFlag::EditClient)?;
    let request = body(payload)?;
    let outcome = state.records.transfer_slot(id, &request).await?;
    tracing::info!(from = %id, to = %request.to_client_id, "provider slot transferred");
    Ok(Json(json!({
        "to_client": { "id": request.to_client_id, "name": outcome.destination_name }
    })))
}
