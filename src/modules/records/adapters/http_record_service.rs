// RecordService over the REST backend.

use crate::modules::records::adapters::mappers::record_dto::{RecordDto, RecordPatchDto};
use crate::modules::records::core::ports::{
    RecordPatch, RecordService, TransferOutcome, TransferRequest,
};
use crate::modules::records::core::record::{Note, Record, RecordQuery, RecordSummary};
use crate::shared::core::errors::ServiceError;
use crate::shared::core::primitives::{Page, RecordId};
use crate::shared::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct CreatedDraft {
    id: RecordId,
}

#[derive(Deserialize)]
struct TransferredTo {
    name: String,
}

#[derive(Deserialize)]
struct TransferResponse {
    to_client: TransferredTo,
}

pub struct HttpRecordService {
    api: ApiClient,
}

impl HttpRecordService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn create_draft(&self) -> Result<RecordId, ServiceError> {
        let created: CreatedDraft = self
            .api
            .fetch_json(ApiRequest::post("/records/create_draft"))
            .await?;
        Ok(created.id)
    }

    async fn discard_draft(&self, id: RecordId) -> Result<(), ServiceError> {
        self.api
            .send(ApiRequest::delete(format!("/records/{id}/discard_draft")))
            .await
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record, ServiceError> {
        let request = ApiRequest::patch(format!("/records/{id}")).json(&RecordPatchDto::from(patch))?;
        let dto: RecordDto = self.api.fetch_json(request).await?;
        Ok(dto.into())
    }

    async fn get(&self, id: RecordId) -> Result<Record, ServiceError> {
        let dto: RecordDto = self
            .api
            .fetch_json(ApiRequest::get(format!("/records/{id}")))
            .await?;
        Ok(dto.into())
    }

    async fn list(&self, query: &RecordQuery) -> Result<Page<RecordSummary>, ServiceError> {
        let mut request = ApiRequest::get("/records").query("page", query.page.max(1));
        if let Some(search) = query.filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.query("search", search.trim());
        }
        if let Some(status) = query.filters.status {
            request = request.query("status", status.as_str());
        }
        self.api.fetch_json(request).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        self.api
            .send(ApiRequest::delete(format!("/records/{id}")))
            .await
    }

    async fn notes(&self, id: RecordId) -> Result<Vec<Note>, ServiceError> {
        self.api
            .fetch_json(ApiRequest::get(format!("/records/{id}/notes")))
            .await
    }

    async fn add_note(&self, id: RecordId, text: &str) -> Result<Note, ServiceError> {
        let request = ApiRequest::post(format!("/records/{id}/notes")).json(&json!({ "text": text }))?;
        self.api.fetch_json(request).await
    }

    async fn transfer_slot(
        &self,
        source: RecordId,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, ServiceError> {
        let request = ApiRequest::post(format!("/records/{source}/transfer_modem")).json(request)?;
        let response: TransferResponse = self.api.fetch_json(request).await?;
        Ok(TransferOutcome {
            destination_name: response.to_client.name,
        })
    }
}
