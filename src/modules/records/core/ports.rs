// Ports the records use cases need from the outside world.
//
// Boundaries
// - No concrete input or output here. The HTTP adapter talks to the REST backend,
//   the in-memory adapter backs tests and the development server.

use crate::modules::records::core::provider_slot::ProviderSlot;
use crate::modules::records::core::record::{
    Note, Record, RecordFields, RecordQuery, RecordSummary,
};
use crate::shared::core::errors::ServiceError;
use crate::shared::core::primitives::{Page, RecordId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A full field bundle plus an optional draft flag change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPatch {
    pub fields: RecordFields,
    pub is_draft: Option<bool>,
}

impl RecordPatch {
    pub fn commit(fields: RecordFields) -> Self {
        Self {
            fields,
            is_draft: Some(false),
        }
    }

    pub fn update(fields: RecordFields) -> Self {
        Self {
            fields,
            is_draft: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to_client_id: RecordId,
    pub from_slot: ProviderSlot,
    pub to_slot: ProviderSlot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub destination_name: String,
}

#[async_trait]
pub trait RecordService: Send + Sync {
    async fn create_draft(&self) -> Result<RecordId, ServiceError>;
    async fn discard_draft(&self, id: RecordId) -> Result<(), ServiceError>;
    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record, ServiceError>;
    async fn get(&self, id: RecordId) -> Result<Record, ServiceError>;
    async fn list(&self, query: &RecordQuery) -> Result<Page<RecordSummary>, ServiceError>;
    async fn delete(&self, id: RecordId) -> Result<(), ServiceError>;
    async fn notes(&self, id: RecordId) -> Result<Vec<Note>, ServiceError>;
    async fn add_note(&self, id: RecordId, text: &str) -> Result<Note, ServiceError>;
    async fn transfer_slot(
        &self,
        source: RecordId,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, ServiceError>;
}
