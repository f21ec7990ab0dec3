use crate::modules::records::core::ports::{
    RecordPatch, RecordService, TransferOutcome, TransferRequest,
};
use crate::modules::records::core::record::{Note, Record, RecordFields, RecordQuery, RecordSummary};
use crate::shared::core::errors::ServiceError;
use crate::shared::core::primitives::{NoteId, Page, RecordId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub const PAGE_SIZE: usize = 20;

#[derive(Default)]
struct Store {
    next_id: u64,
    next_note_id: u64,
    records: BTreeMap<RecordId, Record>,
    notes: BTreeMap<RecordId, Vec<Note>>,
    discarded: Vec<RecordId>,
}

/// Record backend kept in process memory.
///
/// Backs the use case tests and the development server. Every mutation runs
/// under one write lock, so a slot transfer is all-or-nothing.
pub struct InMemoryRecordService {
    store: RwLock<Store>,
    is_offline: AtomicBool,
}

impl Default for InMemoryRecordService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordService {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Hands out record ids from `first_id` upwards.
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            store: RwLock::new(Store {
                next_id: first_id,
                next_note_id: 1,
                ..Store::default()
            }),
            is_offline: AtomicBool::new(false),
        }
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn seed(&self, record: Record) {
        let mut store = self.store.write().await;
        store.next_id = store.next_id.max(record.id.0 + 1);
        store.records.insert(record.id, record);
    }

    pub async fn record(&self, id: RecordId) -> Option<Record> {
        self.store.read().await.records.get(&id).cloned()
    }

    /// Ids of every discard request received, in order.
    pub async fn discarded(&self) -> Vec<RecordId> {
        self.store.read().await.discarded.clone()
    }

    pub async fn draft_ids(&self) -> Vec<RecordId> {
        self.store
            .read()
            .await
            .records
            .values()
            .filter(|record| record.is_draft)
            .map(|record| record.id)
            .collect()
    }

    fn ensure_online(&self) -> Result<(), ServiceError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("record service is offline".into()));
        }
        Ok(())
    }
}

fn not_found(id: RecordId) -> ServiceError {
    ServiceError::NotFound(format!("/records/{id}"))
}

#[async_trait]
impl RecordService for InMemoryRecordService {
    async fn create_draft(&self) -> Result<RecordId, ServiceError> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        let id = RecordId(store.next_id);
        store.next_id += 1;
        store.records.insert(
            id,
            Record {
                id,
                is_draft: true,
                fields: RecordFields::default(),
            },
        );
        Ok(id)
    }

    async fn discard_draft(&self, id: RecordId) -> Result<(), ServiceError> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        store.discarded.push(id);
        match store.records.get(&id) {
            None => Err(not_found(id)),
            Some(record) if !record.is_draft => {
                Err(ServiceError::validation("detail", "record is not a draft"))
            }
            Some(_) => {
                store.records.remove(&id);
                store.notes.remove(&id);
                Ok(())
            }
        }
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record, ServiceError> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        let record = store.records.get_mut(&id).ok_or_else(|| not_found(id))?;
        let is_draft = patch.is_draft.unwrap_or(record.is_draft);
        if !is_draft {
            if let Some(field) = patch.fields.missing_required().first() {
                return Err(ServiceError::validation(*field, "This field is required."));
            }
        }
        record.fields = patch.fields;
        record.is_draft = is_draft;
        Ok(record.clone())
    }

    async fn get(&self, id: RecordId) -> Result<Record, ServiceError> {
        self.ensure_online()?;
        self.record(id).await.ok_or_else(|| not_found(id))
    }

    async fn list(&self, query: &RecordQuery) -> Result<Page<RecordSummary>, ServiceError> {
        self.ensure_online()?;
        let store = self.store.read().await;
        let matching: Vec<&Record> = store
            .records
            .values()
            .filter(|record| !record.is_draft && query.filters.matches(record))
            .collect();
        let page = query.page.max(1) as usize;
        let results = matching
            .iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|record| record.summary())
            .collect();
        Ok(Page {
            count: matching.len() as u64,
            results,
        })
    }

    async fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        self.ensure_online()?;
        let mut store = self.store.write().await;
        store.records.remove(&id).ok_or_else(|| not_found(id))?;
        store.notes.remove(&id);
        Ok(())
    }

    async fn notes(&self, id: RecordId) -> Result<Vec<Note>, ServiceError> {
        self.ensure_online()?;
        let store = self.store.read().await;
        if !store.records.contains_key(&id) {
            return Err(not_found(id));
        }
        Ok(store.notes.get(&id).cloned().unwrap_or_default())
    }

    async fn add_note(&self, id: RecordId, text: &str) -> Result<Note, ServiceError> {
        self.ensure_online()?;
        if text.trim().is_empty() {
            return Err(ServiceError::validation("text", "This field may not be blank."));
        }
        let mut store = self.store.write().await;
        if !store.records.contains_key(&id) {
            return Err(not_found(id));
        }
        let note = Note {
            id: NoteId(store.next_note_id),
            text: text.trim().to_string(),
            author: None,
            created_at: Some(Utc::now()),
        };
        store.next_note_id += 1;
        store.notes.entry(id).or_default().push(note.clone());
        Ok(note)
    }

    async fn transfer_slot(
        &self,
        source: RecordId,
        request: &TransferRequest,
    ) -> Result<TransferOutcome, ServiceError> {
        self.ensure_online()?;
        if source == request.to_client_id {
            return Err(ServiceError::validation(
                "to_client_id",
                "cannot transfer to the same client",
            ));
        }
        let mut store = self.store.write().await;
        match store.records.get(&request.to_client_id) {
            None => return Err(not_found(request.to_client_id)),
            Some(destination) if destination.is_draft => {
                return Err(ServiceError::validation(
                    "to_client_id",
                    "cannot transfer to a draft",
                ));
            }
            Some(_) => {}
        }
        let bundle = store
            .records
            .get_mut(&source)
            .ok_or_else(|| not_found(source))?
            .fields
            .take_slot(request.from_slot);
        let destination = store
            .records
            .get_mut(&request.to_client_id)
            .ok_or_else(|| not_found(request.to_client_id))?;
        *destination.fields.slot_mut(request.to_slot) = bundle;
        Ok(TransferOutcome {
            destination_name: destination.display_name(),
        })
    }
}
