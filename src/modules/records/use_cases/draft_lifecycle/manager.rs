// Draft reservation for the "new client" form.
//
// Purpose
// - A new record exists on the server from the moment the form opens, so notes
//   and slot data can hang off a real id. If the form is abandoned, that draft
//   is discarded.
//
// Responsibilities
// - Keep at most one pending draft per preference store. Opening the form again
//   discards whatever the persisted pointer still names.
// - Commit flips `is_draft` off on the same id.
// - Leaving, unloading and dropping discard the draft on a best-effort basis.
//   Discard failures are logged at debug level and never surfaced.

use crate::modules::records::core::ports::{RecordPatch, RecordService};
use crate::modules::records::core::record::{Record, RecordFields};
use crate::modules::records::use_cases::draft_lifecycle::form_mode::FormMode;
use crate::shared::core::errors::{FieldErrors, ServiceError};
use crate::shared::core::notices::{Notice, NoticeSink};
use crate::shared::core::primitives::RecordId;
use crate::shared::infrastructure::preferences::Preferences;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("no record is open in the form")]
    NotEditing,

    #[error("invalid fields: {0:?}")]
    Invalid(FieldErrors),

    #[error("record id changed from {expected} to {actual}")]
    IdentityChanged { expected: RecordId, actual: RecordId },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl DraftError {
    /// Field errors to render inline, from local or server validation.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DraftError::Invalid(errors) => Some(errors),
            DraftError::Service(err) => err.field_errors(),
            _ => None,
        }
    }
}

pub struct DraftLifecycle<S: RecordService + 'static> {
    service: Arc<S>,
    preferences: Preferences,
    notices: Arc<dyn NoticeSink>,
    mode: FormMode,
}

impl<S: RecordService + 'static> DraftLifecycle<S> {
    pub fn new(service: Arc<S>, preferences: Preferences, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            service,
            preferences,
            notices,
            mode: FormMode::Idle,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub async fn enter_create_mode(&mut self) -> Result<RecordId, DraftError> {
        self.leave().await;
        if let Some(stale) = self.preferences.pending_draft_id() {
            tracing::debug!(draft = %stale, "discarding draft left by an earlier form");
            self.clear_pointer();
            self.discard_quietly(stale).await;
        }

        let id = match self.service.create_draft().await {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(error = %err, "draft creation failed");
                self.notices
                    .push(Notice::error(format!("Could not start a new client: {err}")));
                return Err(err.into());
            }
        };
        if let Err(err) = self.preferences.set_pending_draft_id(id) {
            tracing::warn!(draft = %id, error = %err, "could not persist the pending draft pointer");
        }
        self.mode = FormMode::EditingDraft(id);
        tracing::info!(draft = %id, "draft created");
        Ok(id)
    }

    /// Opens an existing record. Never creates or touches a draft pointer.
    pub async fn load_existing(&mut self, id: RecordId) -> Result<Record, DraftError> {
        self.leave().await;
        let record = match self.service.get(id).await {
            Ok(record) => record,
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Could not load client #{id}: {err}")));
                return Err(err.into());
            }
        };
        self.mode = if record.is_draft {
            FormMode::EditingDraft(id)
        } else {
            FormMode::EditingCommitted(id)
        };
        Ok(record)
    }

    /// Saves the form. A draft becomes a committed record under the same id.
    pub async fn commit(&mut self, fields: RecordFields) -> Result<Record, DraftError> {
        let id = self.mode.record_id().ok_or(DraftError::NotEditing)?;

        let missing = fields.missing_required();
        if !missing.is_empty() {
            let errors: FieldErrors = missing
                .into_iter()
                .map(|field| (field.to_string(), vec!["This field is required.".to_string()]))
                .collect();
            self.notices.push(Notice::error("Fill in the required fields"));
            return Err(DraftError::Invalid(errors));
        }

        let record = match self.service.update(id, RecordPatch::commit(fields)).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(record = %id, error = %err, "commit rejected");
                self.notices
                    .push(Notice::error(format!("Could not save the client: {err}")));
                return Err(err.into());
            }
        };
        if record.id != id {
            return Err(DraftError::IdentityChanged {
                expected: id,
                actual: record.id,
            });
        }

        if self.mode.draft_id().is_some() {
            self.clear_pointer_if(id);
        }
        self.mode = FormMode::EditingCommitted(id);
        self.notices.push(Notice::success("Client saved"));
        tracing::info!(record = %id, "record committed");
        Ok(record)
    }

    /// Navigation away. Discards a draft that was never committed.
    pub async fn leave(&mut self) {
        if let Some(id) = self.release_draft() {
            self.discard_quietly(id).await;
        }
    }

    /// Tab close. Schedules the discard and returns at once; the call may not
    /// complete before the process exits.
    pub fn on_unload(&mut self) {
        let Some(id) = self.release_draft() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let service = Arc::clone(&self.service);
                handle.spawn(async move {
                    if let Err(err) = service.discard_draft(id).await {
                        tracing::debug!(draft = %id, error = %err, "draft discard failed");
                    }
                });
            }
            Err(_) => tracing::debug!(draft = %id, "no runtime, draft discard skipped"),
        }
    }

    /// Resets the mode and clears the pointer before any network call, so a
    /// second trigger finds nothing to discard.
    fn release_draft(&mut self) -> Option<RecordId> {
        let id = self.mode.draft_id();
        self.mode = FormMode::Idle;
        if let Some(id) = id {
            self.clear_pointer_if(id);
        }
        id
    }

    async fn discard_quietly(&self, id: RecordId) {
        match self.service.discard_draft(id).await {
            Ok(()) => tracing::debug!(draft = %id, "draft discarded"),
            Err(err) => tracing::debug!(draft = %id, error = %err, "draft discard failed"),
        }
    }

    fn clear_pointer_if(&self, id: RecordId) {
        if self.preferences.pending_draft_id() == Some(id) {
            self.clear_pointer();
        }
    }

    fn clear_pointer(&self) {
        if let Err(err) = self.preferences.clear_pending_draft_id() {
            tracing::warn!(error = %err, "could not clear the pending draft pointer");
        }
    }
}

impl<S: RecordService + 'static> Drop for DraftLifecycle<S> {
    fn drop(&mut self) {
        self.on_unload();
    }
}
