// Record list, notes and deletion.

use crate::modules::records::core::ports::RecordService;
use crate::modules::records::core::record::{Note, RecordQuery, RecordSummary};
use crate::shared::core::access::{PermissionFlag, Principal};
use crate::shared::core::confirmation::Confirmation;
use crate::shared::core::errors::ServiceError;
use crate::shared::core::notices::{Notice, NoticeSink};
use crate::shared::core::primitives::{Page, RecordId};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordActionError {
    #[error("note text is blank")]
    BlankNote,

    #[error("missing permission {0:?}")]
    NotPermitted(PermissionFlag),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct RecordActions<S: RecordService> {
    service: Arc<S>,
    notices: Arc<dyn NoticeSink>,
}

impl<S: RecordService> RecordActions<S> {
    pub fn new(service: Arc<S>, notices: Arc<dyn NoticeSink>) -> Self {
        Self { service, notices }
    }

    pub async fn list(&self, query: &RecordQuery) -> Result<Page<RecordSummary>, RecordActionError> {
        self.service
            .list(query)
            .await
            .map_err(|err| self.fail("Could not load clients", err))
    }

    pub async fn notes(&self, id: RecordId) -> Result<Vec<Note>, RecordActionError> {
        self.service
            .notes(id)
            .await
            .map_err(|err| self.fail("Could not load notes", err))
    }

    pub async fn add_note(&self, id: RecordId, text: &str) -> Result<Note, RecordActionError> {
        let text = text.trim();
        if text.is_empty() {
            self.notices.push(Notice::error("A note cannot be empty"));
            return Err(RecordActionError::BlankNote);
        }
        let note = self
            .service
            .add_note(id, text)
            .await
            .map_err(|err| self.fail("Could not add the note", err))?;
        self.notices.push(Notice::success("Note added"));
        Ok(note)
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        id: RecordId,
        confirmation: Confirmation,
    ) -> Result<(), RecordActionError> {
        if !principal.has_perm(PermissionFlag::DeleteClient) {
            self.notices
                .push(Notice::error("You are not allowed to delete clients"));
            return Err(RecordActionError::NotPermitted(PermissionFlag::DeleteClient));
        }
        tracing::info!(record = %id, user = %principal.id, prompt = confirmation.prompt(), "deleting record");
        self.service
            .delete(id)
            .await
            .map_err(|err| self.fail("Could not delete the client", err))?;
        self.notices.push(Notice::success("Client deleted"));
        Ok(())
    }

    fn fail(&self, what: &str, err: ServiceError) -> RecordActionError {
        tracing::warn!(error = %err, "{what}");
        self.notices.push(Notice::error(format!("{what}: {err}")));
        err.into()
    }
}
