use crate::shared::core::primitives::RecordId;

/// What the record form is currently bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Idle,
    EditingDraft(RecordId),
    EditingCommitted(RecordId),
}

impl FormMode {
    pub fn record_id(self) -> Option<RecordId> {
        match self {
            FormMode::Idle => None,
            FormMode::EditingDraft(id) | FormMode::EditingCommitted(id) => Some(id),
        }
    }

    pub fn draft_id(self) -> Option<RecordId> {
        match self {
            FormMode::EditingDraft(id) => Some(id),
            _ => None,
        }
    }
}
