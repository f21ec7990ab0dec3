// Two-step wizard moving one provider slot to another record.
//
// Closed -> PickDestination -> PickSlot -> Submitted
//
// The move itself is a single server call. Locally the source slot is only
// cleared once that call succeeds.

use crate::modules::records::core::ports::{RecordService, TransferOutcome, TransferRequest};
use crate::modules::records::core::provider_slot::ProviderSlot;
use crate::modules::records::core::record::{Record, RecordFilters, RecordQuery, RecordSummary};
use crate::shared::core::errors::ServiceError;
use crate::shared::core::notices::{Notice, NoticeSink};
use crate::shared::core::primitives::RecordId;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Closed,
    PickDestination,
    PickSlot,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOccupancy {
    Empty,
    /// Preview of what the transfer would overwrite.
    Occupied(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPreview {
    pub id: RecordId,
    pub name: String,
    pub slot1: SlotOccupancy,
    pub slot2: SlotOccupancy,
}

impl DestinationPreview {
    fn of(record: &Record) -> Self {
        let occupancy = |slot: ProviderSlot| {
            let fields = record.fields.slot(slot);
            if fields.is_empty() {
                SlotOccupancy::Empty
            } else {
                SlotOccupancy::Occupied(fields.preview())
            }
        };
        Self {
            id: record.id,
            name: record.display_name(),
            slot1: occupancy(ProviderSlot::One),
            slot2: occupancy(ProviderSlot::Two),
        }
    }

    pub fn occupancy(&self, slot: ProviderSlot) -> &SlotOccupancy {
        match slot {
            ProviderSlot::One => &self.slot1,
            ProviderSlot::Two => &self.slot2,
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("wizard is at {actual:?}, expected {expected:?}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("{0} of the source record is empty")]
    EmptySourceSlot(ProviderSlot),

    #[error("a record cannot receive its own slot")]
    SameRecord,

    #[error("no destination record selected")]
    NoDestination,

    #[error("no destination slot selected")]
    NoDestinationSlot,

    #[error("wizard was opened for record {expected}, not {actual}")]
    SourceMismatch { expected: RecordId, actual: RecordId },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct TransferWizard<S: RecordService> {
    service: Arc<S>,
    notices: Arc<dyn NoticeSink>,
    step: WizardStep,
    source: Option<(RecordId, ProviderSlot)>,
    candidates: Vec<RecordSummary>,
    term: Option<String>,
    page: u32,
    seen: u64,
    total: u64,
    destination: Option<DestinationPreview>,
    destination_slot: Option<ProviderSlot>,
}

impl<S: RecordService> TransferWizard<S> {
    pub fn new(service: Arc<S>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            service,
            notices,
            step: WizardStep::Closed,
            source: None,
            candidates: Vec::new(),
            term: None,
            page: 0,
            seen: 0,
            total: 0,
            destination: None,
            destination_slot: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn candidates(&self) -> &[RecordSummary] {
        &self.candidates
    }

    /// More candidates exist beyond the pages loaded so far.
    pub fn has_more_candidates(&self) -> bool {
        self.seen < self.total
    }

    pub fn destination(&self) -> Option<&DestinationPreview> {
        self.destination.as_ref()
    }

    pub fn destination_slot(&self) -> Option<ProviderSlot> {
        self.destination_slot
    }

    /// Starts over from the first step with a fresh candidate list.
    pub async fn open(&mut self, source: &Record, from_slot: ProviderSlot) -> Result<(), WizardError> {
        self.close();
        if source.fields.slot(from_slot).is_empty() {
            return Err(WizardError::EmptySourceSlot(from_slot));
        }
        self.source = Some((source.id, from_slot));
        self.step = WizardStep::PickDestination;
        self.search(None).await
    }

    /// Reloads the candidate list from the first page, optionally narrowed by a
    /// search term.
    pub async fn search(&mut self, term: Option<&str>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PickDestination)?;
        self.term = term.map(str::to_string);
        self.page = 0;
        self.seen = 0;
        self.total = 0;
        self.candidates.clear();
        self.load_more().await
    }

    /// Appends the next page of candidates for the current search term.
    pub async fn load_more(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PickDestination)?;
        let source_id = self.source_id()?;
        let query = RecordQuery {
            page: self.page + 1,
            filters: RecordFilters {
                search: self.term.clone(),
                status: None,
            },
        };
        match self.service.list(&query).await {
            Ok(page) => {
                self.page = query.page;
                self.total = page.count;
                self.seen = if page.results.is_empty() {
                    page.count
                } else {
                    self.seen + page.results.len() as u64
                };
                self.candidates.extend(
                    page.results
                        .into_iter()
                        .filter(|candidate| candidate.id != source_id && !candidate.is_draft),
                );
                Ok(())
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Could not load clients: {err}")));
                Err(err.into())
            }
        }
    }

    /// Picks the destination and fetches its slots for the next step.
    pub async fn select_destination(&mut self, id: RecordId) -> Result<&DestinationPreview, WizardError> {
        self.expect_step(WizardStep::PickDestination)?;
        if id == self.source_id()? {
            return Err(WizardError::SameRecord);
        }
        let record = match self.service.get(id).await {
            Ok(record) => record,
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("Could not load client #{id}: {err}")));
                return Err(err.into());
            }
        };
        self.destination_slot = None;
        Ok(&*self.destination.insert(DestinationPreview::of(&record)))
    }

    pub fn next(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PickDestination)?;
        if self.destination.is_none() {
            return Err(WizardError::NoDestination);
        }
        self.step = WizardStep::PickSlot;
        Ok(())
    }

    pub fn choose_slot(&mut self, slot: ProviderSlot) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PickSlot)?;
        self.destination_slot = Some(slot);
        Ok(())
    }

    /// Returns to the first step, keeping the destination.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::PickSlot)?;
        self.destination_slot = None;
        self.step = WizardStep::PickDestination;
        Ok(())
    }

    /// Moves the slot. On success the slot is cleared on `source` as well.
    pub async fn submit(&mut self, source: &mut Record) -> Result<TransferOutcome, WizardError> {
        self.expect_step(WizardStep::PickSlot)?;
        let (source_id, from_slot) = self.source.ok_or(WizardError::WrongStep {
            expected: WizardStep::PickSlot,
            actual: WizardStep::Closed,
        })?;
        if source.id != source_id {
            return Err(WizardError::SourceMismatch {
                expected: source_id,
                actual: source.id,
            });
        }
        let to_client_id = self.destination.as_ref().ok_or(WizardError::NoDestination)?.id;
        let to_slot = self.destination_slot.ok_or(WizardError::NoDestinationSlot)?;

        let request = TransferRequest {
            to_client_id,
            from_slot,
            to_slot,
        };
        let outcome = match self.service.transfer_slot(source_id, &request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(source = %source_id, destination = %to_client_id, error = %err, "slot transfer failed");
                self.notices
                    .push(Notice::error(format!("Transfer failed: {err}")));
                return Err(err.into());
            }
        };

        source.fields.take_slot(from_slot);
        self.step = WizardStep::Submitted;
        self.notices.push(Notice::success(format!(
            "Provider {from_slot} moved to {}",
            outcome.destination_name
        )));
        tracing::info!(source = %source_id, destination = %to_client_id, %from_slot, %to_slot, "slot transferred");
        Ok(outcome)
    }

    pub fn close(&mut self) {
        self.step = WizardStep::Closed;
        self.source = None;
        self.candidates.clear();
        self.term = None;
        self.page = 0;
        self.seen = 0;
        self.total = 0;
        self.destination = None;
        self.destination_slot = None;
    }

    fn source_id(&self) -> Result<RecordId, WizardError> {
        self.source
            .map(|(id, _)| id)
            .ok_or(WizardError::WrongStep {
                expected: WizardStep::PickDestination,
                actual: self.step,
            })
    }

    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }
}
