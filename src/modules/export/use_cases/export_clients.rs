// Purpose
// - Drive the two-step export dialog: delivery first, then fields.
//
// Responsibilities
// - Probe SMTP readiness when the dialog opens; e-mail delivery needs it.
// - Hold the field selection locally; nothing reaches the server before confirm.
// - Validate the request, send it, and name the downloaded file.

use crate::modules::export::core::ports::{
    Delivery, ExportReceipt, ExportRequest, ExportService,
};
use crate::modules::export::core::selector::{FieldSelection, GroupState, UnknownField};
use crate::modules::records::core::record::RecordFilters;
use crate::shared::core::errors::ServiceError;
use crate::shared::core::notices::{Notice, NoticeSink};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("select at least one field")]
    NoFields,

    #[error("recipient e-mail is blank")]
    MissingRecipient,

    #[error("SMTP is not configured")]
    SmtpNotReady,

    #[error("action not available on step {0:?}")]
    WrongStep(ExportStep),

    #[error(transparent)]
    UnknownField(#[from] UnknownField),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportStep {
    #[default]
    ChooseDelivery,
    ChooseFields,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryChoice {
    #[default]
    File,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved { file_name: String, bytes: Vec<u8> },
    Emailed { message: String },
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("clients_{}.xlsx", today.format("%Y-%m-%d"))
}

pub struct ExportDialog<S: ExportService> {
    service: Arc<S>,
    notices: Arc<dyn NoticeSink>,
    step: ExportStep,
    delivery: DeliveryChoice,
    recipient: String,
    selection: FieldSelection,
    smtp_ready: bool,
}

impl<S: ExportService> ExportDialog<S> {
    pub fn new(service: Arc<S>, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            service,
            notices,
            step: ExportStep::default(),
            delivery: DeliveryChoice::default(),
            recipient: String::new(),
            selection: FieldSelection::default(),
            smtp_ready: false,
        }
    }

    pub fn step(&self) -> ExportStep {
        self.step
    }

    pub fn delivery(&self) -> DeliveryChoice {
        self.delivery
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn selection(&self) -> &FieldSelection {
        &self.selection
    }

    pub fn smtp_ready(&self) -> bool {
        self.smtp_ready
    }

    /// Resets the dialog and probes the SMTP settings. A failed probe counts
    /// as "not ready".
    pub async fn open(&mut self) -> bool {
        self.step = ExportStep::ChooseDelivery;
        self.delivery = DeliveryChoice::File;
        self.recipient.clear();
        self.selection = FieldSelection::default();
        self.smtp_ready = match self.service.smtp_settings().await {
            Ok(settings) => settings.is_ready(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read SMTP settings");
                self.notices
                    .push(Notice::warning("Could not check mail settings, e-mail export is off"));
                false
            }
        };
        self.smtp_ready
    }

    pub fn choose_file(&mut self) {
        self.delivery = DeliveryChoice::File;
    }

    pub fn choose_email(&mut self, recipient: impl Into<String>) -> Result<(), ExportError> {
        if !self.smtp_ready {
            return Err(ExportError::SmtpNotReady);
        }
        self.delivery = DeliveryChoice::Email;
        self.recipient = recipient.into();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), ExportError> {
        if self.step != ExportStep::ChooseDelivery {
            return Err(ExportError::WrongStep(self.step));
        }
        if self.delivery == DeliveryChoice::Email && self.recipient.trim().is_empty() {
            return Err(ExportError::MissingRecipient);
        }
        self.step = ExportStep::ChooseFields;
        Ok(())
    }

    pub fn back(&mut self) {
        self.step = ExportStep::ChooseDelivery;
    }

    pub fn toggle_group(&mut self, group_key: &str) -> Result<GroupState, ExportError> {
        Ok(self.selection.toggle_group(group_key)?)
    }

    pub fn toggle_field(&mut self, field_key: &str) -> Result<bool, ExportError> {
        Ok(self.selection.toggle_field(field_key)?)
    }

    fn request(&self, filters: RecordFilters) -> Result<ExportRequest, ExportError> {
        if self.selection.is_empty() {
            return Err(ExportError::NoFields);
        }
        let delivery = match self.delivery {
            DeliveryChoice::File => Delivery::File,
            DeliveryChoice::Email => {
                if !self.smtp_ready {
                    return Err(ExportError::SmtpNotReady);
                }
                let to = self.recipient.trim();
                if to.is_empty() {
                    return Err(ExportError::MissingRecipient);
                }
                Delivery::Email { to: to.to_string() }
            }
        };
        Ok(ExportRequest {
            fields: self
                .selection
                .wire_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
            delivery,
            filters,
        })
    }

    /// Sends the export with the list filters currently applied.
    pub async fn confirm(
        &mut self,
        filters: RecordFilters,
        today: NaiveDate,
    ) -> Result<ExportOutcome, ExportError> {
        if self.step != ExportStep::ChooseFields {
            return Err(ExportError::WrongStep(self.step));
        }
        let request = match self.request(filters) {
            Ok(request) => request,
            Err(err) => {
                self.notices.push(Notice::error(format!("Export not sent: {err}")));
                return Err(err);
            }
        };
        tracing::info!(fields = request.fields.len(), send_via = request.delivery.send_via(), "exporting clients");
        match self.service.export(&request).await {
            Ok(ExportReceipt::File(bytes)) => {
                let file_name = export_file_name(today);
                self.notices.push(Notice::success(format!("Saved {file_name}")));
                Ok(ExportOutcome::Saved { file_name, bytes })
            }
            Ok(ExportReceipt::Emailed { message }) => {
                self.notices.push(Notice::success(message.clone()));
                Ok(ExportOutcome::Emailed { message })
            }
            Err(err) => {
                tracing::warn!(error = %err, "export failed");
                self.notices.push(Notice::error(format!("Export failed: {err}")));
                Err(err.into())
            }
        }
    }
}
