use crate::modules::records::core::record::RecordFilters;
use crate::shared::core::errors::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    File,
    Email { to: String },
}

impl Delivery {
    pub fn send_via(&self) -> &'static str {
        match self {
            Delivery::File => "file",
            Delivery::Email { .. } => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Wire keys in catalog order.
    pub fields: Vec<String>,
    pub delivery: Delivery,
    pub filters: RecordFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportReceipt {
    /// Spreadsheet bytes to save.
    File(Vec<u8>),
    /// Server confirmation that the mail went out.
    Emailed { message: String },
}

/// The SMTP part of the system settings. Passwords are never returned, only
/// whether one is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub smtp_host: String,
    pub smtp_user: String,
    pub has_smtp_password: bool,
    pub smtp_from_email: String,
}

impl SmtpSettings {
    pub fn is_ready(&self) -> bool {
        !self.smtp_host.trim().is_empty()
            && !self.smtp_user.trim().is_empty()
            && self.has_smtp_password
            && !self.smtp_from_email.trim().is_empty()
    }
}

#[async_trait]
pub trait ExportService: Send + Sync {
    async fn smtp_settings(&self) -> Result<SmtpSettings, ServiceError>;
    async fn export(&self, request: &ExportRequest) -> Result<ExportReceipt, ServiceError>;
}

#[cfg(test)]
mod smtp_settings_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_need_every_smtp_field() {
        let mut settings = SmtpSettings {
            smtp_host: "smtp.isp.test".into(),
            smtp_user: "robot".into(),
            has_smtp_password: true,
            smtp_from_email: "robot@isp.test".into(),
        };
        assert!(settings.is_ready());
        settings.has_smtp_password = false;
        assert!(!settings.is_ready());
        assert!(!SmtpSettings::default().is_ready());
    }
}
