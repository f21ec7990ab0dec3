// Export backend for tests and the development server.
//
// Real spreadsheet generation and mail delivery live in the production
// backend. Here a "file" is tab separated text, one line per matching record,
// and an e-mail is only recorded.

use crate::modules::export::core::catalog;
use crate::modules::export::core::ports::{
    Delivery, ExportReceipt, ExportRequest, ExportService, SmtpSettings,
};
use crate::modules::records::adapters::in_memory_record_service::InMemoryRecordService;
use crate::modules::records::core::provider_slot::ProviderSlot;
use crate::modules::records::core::record::{Record, RecordQuery};
use crate::modules::records::core::ports::RecordService;
use crate::shared::core::errors::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentExport {
    pub to: String,
    pub fields: Vec<String>,
    pub rows: usize,
}

pub struct InMemoryExportService {
    records: Arc<InMemoryRecordService>,
    smtp: RwLock<SmtpSettings>,
    sent: RwLock<Vec<SentExport>>,
    is_offline: AtomicBool,
}

impl InMemoryExportService {
    pub fn new(records: Arc<InMemoryRecordService>) -> Self {
        Self {
            records,
            smtp: RwLock::new(SmtpSettings::default()),
            sent: RwLock::new(Vec::new()),
            is_offline: AtomicBool::new(false),
        }
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub async fn configure_smtp(&self, settings: SmtpSettings) {
        *self.smtp.write().await = settings;
    }

    pub async fn sent(&self) -> Vec<SentExport> {
        self.sent.read().await.clone()
    }

    fn ensure_online(&self) -> Result<(), ServiceError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("export service is offline".into()));
        }
        Ok(())
    }

    async fn matching_records(&self, request: &ExportRequest) -> Result<Vec<Record>, ServiceError> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let query = RecordQuery {
                page,
                filters: request.filters.clone(),
            };
            let listed = self.records.list(&query).await?;
            if listed.results.is_empty() {
                break;
            }
            for summary in listed.results {
                records.push(self.records.get(summary.id).await?);
            }
            if records.len() as u64 >= listed.count {
                break;
            }
            page += 1;
        }
        Ok(records)
    }
}

fn cell(record: &Record, key: &str) -> String {
    let fields = &record.fields;
    match key {
        "address" => fields.address.clone(),
        "company" => fields.company.clone(),
        "inn" => fields.inn.clone(),
        "phone" => fields.phone.clone(),
        "email" => fields.email.clone(),
        "pharmacy_code" => fields.pharmacy_code.clone(),
        "iccid" => fields.iccid.clone(),
        "status" => fields.status.as_str().to_string(),
        "subnet" => fields.subnet.clone(),
        "external_ip" => fields.external_ip.clone(),
        "mikrotik_ip" => fields.mikrotik_ip(),
        "server_ip" => fields.server_ip(),
        "provider1" => fields.slot(ProviderSlot::One).preview(),
        "provider2" => fields.slot(ProviderSlot::Two).preview(),
        _ => String::new(),
    }
}

fn validate(request: &ExportRequest) -> Result<(), ServiceError> {
    if request.fields.is_empty() {
        return Err(ServiceError::validation("fields", "Select at least one field."));
    }
    let known = catalog::wire_keys();
    if let Some(unknown) = request.fields.iter().find(|field| !known.contains(&field.as_str())) {
        return Err(ServiceError::validation("fields", format!("Unknown field \"{unknown}\".")));
    }
    Ok(())
}

#[async_trait]
impl ExportService for InMemoryExportService {
    async fn smtp_settings(&self) -> Result<SmtpSettings, ServiceError> {
        self.ensure_online()?;
        Ok(self.smtp.read().await.clone())
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportReceipt, ServiceError> {
        self.ensure_online()?;
        validate(request)?;
        let records = self.matching_records(request).await?;
        match &request.delivery {
            Delivery::File => {
                let mut lines = vec![request.fields.join("\t")];
                lines.extend(records.iter().map(|record| {
                    request
                        .fields
                        .iter()
                        .map(|key| cell(record, key))
                        .collect::<Vec<_>>()
                        .join("\t")
                }));
                Ok(ExportReceipt::File(lines.join("\n").into_bytes()))
            }
            Delivery::Email { to } => {
                if !self.smtp.read().await.is_ready() {
                    return Err(ServiceError::validation("send_via", "SMTP is not configured."));
                }
                self.sent.write().await.push(SentExport {
                    to: to.clone(),
                    fields: request.fields.clone(),
                    rows: records.len(),
                });
                Ok(ExportReceipt::Emailed {
                    message: format!("Export with {} clients sent to {to}", records.len()),
                })
            }
        }
    }
}
