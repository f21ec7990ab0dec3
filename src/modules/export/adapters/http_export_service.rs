use crate::modules::export::adapters::wire::{ExportMessageDto, ExportRequestDto};
use crate::modules::export::core::ports::{
    Delivery, ExportReceipt, ExportRequest, ExportService, SmtpSettings,
};
use crate::shared::core::errors::ServiceError;
use crate::shared::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;

pub struct HttpExportService {
    api: ApiClient,
}

impl HttpExportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ExportService for HttpExportService {
    async fn smtp_settings(&self) -> Result<SmtpSettings, ServiceError> {
        self.api.fetch_json(ApiRequest::get("/settings/system")).await
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportReceipt, ServiceError> {
        let call = ApiRequest::post("/records/export_excel").json(&ExportRequestDto::from(request))?;
        match request.delivery {
            Delivery::File => Ok(ExportReceipt::File(self.api.fetch_bytes(call).await?)),
            Delivery::Email { .. } => {
                let reply: ExportMessageDto = self.api.fetch_json(call).await?;
                Ok(ExportReceipt::Emailed {
                    message: reply.message,
                })
            }
        }
    }
}
