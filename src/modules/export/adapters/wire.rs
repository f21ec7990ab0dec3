// Request body of POST /records/export_excel.

use crate::modules::export::core::ports::{Delivery, ExportRequest};
use crate::modules::records::core::record::{RecordFilters, RecordStatus};
use crate::shared::core::errors::ServiceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequestDto {
    /// Comma separated wire keys.
    pub fields: String,
    pub send_via: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMessageDto {
    pub message: String,
}

impl From<&ExportRequest> for ExportRequestDto {
    fn from(request: &ExportRequest) -> Self {
        let to_email = match &request.delivery {
            Delivery::Email { to } => Some(to.trim().to_string()),
            Delivery::File => None,
        };
        ExportRequestDto {
            fields: request.fields.join(","),
            send_via: request.delivery.send_via().to_string(),
            to_email,
            search: request
                .filters
                .search
                .clone()
                .filter(|search| !search.trim().is_empty()),
            status: request.filters.status,
        }
    }
}

impl TryFrom<ExportRequestDto> for ExportRequest {
    type Error = ServiceError;

    fn try_from(dto: ExportRequestDto) -> Result<Self, Self::Error> {
        let delivery = match (dto.send_via.as_str(), dto.to_email) {
            ("file", _) => Delivery::File,
            ("email", Some(to)) if !to.trim().is_empty() => Delivery::Email { to },
            ("email", _) => return Err(ServiceError::validation("to_email", "This field is required.")),
            (other, _) => {
                return Err(ServiceError::validation(
                    "send_via",
                    format!("\"{other}\" is not a valid choice."),
                ));
            }
        };
        Ok(ExportRequest {
            fields: dto
                .fields
                .split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect(),
            delivery,
            filters: RecordFilters {
                search: dto.search,
                status: dto.status,
            },
        })
    }
}

#[cfg(test)]
mod export_wire_tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn it_should_omit_absent_optionals() {
        let request = ExportRequest {
            fields: vec!["address".into(), "provider1".into()],
            delivery: Delivery::File,
            filters: RecordFilters {
                search: Some("  ".into()),
                status: None,
            },
        };
        let body = serde_json::to_value(ExportRequestDto::from(&request)).unwrap();
        assert_eq!(body, json!({ "fields": "address,provider1", "send_via": "file" }));
    }

    #[rstest]
    fn it_should_require_a_recipient_for_email() {
        let dto = ExportRequestDto {
            fields: "address".into(),
            send_via: "email".into(),
            to_email: None,
            search: None,
            status: None,
        };
        assert!(matches!(
            ExportRequest::try_from(dto),
            Err(ServiceError::Validation(errors)) if errors.contains_key("to_email")
        ));
    }
}
