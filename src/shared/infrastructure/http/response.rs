// Status code to ServiceError mapping.

use crate::shared::core::errors::{FieldErrors, ServiceError};
use reqwest::StatusCode;
use serde_json::Value;

pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &url, &body))
}

pub fn error_for_status(status: StatusCode, path: &str, body: &str) -> ServiceError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::Validation(field_errors(body))
        }
        StatusCode::UNAUTHORIZED => ServiceError::SessionExpired,
        StatusCode::FORBIDDEN => ServiceError::Forbidden(detail(body).unwrap_or_else(|| path.to_string())),
        StatusCode::NOT_FOUND => ServiceError::NotFound(path.to_string()),
        status if status.is_server_error() => {
            ServiceError::Unavailable(format!("{status}: {}", detail(body).unwrap_or_default()))
        }
        status => ServiceError::Unexpected(format!("{status}: {}", detail(body).unwrap_or_default())),
    }
}

/// Reads `{"field": ["msg", ...]}` or `{"field": "msg"}`; anything else lands
/// under `detail`.
pub fn field_errors(body: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            for (field, value) in map {
                let messages = match value {
                    Value::Array(items) => items.iter().map(message_text).collect(),
                    other => vec![message_text(&other)],
                };
                errors.insert(field, messages);
            }
        }
        _ if body.trim().is_empty() => {
            errors.insert("detail".into(), vec!["request rejected".into()]);
        }
        _ => {
            errors.insert("detail".into(), vec![body.trim().to_string()]);
        }
    }
    errors
}

fn detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| value.get(key).map(message_text))
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod response_mapping_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_read_field_errors_in_both_shapes() {
        let errors = field_errors(r#"{"address": ["This field is required."], "email": "Invalid"}"#);
        assert_eq!(errors["address"], vec!["This field is required."]);
        assert_eq!(errors["email"], vec!["Invalid"]);
    }

    #[rstest]
    fn it_should_keep_plain_text_bodies_as_detail() {
        let errors = field_errors("bad input");
        assert_eq!(errors["detail"], vec!["bad input"]);
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, ServiceError::SessionExpired)]
    #[case(StatusCode::NOT_FOUND, ServiceError::NotFound("/records/9".into()))]
    #[case(StatusCode::FORBIDDEN, ServiceError::Forbidden("no".into()))]
    fn it_should_map_statuses(#[case] status: StatusCode, #[case] expected: ServiceError) {
        assert_eq!(error_for_status(status, "/records/9", r#"{"detail": "no"}"#), expected);
    }

    #[rstest]
    fn it_should_classify_server_errors_as_unavailable() {
        let err = error_for_status(StatusCode::BAD_GATEWAY, "/events", r#"{"error": "upstream"}"#);
        assert!(matches!(err, ServiceError::Unavailable(message) if message.contains("upstream")));
    }
}
