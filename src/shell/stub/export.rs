// Export and system settings endpoints of the development backend.

use crate::modules::export::adapters::wire::{ExportMessageDto, ExportRequestDto};
use crate::modules::export::core::ports::{ExportReceipt, ExportRequest, ExportService, SmtpSettings};
use crate::shell::stub::{StubError, StubState, body};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn system_settings(State(state): State<StubState>) -> Result<Json<SmtpSettings>, StubError> {
    Ok(Json(state.export.smtp_settings().await?))
}

pub async fn export_excel(
    State(state): State<StubState>,
    payload: Result<Json<ExportRequestDto>, JsonRejection>,
) -> Result<Response, StubError> {
    let request = ExportRequest::try_from(body(payload)?)?;
    match state.export.export(&request).await? {
        ExportReceipt::File(bytes) => Ok((
            [
                (CONTENT_TYPE, XLSX_CONTENT_TYPE),
                (CONTENT_DISPOSITION, "attachment; filename=\"clients.xlsx\""),
            ],
            bytes,
        )
            .into_response()),
        ExportReceipt::Emailed { message } => Ok(Json(ExportMessageDto { message }).into_response()),
    }
}

#[cfg(test)]
mod stub_export_tests {
    use crate::modules::export::core::ports::SmtpSettings;
    use crate::shell::stub::StubState;
    use crate::shell::stub::stub_test_support::{call, signed_in};
    use crate::test_support::fixtures::principals;
    use axum::http::StatusCode;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    async fn before_each() -> (StubState, String) {
        let state = StubState::new();
        let token = signed_in(&state, principals::admin()).await;
        (state, token)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_report_smtp_readiness_fields(#[future] before_each: (StubState, String)) {
        let (state, token) = before_each.await;
        let (status, settings) = call(&state, "GET", "/settings/system", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["has_smtp_password"], false);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_mail_when_smtp_is_configured(#[future] before_each: (StubState, String)) {
        let (state, token) = before_each.await;
        state
            .export
            .configure_smtp(SmtpSettings {
                smtp_host: "smtp.isp.test".into(),
                smtp_user: "robot".into(),
                has_smtp_password: true,
                smtp_from_email: "robot@isp.test".into(),
            })
            .await;

        let (status, body) = call(
            &state,
            "POST",
            "/records/export_excel",
            Some(&token),
            Some(json!({ "fields": "address,provider1", "send_via": "email", "to_email": "boss@isp.test" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("boss@isp.test"));
        assert_eq!(state.export.sent().await[0].fields, vec!["address", "provider1"]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_an_unknown_delivery(#[future] before_each: (StubState, String)) {
        let (state, token) = before_each.await;
        let (status, errors) = call(
            &state,
            "POST",
            "/records/export_excel",
            Some(&token),
            Some(json!({ "fields": "address", "send_via": "fax" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(errors.get("send_via").is_some());
    }
}
