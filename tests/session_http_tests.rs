// Token refresh and session wipe over real HTTP.

mod common;

use common::{PASSWORD, signed_in_console, spawn_backend};
use rstest::rstest;
use support_console::modules::records::adapters::in_memory_record_service::InMemoryRecordService;
use support_console::modules::records::core::ports::RecordService;
use support_console::modules::records::core::record::RecordQuery;
use support_console::shared::core::errors::ServiceError;

#[rstest]
#[tokio::test]
async fn it_should_load_the_principal_on_login() {
    let harness = spawn_backend(InMemoryRecordService::new()).await;
    let console = signed_in_console(&harness, 4).await;

    let principal = console.state.session.principal().unwrap();
    assert_eq!(principal.email, "user4@isp.test");
    assert!(!principal.is_admin());
    assert!(console.state.session.is_authenticated());
}

#[rstest]
#[tokio::test]
async fn it_should_turn_bad_credentials_into_a_validation_error() {
    let harness = spawn_backend(InMemoryRecordService::new()).await;
    let console = signed_in_console(&harness, 1).await;
    console.state.logout();

    let result = console.state.login("user1@isp.test", "wrong").await;
    assert!(matches!(result, Err(ServiceError::Validation(errors)) if errors.contains_key("credentials")));
    assert!(!console.state.session.is_authenticated());

    console.state.login("user1@isp.test", PASSWORD).await.unwrap();
    assert!(console.state.session.is_authenticated());
}

#[rstest]
#[tokio::test]
async fn it_should_refresh_an_expired_access_token_once() {
    let harness = spawn_backend(InMemoryRecordService::new()).await;
    let console = signed_in_console(&harness, 1).await;
    let before = console.state.preferences.access_token().unwrap();

    harness.backend.auth.expire_access_tokens();
    let page = console.state.records.list(&RecordQuery::default()).await.unwrap();

    assert_eq!(page.count, 0);
    let after = console.state.preferences.access_token().unwrap();
    assert_ne!(before, after);
    assert!(console.state.session.is_authenticated());
}

#[rstest]
#[tokio::test]
async fn it_should_wipe_credentials_when_the_refresh_fails() {
    let harness = spawn_backend(InMemoryRecordService::new()).await;
    let console = signed_in_console(&harness, 1).await;

    harness.backend.auth.expire_access_tokens();
    harness.backend.auth.revoke_refresh_tokens();
    let result = console.state.records.list(&RecordQuery::default()).await;

    assert!(matches!(result, Err(ServiceError::SessionExpired)));
    assert!(!console.state.session.is_authenticated());
    assert_eq!(console.state.preferences.refresh_token(), None);
    assert!(console.state.session.principal().is_none());
}
