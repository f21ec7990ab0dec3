// Draft lifecycle against the development backend over real HTTP.

mod common;

use common::{signed_in_console, spawn_backend};
use rstest::rstest;
use support_console::modules::records::adapters::in_memory_record_service::InMemoryRecordService;
use support_console::modules::records::core::record::{RecordFields, RecordQuery};
use support_console::modules::records::use_cases::draft_lifecycle::form_mode::FormMode;
use support_console::modules::records::use_cases::draft_lifecycle::manager::DraftError;
use support_console::shared::core::errors::ServiceError;
use support_console::shared::core::primitives::RecordId;

#[rstest]
#[tokio::test]
async fn it_should_commit_a_draft_under_the_same_id() {
    let harness = spawn_backend(InMemoryRecordService::starting_at(42)).await;
    let console = signed_in_console(&harness, 1).await;
    let mut form = console.state.draft_lifecycle();

    let id = form.enter_create_mode().await.unwrap();
    assert_eq!(id, RecordId(42));
    assert_eq!(console.state.preferences.pending_draft_id(), Some(RecordId(42)));

    let record = form
        .commit(RecordFields {
            address: "Main St 1".into(),
            ..RecordFields::default()
        })
        .await
        .unwrap();

    assert_eq!(record.id, RecordId(42));
    assert!(!record.is_draft);
    assert_eq!(form.mode(), FormMode::EditingCommitted(RecordId(42)));
    assert_eq!(console.state.preferences.pending_draft_id(), None);

    let page = console
        .state
        .record_actions()
        .list(&RecordQuery::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].display_name, "Main St 1");
}

#[rstest]
#[tokio::test]
async fn it_should_discard_an_abandoned_draft_before_creating_the_next() {
    let harness = spawn_backend(InMemoryRecordService::starting_at(42)).await;
    let console = signed_in_console(&harness, 1).await;
    let mut form = console.state.draft_lifecycle();

    form.enter_create_mode().await.unwrap();
    form.leave().await;
    assert_eq!(form.mode(), FormMode::Idle);

    let next = form.enter_create_mode().await.unwrap();
    assert_eq!(next, RecordId(43));
    assert_eq!(harness.backend.records.discarded().await, vec![RecordId(42)]);
    assert_eq!(harness.backend.records.draft_ids().await, vec![RecordId(43)]);
    assert_eq!(console.state.preferences.pending_draft_id(), Some(RecordId(43)));
}

#[rstest]
#[tokio::test]
async fn it_should_keep_the_draft_when_the_backend_rejects_the_commit() {
    let harness = spawn_backend(InMemoryRecordService::starting_at(42)).await;
    let console = signed_in_console(&harness, 1).await;
    let mut form = console.state.draft_lifecycle();
    form.enter_create_mode().await.unwrap();

    harness.backend.records.toggle_offline();
    let result = form
        .commit(RecordFields {
            address: "Main St 1".into(),
            ..RecordFields::default()
        })
        .await;

    assert!(matches!(result, Err(DraftError::Service(ServiceError::Unavailable(_)))));
    assert_eq!(form.mode(), FormMode::EditingDraft(RecordId(42)));
    assert_eq!(console.state.preferences.pending_draft_id(), Some(RecordId(42)));
}
