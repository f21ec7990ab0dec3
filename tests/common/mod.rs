// Shared setup for the tests that drive the development backend over HTTP.
#![allow(dead_code)]

use std::sync::Arc;
use support_console::modules::records::adapters::in_memory_record_service::InMemoryRecordService;
use support_console::shared::core::access::{Principal, Role, RoleName};
use support_console::shared::core::notices::NoticeLog;
use support_console::shared::core::primitives::UserId;
use support_console::shared::infrastructure::preferences::in_memory::InMemoryPreferenceStore;
use support_console::shell::state::ConsoleState;
use support_console::shell::stub::{self, StubState};

pub const PASSWORD: &str = "secret";

pub fn principal(id: u64, role: RoleName) -> Principal {
    Principal {
        id: UserId(id),
        email: format!("user{id}@isp.test"),
        full_name: format!("User {id}"),
        is_superuser: false,
        role: Some(Role::provisioned(role)),
    }
}

pub struct Harness {
    pub backend: StubState,
    pub base_url: String,
}

/// Serves the backend on an ephemeral port for the rest of the test.
pub async fn spawn_backend(records: InMemoryRecordService) -> Harness {
    let backend = StubState::with_records(records);
    backend.add_account(PASSWORD, principal(1, RoleName::Admin)).await;
    backend.add_account(PASSWORD, principal(4, RoleName::Communications)).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = stub::router(backend.clone());
    tokio::spawn(async move { axum::serve(listener, app).await });

    Harness {
        backend,
        base_url: format!("http://{addr}"),
    }
}

pub struct Console {
    pub state: ConsoleState,
    pub notices: Arc<NoticeLog>,
}

pub async fn signed_in_console(harness: &Harness, user_id: u64) -> Console {
    let notices = Arc::new(NoticeLog::new());
    let state = ConsoleState::with_store(
        &harness.base_url,
        Arc::new(InMemoryPreferenceStore::new()),
        notices.clone(),
    );
    state
        .login(&format!("user{user_id}@isp.test"), PASSWORD)
        .await
        .unwrap();
    Console { state, notices }
}
