use anyhow::Context;
use support_console::shared::core::access::{Principal, Role, RoleName};
use support_console::shared::core::primitives::UserId;
use support_console::shell::config::AppConfig;
use support_console::shell::stub::{self, StubState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env().context("reading configuration")?;

    // In-memory backend for now
    let state = StubState::new();
    state
        .add_account(
            &config.admin_password,
            Principal {
                id: UserId(1),
                email: config.admin_email.clone(),
                full_name: "Administrator".into(),
                is_superuser: true,
                role: Some(Role::provisioned(RoleName::Admin)),
            },
        )
        .await;

    let app = stub::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(admin = %config.admin_email, "development backend: http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
