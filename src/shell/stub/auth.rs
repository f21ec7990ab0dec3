// Token issuing and bearer checks of the development backend.

use crate::shared::core::access::Principal;
use crate::shared::core::errors::ServiceError;
use crate::shared::core::primitives::UserId;
use crate::shared::infrastructure::session::TokenPair;
use crate::shell::stub::{StubError, StubState, body};
use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

struct Account {
    password: String,
    principal: Principal,
}

#[derive(Default)]
struct Tokens {
    access: HashMap<String, UserId>,
    refresh: HashMap<String, UserId>,
}

#[derive(Default)]
pub struct StubAuth {
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<Tokens>,
}

fn issue() -> String {
    Uuid::now_v7().simple().to_string()
}

impl StubAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, password: &str, principal: Principal) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                principal.email.to_lowercase(),
                Account {
                    password: password.to_string(),
                    principal,
                },
            );
    }

    pub fn login(&self, email: &str, password: &str) -> Option<TokenPair> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        let account = accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)?;
        let pair = TokenPair {
            access: issue(),
            refresh: issue(),
        };
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        tokens.access.insert(pair.access.clone(), account.principal.id);
        tokens.refresh.insert(pair.refresh.clone(), account.principal.id);
        Some(pair)
    }

    /// A new access token for a known refresh token.
    pub fn refresh(&self, refresh: &str) -> Option<String> {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        let user = *tokens.refresh.get(refresh)?;
        let access = issue();
        tokens.access.insert(access.clone(), user);
        Some(access)
    }

    pub fn principal_for(&self, access: &str) -> Option<Principal> {
        let user = *self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .access
            .get(access)?;
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|account| account.principal.id == user)
            .map(|account| account.principal.clone())
    }

    /// Forgets every access token; refresh tokens keep working.
    pub fn expire_access_tokens(&self) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .access
            .clear();
    }

    pub fn revoke_refresh_tokens(&self) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh
            .clear();
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshBody {
    pub refresh: String,
}

pub async fn login(
    State(state): State<StubState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenPair>, StubError> {
    let credentials = body(payload)?;
    match state.auth.login(&credentials.email, &credentials.password) {
        Some(tokens) => {
            tracing::info!(email = %credentials.email, "issued token pair");
            Ok(Json(tokens))
        }
        None => Err(ServiceError::SessionExpired.into()),
    }
}

pub async fn refresh(
    State(state): State<StubState>,
    payload: Result<Json<RefreshBody>, JsonRejection>,
) -> Result<Json<Value>, StubError> {
    let payload = body(payload)?;
    let access = state
        .auth
        .refresh(&payload.refresh)
        .ok_or(ServiceError::SessionExpired)?;
    Ok(Json(json!({ "access": access })))
}

pub async fn me(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

pub async fn require_bearer(State(state): State<StubState>, mut request: Request, next: Next) -> Response {
    let principal = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| state.auth.principal_for(token));
    match principal {
        Some(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        None => StubError(ServiceError::SessionExpired).into_response(),
    }
}

#[cfg(test)]
mod stub_auth_tests {
    use crate::shell::stub::StubState;
    use crate::shell::stub::stub_test_support::{call, signed_in};
    use crate::test_support::fixtures::principals;
    use axum::http::StatusCode;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn before_each() -> StubState {
        StubState::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_issue_tokens_for_valid_credentials(before_each: StubState) {
        let state = before_each;
        state.add_account("secret", principals::admin()).await;

        let (status, tokens) = call(
            &state,
            "POST",
            "/auth/token",
            None,
            Some(json!({ "email": "user1@isp.test", "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = tokens["access"].as_str().unwrap().to_string();

        let (status, me) = call(&state, "GET", "/auth/users/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "user1@isp.test");
        assert_eq!(me["role_data"]["name"], "admin");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_bad_passwords(before_each: StubState) {
        let state = before_each;
        state.add_account("secret", principals::admin()).await;
        let (status, _) = call(
            &state,
            "POST",
            "/auth/token",
            None,
            Some(json!({ "email": "user1@isp.test", "password": "guess" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_require_a_live_bearer_token(before_each: StubState) {
        let state = before_each;
        let access = signed_in(&state, principals::admin()).await;
        assert_eq!(call(&state, "GET", "/records", None, None).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(call(&state, "GET", "/records", Some(&access), None).await.0, StatusCode::OK);

        state.auth.expire_access_tokens();
        assert_eq!(
            call(&state, "GET", "/records", Some(&access), None).await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_refresh_with_a_known_refresh_token(before_each: StubState) {
        let state = before_each;
        state.add_account("secret", principals::admin()).await;
        let pair = state.auth.login("user1@isp.test", "secret").unwrap();
        state.auth.expire_access_tokens();

        let (status, body) = call(
            &state,
            "POST",
            "/auth/token/refresh",
            None,
            Some(json!({ "refresh": pair.refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap();
        assert_eq!(call(&state, "GET", "/auth/users/me", Some(access), None).await.0, StatusCode::OK);

        state.auth.revoke_refresh_tokens();
        let (status, _) = call(
            &state,
            "POST",
            "/auth/token/refresh",
            None,
            Some(json!({ "refresh": pair.refresh })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
