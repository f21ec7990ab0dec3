// REST client shared by every HTTP adapter.
//
// Responsibilities
// - Attach the bearer token and a request id to each call.
// - On 401, refresh the access token once and retry the original request once.
//   If the refresh fails or the retry is rejected again, end the session and
//   report SessionExpired. No other call is ever retried.
// - Map error statuses onto ServiceError.

pub mod response;

use crate::shared::core::access::Principal;
use crate::shared::core::errors::ServiceError;
use crate::shared::infrastructure::session::{Session, TokenPair};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub use response::check_status;

pub const REFRESH_PATH: &str = "/auth/token/refresh";
pub const LOGIN_PATH: &str = "/auth/token";
pub const CURRENT_USER_PATH: &str = "/auth/users/me";

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ServiceError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ServiceError::Unexpected(format!("encode request body: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

#[derive(Deserialize)]
struct RefreshedAccess {
    access: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response, ServiceError> {
        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !request.authenticated {
            return check_status(response).await;
        }

        tracing::debug!(path = %request.path, "access token rejected, refreshing once");
        if let Err(err) = self.refresh_access_token().await {
            tracing::warn!(error = %err, "token refresh failed");
            self.session.end();
            return Err(ServiceError::SessionExpired);
        }

        let retried = self.dispatch(&request).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            self.session.end();
            return Err(ServiceError::SessionExpired);
        }
        check_status(retried).await
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ServiceError> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ServiceError::Unexpected(format!("decode response body: {err}")))
    }

    pub async fn fetch_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ServiceError> {
        let response = self.execute(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ServiceError::Unavailable(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    pub async fn send(&self, request: ApiRequest) -> Result<(), ServiceError> {
        self.execute(request).await.map(|_| ())
    }

    /// Exchanges credentials for a token pair, then loads the principal.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, ServiceError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .json(&json!({ "email": email, "password": password }))?
            .anonymous();
        let tokens: TokenPair = match self.fetch_json(request).await {
            Ok(tokens) => tokens,
            Err(ServiceError::SessionExpired) | Err(ServiceError::Forbidden(_)) => {
                return Err(ServiceError::validation(
                    "credentials",
                    "invalid email or password",
                ));
            }
            Err(err) => return Err(err),
        };
        self.session
            .begin(&tokens)
            .map_err(|err| ServiceError::Unexpected(err.to_string()))?;

        let principal: Principal = self.fetch_json(ApiRequest::get(CURRENT_USER_PATH)).await?;
        tracing::info!(user = %principal.id, "signed in");
        self.session.set_principal(principal.clone());
        Ok(principal)
    }

    pub fn logout(&self) {
        self.session.end();
    }

    // Goes straight to dispatch: the refresh call itself is never retried.
    async fn refresh_access_token(&self) -> Result<(), ServiceError> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or(ServiceError::SessionExpired)?;
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&json!({ "refresh": refresh }))?
            .anonymous();
        let refreshed = check_status(self.dispatch(&request).await?)
            .await?
            .json::<RefreshedAccess>()
            .await
            .map_err(|err| ServiceError::Unexpected(format!("decode refresh response: {err}")))?;
        self.session
            .replace_access_token(&refreshed.access)
            .map_err(|err| ServiceError::Unexpected(err.to_string()))
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, ServiceError> {
        let request_id = Uuid::now_v7();
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header("x-request-id", request_id.to_string());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.authenticated {
            if let Some(token) = self.session.access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let span = tracing::info_span!(
            "api_request",
            %request_id,
            method = %request.method,
            path = %request.path
        );
        async move {
            tracing::debug!("sending");
            let response = builder.send().await.map_err(|err| {
                tracing::warn!(error = %err, "api request failed");
                ServiceError::Unavailable(err.to_string())
            })?;
            tracing::debug!(status = %response.status(), "received");
            Ok::<_, ServiceError>(response)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod api_client_tests {
    use super::*;
    use crate::shared::core::access::{Role, RoleName};
    use crate::shared::core::primitives::UserId;
    use crate::shared::infrastructure::preferences::Preferences;
    use crate::shared::infrastructure::preferences::in_memory::InMemoryPreferenceStore;
    use crate::shell::stub::{self, StubState};
    use rstest::{fixture, rstest};

    struct BeforeEachReturn {
        backend: StubState,
        client: ApiClient,
    }

    #[fixture]
    async fn before_each() -> BeforeEachReturn {
        let backend = StubState::new();
        backend
            .add_account(
                "secret",
                Principal {
                    id: UserId(3),
                    email: "noc@isp.test".into(),
                    full_name: "Night Shift".into(),
                    is_superuser: false,
                    role: Some(Role::provisioned(RoleName::Sysadmin)),
                },
            )
            .await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = stub::router(backend.clone());
        tokio::spawn(async move { axum::serve(listener, app).await });

        let preferences = Preferences::new(Arc::new(InMemoryPreferenceStore::new()));
        let client = ApiClient::new(format!("http://{addr}"), Arc::new(Session::new(preferences)));
        client.login("noc@isp.test", "secret").await.unwrap();
        BeforeEachReturn { backend, client }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_retry_once_with_a_refreshed_token(#[future] before_each: BeforeEachReturn) {
        let BeforeEachReturn { backend, client } = before_each.await;
        let stale = client.session().access_token().unwrap();

        backend.auth.expire_access_tokens();
        let principal: Principal = client.fetch_json(ApiRequest::get(CURRENT_USER_PATH)).await.unwrap();

        assert_eq!(principal.id, UserId(3));
        let fresh = client.session().access_token().unwrap();
        assert_ne!(stale, fresh);
        assert_eq!(backend.auth.principal_for(&fresh).map(|p| p.id), Some(UserId(3)));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_end_the_session_when_the_refresh_is_rejected(
        #[future] before_each: BeforeEachReturn,
    ) {
        let BeforeEachReturn { backend, client } = before_each.await;

        backend.auth.expire_access_tokens();
        backend.auth.revoke_refresh_tokens();
        let result = client.send(ApiRequest::get(CURRENT_USER_PATH)).await;

        assert!(matches!(result, Err(ServiceError::SessionExpired)));
        assert!(!client.session().is_authenticated());
    }
}
