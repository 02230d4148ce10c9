//! API client for the mytube REST backend.
//!
//! Every call goes through [`ApiClient::execute`], which attaches the stored
//! access token and, when the server answers 401, exchanges the refresh token
//! for a new access token and replays the call once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::redirect::{LoginRedirect, LogoutReason};
use crate::auth::token_store::{TokenKey, TokenStore};
use crate::config::Config;
use crate::models::{RegisterRequest, UploadFile, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default backend when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds, applied to every call including refreshes.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const REFRESH_PATH: &str = "/api/auth/refresh";
const ME_PATH: &str = "/api/auth/me";
const LOGOUT_PATH: &str = "/api/auth/logout";
const CHECK_EMAIL_PATH: &str = "/api/auth/check-email";
const CHECK_USERNAME_PATH: &str = "/api/auth/check-username";

/// Spring Security's OAuth2 login entry point, suffixed with the provider id
const OAUTH_AUTHORIZATION_PATH: &str = "/oauth2/authorization";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email_or_username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<MultipartField>),
}

/// Description of an API call.
///
/// Kept separate from `reqwest::Request` so it can be rebuilt for a replay,
/// multipart bodies included.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One send of an [`ApiRequest`].
///
/// `retried` is set once the request has been through a refresh, so a second
/// 401 is returned to the caller instead of refreshing again.
#[derive(Debug, Clone, Default)]
struct Attempt {
    retried: bool,
    /// Token issued by the refresh, attached to the replay
    token: Option<String>,
}

impl Attempt {
    fn replay_with(token: String) -> Self {
        Self {
            retried: true,
            token: Some(token),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the mytube backend.
/// Clone is cheap - reqwest::Client and the token store are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            tokens,
            redirect,
        })
    }

    pub fn from_config(
        config: &Config,
        tokens: Arc<dyn TokenStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self, ApiError> {
        Self::new(config.api_url(), config.request_timeout(), tokens, redirect)
    }

    /// Same connection pool and token store, different redirect hook.
    pub fn with_redirect(&self, redirect: Arc<dyn LoginRedirect>) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            tokens: Arc::clone(&self.tokens),
            redirect,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    pub fn redirect(&self) -> Arc<dyn LoginRedirect> {
        Arc::clone(&self.redirect)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer credential, if there is one.
    ///
    /// `token` overrides the stored access token (used for replays and the
    /// OAuth2 callback). Without any token the request goes out unauthenticated.
    pub fn authorize(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let token = match token {
            Some(token) => Some(token.to_string()),
            None => self.tokens.get(TokenKey::Access),
        };
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn build(&self, request: &ApiRequest) -> RequestBuilder {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .header(header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(Self::build_form(fields)),
        }
    }

    fn build_form(fields: &[MultipartField]) -> multipart::Form {
        fields.iter().fold(multipart::Form::new(), |form, field| match field {
            MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartField::File { name, file } => form.part(
                name.clone(),
                multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
            ),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    /// Send a request with credentials, recovering once from an expired access token.
    ///
    /// A 401 on the first attempt triggers the refresh exchange. If it
    /// succeeds the new token is stored and the request is replayed exactly
    /// once; the replay's outcome is returned as-is. If there is no refresh
    /// token, or the exchange fails, the tokens are cleared and the login
    /// redirect fires. Every other response passes through untouched.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut attempt = Attempt::default();

        loop {
            let builder = self.authorize(self.build(request), attempt.token.as_deref());
            debug!(method = %request.method, path = %request.path, retried = attempt.retried, "Sending request");
            let response = builder.send().await?;

            if response.status() != StatusCode::UNAUTHORIZED || attempt.retried {
                return Self::check_response(response).await;
            }

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let rejected = ApiError::from_status(status, &body);
            let token = self.recover_session(request, rejected).await?;
            attempt = Attempt::replay_with(token);
        }
    }

    /// Handle a rejected access token: refresh it, or end the session.
    async fn recover_session(&self, request: &ApiRequest, rejected: ApiError) -> Result<String, ApiError> {
        let Some(refresh_token) = self.tokens.get(TokenKey::Refresh) else {
            warn!(path = %request.path, "Access token rejected and no refresh token stored, ending session");
            if let Err(e) = self.tokens.clear(TokenKey::Access) {
                warn!(error = %e, "Failed to clear access token");
            }
            self.redirect.redirect_to_login(LogoutReason::NoRefreshToken);
            return Err(rejected);
        };

        debug!(path = %request.path, "Access token rejected, refreshing");
        match self.refresh_access_token(&refresh_token).await {
            Ok(access_token) => {
                if let Err(e) = self.tokens.set(TokenKey::Access, &access_token) {
                    warn!(error = %e, "Failed to persist refreshed access token");
                }
                info!(path = %request.path, "Access token refreshed, replaying request");
                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                if let Err(e) = self.tokens.clear_all() {
                    warn!(error = %e, "Failed to clear stored tokens");
                }
                self.redirect.redirect_to_login(LogoutReason::RefreshRejected);
                Err(ApiError::RefreshFailed(Box::new(e)))
            }
        }
    }

    /// Send a request without credentials and without refresh handling.
    async fn execute_unauthenticated(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        debug!(method = %request.method, path = %request.path, "Sending unauthenticated request");
        let response = self.build(request).send().await?;
        Self::check_response(response).await
    }

    // ===== Generic helpers =====

    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        Self::parse_json(response, &request.path).await
    }

    /// Execute and discard the response body
    pub async fn send(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.fetch(&ApiRequest::put(path).json(body)?).await
    }

    // ===== Authentication =====

    /// Exchange credentials for a token pair. Does not touch the token store.
    pub async fn login(&self, email_or_username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            email_or_username,
            password,
        })?;
        let response = self.execute_unauthenticated(&request).await?;
        Self::parse_json(response, LOGIN_PATH).await
    }

    /// Create an account and receive a token pair. Does not touch the token store.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(REGISTER_PATH).json(request)?;
        let response = self.execute_unauthenticated(&request).await?;
        Self::parse_json(response, REGISTER_PATH).await
    }

    /// Exchange a refresh token for a new access token.
    /// Unauthenticated: the refresh token travels in the body.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest { refresh_token })?;
        let response = self.execute_unauthenticated(&request).await?;
        let refreshed: RefreshResponse = Self::parse_json(response, REFRESH_PATH).await?;
        if refreshed.access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Refresh response carried an empty access token".to_string(),
            ));
        }
        Ok(refreshed.access_token)
    }

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get(ME_PATH).await
    }

    /// Fetch the user behind an explicit token, bypassing the token store.
    /// Used to verify the token handed back by an OAuth2 provider.
    pub async fn current_user_with_token(&self, token: &str) -> Result<UserProfile, ApiError> {
        let builder = self.authorize(self.build(&ApiRequest::get(ME_PATH)), Some(token));
        let response = Self::check_response(builder.send().await?).await?;
        Self::parse_json(response, ME_PATH).await
    }

    /// Best-effort server-side logout
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(&ApiRequest::post(LOGOUT_PATH)).await
    }

    pub async fn check_email(&self, email: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::get(CHECK_EMAIL_PATH).query("email", email);
        let response = self.execute_unauthenticated(&request).await?;
        let parsed: ExistsResponse = Self::parse_json(response, CHECK_EMAIL_PATH).await?;
        Ok(parsed.exists)
    }

    pub async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::get(CHECK_USERNAME_PATH).query("username", username);
        let response = self.execute_unauthenticated(&request).await?;
        let parsed: ExistsResponse = Self::parse_json(response, CHECK_USERNAME_PATH).await?;
        Ok(parsed.exists)
    }

    /// Where to send the browser to start an OAuth2 login (e.g. `google`, `github`)
    pub fn oauth_authorization_url(&self, provider: &str) -> String {
        self.url(&format!("{}/{}", OAUTH_AUTHORIZATION_PATH, provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::redirect::{ChannelRedirect, SessionEvent};
    use crate::auth::token_store::MemoryTokenStore;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> (ApiClient, ChannelRedirect) {
        let redirect = ChannelRedirect::default();
        let client = ApiClient::new(
            server.uri(),
            Duration::from_secs(5),
            store,
            Arc::new(redirect.clone()),
        )
        .expect("client should build");
        (client, redirect)
    }

    fn has_no_auth(request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/trending"))
            .and(has_no_auth)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let videos: Vec<serde_json::Value> = client.get("/api/videos/trending").await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_request_with_token_carries_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile/stats"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalVideos": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), None));
        let (client, _) = client_for(&server, store);
        let stats: serde_json::Value = client.get("/api/users/profile/stats").await.unwrap();
        assert_eq!(stats["totalVideos"], 2);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_request_replayed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(has_no_auth)
            .and(body_json(json!({"refreshToken": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
            .expect(1)
            .mount(&server)
            .await;
        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), Some("R1")));
        let stored = store.clone();
        // The replay only matches once the new token is already persisted
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .and(header("authorization", "Bearer A2"))
            .and(move |_: &Request| stored.get(TokenKey::Access).as_deref() == Some("A2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "anna"})))
            .expect(1)
            .mount(&server)
            .await;

        let (client, redirect) = client_for(&server, store.clone());
        let mut events = redirect.subscribe();

        let profile: serde_json::Value = client.get("/api/users/profile").await.unwrap();
        assert_eq!(profile["username"], "anna");
        assert_eq!(store.get(TokenKey::Access).as_deref(), Some("A2"));
        assert_eq!(store.get(TokenKey::Refresh).as_deref(), Some("R1"));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replay_rejected_again_is_not_refreshed_twice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/v1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), Some("R1")));
        let (client, _) = client_for(&server, store.clone());

        let err = client.get::<serde_json::Value>("/api/videos/v1").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(store.get(TokenKey::Access).as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_missing_refresh_token_ends_session_without_refresh_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "expired"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), None));
        let (client, redirect) = client_for(&server, store.clone());
        let mut events = redirect.subscribe();

        let err = client.get::<serde_json::Value>("/api/users/profile").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), Some("expired"));
        assert_eq!(store.get(TokenKey::Access), None);
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::LoginRequired { reason: LogoutReason::NoRefreshToken, .. }
        ));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_tokens_and_surfaces_refresh_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "Token refresh failed"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), Some("R1")));
        let (client, redirect) = client_for(&server, store.clone());
        let mut events = redirect.subscribe();

        let err = client.get::<serde_json::Value>("/api/users/profile").await.unwrap_err();
        match err {
            ApiError::RefreshFailed(ref inner) => assert!(inner.is_unauthorized()),
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
        assert_eq!(err.server_message(), Some("Token refresh failed"));
        assert_eq!(store.get(TokenKey::Access), None);
        assert_eq!(store.get(TokenKey::Refresh), None);
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::LoginRequired { reason: LogoutReason::RefreshRejected, .. }
        ));
    }

    #[tokio::test]
    async fn test_non_auth_errors_pass_through_without_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/videos/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Video not found"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), Some("R1")));
        let (client, _) = client_for(&server, store.clone());

        let err = client.get::<serde_json::Value>("/api/videos/missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(store.get(TokenKey::Access).as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_multipart_request_is_replayed_after_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/avatar"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/users/avatar"))
            .and(header("authorization", "Bearer A2"))
            .and(|req: &Request| {
                String::from_utf8_lossy(&req.body).contains("filename=\"me.png\"")
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"avatarUrl": "/a.png"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(Some("A1"), Some("R1")));
        let (client, _) = client_for(&server, store);

        let request = ApiRequest::post("/api/users/avatar").multipart(vec![MultipartField::File {
            name: "avatar".to_string(),
            file: UploadFile::new("me.png", vec![1, 2, 3]),
        }]);
        let body: serde_json::Value = client.fetch(&request).await.unwrap();
        assert_eq!(body["avatarUrl"], "/a.png");
    }

    #[tokio::test]
    async fn test_login_is_unauthenticated_and_parses_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(has_no_auth)
            .and(body_json(json!({"emailOrUsername": "anna", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "A1",
                "refreshToken": "R1",
                "tokenType": "Bearer",
                "user": {"id": "u1", "email": "anna@example.com", "username": "anna", "role": "USER"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        // A stale token in the store must not leak into the login call
        let store = Arc::new(MemoryTokenStore::with_tokens(Some("OLD"), None));
        let (client, _) = client_for(&server, store.clone());
        let auth = client.login("anna", "secret1").await.unwrap();
        assert_eq!(auth.access_token, "A1");
        assert_eq!(auth.refresh_token, "R1");
        assert_eq!(auth.user.username, "anna");
        assert_eq!(store.get(TokenKey::Access).as_deref(), Some("OLD"));
    }

    #[tokio::test]
    async fn test_rejected_login_does_not_trigger_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_tokens(None, Some("R1")));
        let (client, _) = client_for(&server, store);
        let err = client.login("anna", "wrong").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_refresh_rejects_empty_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": ""})))
            .mount(&server)
            .await;

        let (client, _) = client_for(&server, Arc::new(MemoryTokenStore::new()));
        let err = client.refresh_access_token("R1").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_oauth_authorization_url() {
        let client = ApiClient::new(
            "http://localhost:8080/",
            Duration::from_secs(1),
            Arc::new(MemoryTokenStore::new()),
            Arc::new(crate::auth::redirect::NoopRedirect),
        )
        .unwrap();
        assert_eq!(
            client.oauth_authorization_url("github"),
            "http://localhost:8080/oauth2/authorization/github"
        );
    }
}
