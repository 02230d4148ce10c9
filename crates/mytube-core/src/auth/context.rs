//! The authenticated session as seen by the rest of the application.
//!
//! `AuthSession` owns the current [`Session`] and is the only place that
//! writes the credential pair on login, registration and logout.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use url::Url;

use crate::api::{ApiClient, AuthResponse};
use crate::models::{RegisterRequest, UpdateProfileRequest, UserProfile};

use super::error::AuthenticationError;
use super::redirect::{LoginRedirect, LogoutReason};
use super::session::Session;
use super::token_store::{TokenKey, TokenStore};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const OAUTH_FAILED: &str = "Failed to complete authorization";

/// Clears the in-memory session before handing the redirect on.
///
/// Installed on the context's client so a failed refresh anywhere in the
/// application also leaves the session signed out.
struct SessionReset {
    session: Arc<RwLock<Session>>,
    inner: Arc<dyn LoginRedirect>,
}

impl LoginRedirect for SessionReset {
    fn redirect_to_login(&self, reason: LogoutReason) {
        self.session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.inner.redirect_to_login(reason);
    }
}

pub struct AuthSession {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    session: Arc<RwLock<Session>>,
}

impl AuthSession {
    /// Wrap a client. The session starts out `Restoring` until
    /// [`restore_session`](Self::restore_session) runs.
    pub fn new(api: ApiClient) -> Self {
        let session = Arc::new(RwLock::new(Session::restoring()));
        let reset = SessionReset {
            session: Arc::clone(&session),
            inner: api.redirect(),
        };
        let api = api.with_redirect(Arc::new(reset));
        let tokens = api.tokens();

        Self {
            api,
            tokens,
            session,
        }
    }

    /// The client feature code should use; shares this session's redirect handling.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.read_session().clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.read_session().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_session().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.read_session().is_loading()
    }

    fn clear_tokens(&self) {
        if let Err(e) = self.tokens.clear_all() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
    }

    /// Rebuild the session from stored tokens at startup.
    ///
    /// Never fails: a missing or rejected token leaves an empty session. The
    /// session is `Ready` afterwards in every case.
    pub async fn restore_session(&self) -> Session {
        let Some(stored_token) = self.tokens.get(TokenKey::Access) else {
            debug!("No stored access token, starting signed out");
            self.write_session().clear();
            return self.session();
        };

        match self.api.current_user().await {
            Ok(user) => {
                // The call may have refreshed the token on the way
                let token = self.tokens.get(TokenKey::Access).unwrap_or(stored_token);
                info!(username = %user.username, "Session restored");
                *self.write_session() = Session::authenticated(user, token);
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore session, clearing stored tokens");
                self.clear_tokens();
                self.write_session().clear();
            }
        }
        self.session()
    }

    fn establish(&self, auth: AuthResponse, fallback: &str) -> Result<UserProfile, AuthenticationError> {
        let stored = self
            .tokens
            .set(TokenKey::Access, &auth.access_token)
            .and_then(|_| self.tokens.set(TokenKey::Refresh, &auth.refresh_token));
        if let Err(e) = stored {
            warn!(error = %e, "Failed to persist credentials");
            self.clear_tokens();
            return Err(AuthenticationError::new(fallback));
        }

        *self.write_session() = Session::authenticated(auth.user.clone(), auth.access_token);
        Ok(auth.user)
    }

    /// Sign in with an email or username and password
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserProfile, AuthenticationError> {
        let auth = self
            .api
            .login(identifier, password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Login rejected");
                AuthenticationError::from_api(e, LOGIN_FAILED)
            })?;

        let user = self.establish(auth, LOGIN_FAILED)?;
        info!(username = %user.username, "Logged in");
        Ok(user)
    }

    /// Create an account and sign in with it
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, AuthenticationError> {
        let auth = self.api.register(request).await.map_err(|e| {
            warn!(error = %e, "Registration rejected");
            AuthenticationError::from_api(e, REGISTRATION_FAILED)
        })?;

        let user = self.establish(auth, REGISTRATION_FAILED)?;
        info!(username = %user.username, "Registered");
        Ok(user)
    }

    /// Sign out. Local state is cleared even when the server call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.clear_tokens();
        self.write_session().clear();
        info!("Logged out");
    }

    /// Finish an OAuth2 login from the provider callback.
    ///
    /// Accepts the full callback URL (`.../oauth2/redirect?token=...`) or
    /// just its query string. The provider hands back an access token only,
    /// so the resulting session has no refresh token.
    pub async fn complete_oauth_redirect(&self, callback: &str) -> Result<UserProfile, AuthenticationError> {
        let (token, error) = parse_oauth_callback(callback);

        if let Some(error) = error {
            warn!(%error, "OAuth2 provider returned an error");
            return Err(AuthenticationError::new(format!(
                "OAuth2 provider rejected authorization: {}",
                error
            )));
        }
        let Some(token) = token else {
            return Err(AuthenticationError::new("Missing authorization token"));
        };

        // Nothing is stored until the token is known to work
        let user = match self.api.current_user_with_token(&token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to fetch user after OAuth2 login");
                return Err(AuthenticationError::from_api(e, OAUTH_FAILED));
            }
        };

        if let Err(e) = self.tokens.set(TokenKey::Access, &token) {
            warn!(error = %e, "Failed to persist OAuth2 access token");
            return Err(AuthenticationError::new(OAUTH_FAILED));
        }
        // A refresh token left from an earlier login belongs to another session
        if let Err(e) = self.tokens.clear(TokenKey::Refresh) {
            warn!(error = %e, "Failed to clear stale refresh token");
        }

        info!(username = %user.username, "Logged in via OAuth2");
        *self.write_session() = Session::authenticated(user.clone(), token);
        Ok(user)
    }

    /// Refetch the signed-in user, e.g. after a channel was created
    pub async fn refresh_user(&self) -> Result<UserProfile, crate::api::ApiError> {
        let user = self.api.current_user().await?;
        let mut session = self.write_session();
        if let Some(token) = self.tokens.get(TokenKey::Access) {
            *session = Session::authenticated(user.clone(), token);
        }
        Ok(user)
    }

    /// Update the profile and replace the session's copy of the user
    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<UserProfile, crate::api::ApiError> {
        let user = self.api.update_profile(update).await?;
        let mut session = self.write_session();
        if session.is_authenticated() {
            session.user = Some(user.clone());
        }
        Ok(user)
    }
}

/// Extract `token` and `error` from an OAuth2 callback URL or query string
fn parse_oauth_callback(callback: &str) -> (Option<String>, Option<String>) {
    let callback = callback.trim();
    let query = match Url::parse(callback) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => callback.trim_start_matches('?').to_string(),
    };

    let mut token = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "token" if !value.is_empty() => token = Some(value.into_owned()),
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            _ => {}
        }
    }
    (token, error)
}
