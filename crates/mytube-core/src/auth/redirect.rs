//! Hooks fired when the session is lost and the user has to log in again.

use std::fmt;

use tokio::sync::broadcast;
use tracing::debug;

/// Default login entry point of the web application
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Why a session was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// A request was rejected and no refresh token was stored
    NoRefreshToken,
    /// The refresh exchange itself failed
    RefreshRejected,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutReason::NoRefreshToken => f.write_str("no refresh token available"),
            LogoutReason::RefreshRejected => f.write_str("refresh token rejected"),
        }
    }
}

/// Receives the "go to login" signal on unrecoverable session loss.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, reason: LogoutReason);
}

/// Ignores redirects. Useful for scripts that only care about the error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRedirect;

impl LoginRedirect for NoopRedirect {
    fn redirect_to_login(&self, reason: LogoutReason) {
        debug!(%reason, "Login redirect ignored");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoginRequired {
        login_path: String,
        reason: LogoutReason,
    },
}

/// Publishes [`SessionEvent::LoginRequired`] to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChannelRedirect {
    login_path: String,
    sender: broadcast::Sender<SessionEvent>,
}

impl ChannelRedirect {
    pub fn new(login_path: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            login_path: login_path.into(),
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Default for ChannelRedirect {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH)
    }
}

impl LoginRedirect for ChannelRedirect {
    fn redirect_to_login(&self, reason: LogoutReason) {
        let event = SessionEvent::LoginRequired {
            login_path: self.login_path.clone(),
            reason,
        };
        // No subscribers is fine: nobody is listening for navigation
        if self.sender.send(event).is_err() {
            debug!(%reason, "Login redirect fired with no subscribers");
        }
    }
}
