use crate::models::UserProfile;

/// Whether startup restoration has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// `restore_session` has not completed yet
    #[default]
    Restoring,
    /// Restoration finished (authenticated or not)
    Ready,
}

/// The signed-in user and the access token backing them.
///
/// Derived from the token store and `/api/auth/me`; never persisted itself.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub state: SessionState,
}

impl Session {
    /// A session that has not been restored yet
    pub fn restoring() -> Self {
        Self::default()
    }

    /// A finished, signed-out session
    pub fn empty() -> Self {
        Self {
            user: None,
            token: None,
            state: SessionState::Ready,
        }
    }

    pub fn authenticated(user: UserProfile, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            state: SessionState::Ready,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Restoring
    }

    /// Drop user and token, keeping the session in the ready state
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
