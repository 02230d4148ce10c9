use thiserror::Error;

use crate::api::ApiError;

/// A login, registration or OAuth2 completion that did not produce a session.
///
/// The message is meant for the user: the server's explanation when it sent
/// one, otherwise a generic fallback.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthenticationError {
    message: String,
    #[source]
    source: Option<ApiError>,
}

impl AuthenticationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an API failure, preferring the server's message over `fallback`
    pub fn from_api(err: ApiError, fallback: &str) -> Self {
        let message = err.server_message().unwrap_or(fallback).to_string();
        Self {
            message,
            source: Some(err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        self.source.as_ref()
    }
}
