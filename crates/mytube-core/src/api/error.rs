use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::models::UploadError;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// What the server said about a failed request.
///
/// `message` is the `error` field of a `{"error": "..."}` body when the
/// server sent one; `body` is the (truncated) raw response text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: Option<String>,
    pub body: String,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, self.body.is_empty()) {
            (Some(message), _) => f.write_str(message),
            (None, false) => f.write_str(&self.body),
            (None, true) => f.write_str("no details"),
        }
    }
}

#[derive(Deserialize)]
struct ServerErrorBody {
    error: Option<String>,
}

impl ErrorDetail {
    pub fn from_body(body: &str) -> Self {
        let message = serde_json::from_str::<ServerErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .filter(|m| !m.trim().is_empty());

        Self {
            message,
            body: truncate_body(body),
        }
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token may be expired")]
    Unauthorized(ErrorDetail),

    #[error("Access denied: {0}")]
    AccessDenied(ErrorDetail),

    #[error("Resource not found: {0}")]
    NotFound(ErrorDetail),

    #[error("Bad request: {0}")]
    BadRequest(ErrorDetail),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ErrorDetail),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(#[from] UploadError),

    /// The access token was rejected and exchanging the refresh token failed too.
    /// The session has been terminated.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = ErrorDetail::from_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::BadRequest(detail),
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// The server-provided `error` message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(detail)
            | ApiError::AccessDenied(detail)
            | ApiError::NotFound(detail)
            | ApiError::BadRequest(detail)
            | ApiError::ServerError(detail) => detail.message.as_deref(),
            ApiError::RefreshFailed(inner) => inner.server_message(),
            _ => None,
        }
    }
}
