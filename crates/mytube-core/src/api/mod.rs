//! REST API client module for the mytube backend.
//!
//! This module provides the `ApiClient` for talking to the backend's
//! auth, video, user, channel and comment endpoints.
//!
//! Requests carry `Authorization: Bearer <accessToken>` whenever a token is
//! stored. An expired access token is renewed with the refresh token and the
//! failed call replayed once, so feature code never sees the expiry.

pub mod client;
pub mod error;
pub mod resources;

pub use client::{ApiClient, ApiRequest, AuthResponse, MultipartField, RequestBody};
pub use error::{ApiError, ErrorDetail};
pub use resources::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
