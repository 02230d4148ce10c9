//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `TokenStore`: durable storage for the access/refresh token pair
//! - `Session`: the signed-in user derived from the stored access token
//! - `AuthSession`: login, registration, logout and startup restoration
//! - `LoginRedirect`: the hook fired when a session cannot be recovered
//!
//! Token expiry is never tracked locally; it is discovered when the
//! server rejects a request, at which point the API client refreshes.

pub mod context;
pub mod error;
pub mod redirect;
pub mod session;
pub mod token_store;

pub use context::AuthSession;
pub use error::AuthenticationError;
pub use redirect::{ChannelRedirect, LoginRedirect, LogoutReason, NoopRedirect, SessionEvent};
pub use session::{Session, SessionState};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenKey, TokenStore};
