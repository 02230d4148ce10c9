//! Client library for the mytube video platform.
//!
//! The center of the crate is session handling: [`auth::AuthSession`] keeps
//! the signed-in user, and [`api::ApiClient`] attaches the access token to
//! every call and silently renews it with the refresh token when the server
//! rejects it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mytube_core::{auth::{AuthSession, ChannelRedirect}, api::ApiClient, config::Config};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let redirect = ChannelRedirect::new(config.login_path());
//! let api = ApiClient::from_config(&config, config.token_store()?, Arc::new(redirect))?;
//! let auth = AuthSession::new(api);
//! auth.restore_session().await;
//! if auth.is_authenticated() {
//!     let feed = auth.api().trending().await?;
//!     println!("{} trending videos", feed.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;
