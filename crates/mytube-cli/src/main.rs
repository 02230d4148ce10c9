//! mytube - command line client for the mytube video platform.
//!
//! Signs in against the REST backend, keeps the token pair between runs,
//! and exposes the feed, search, profile and upload endpoints.

mod cli;
mod commands;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mytube_core::api::ApiClient;
use mytube_core::auth::{AuthSession, ChannelRedirect, SessionEvent};
use mytube_core::config::Config;

use cli::Cli;

/// Directory for the optional rolling log file
const ENV_LOG_DIR: &str = "MYTUBE_LOG_DIR";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must live until exit so buffered file logs are flushed.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(ENV_LOG_DIR) {
        Ok(dir) if !dir.is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "mytube.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_guard = init_tracing();
    info!("mytube starting");

    let mut config = Config::load()?;
    if let Some(ref url) = cli.api_url {
        config.api_url = Some(url.clone());
    }
    if let Some(backend) = cli.token_backend {
        config.token_backend = backend;
    }

    let redirect = ChannelRedirect::new(config.login_path());
    let mut session_events = redirect.subscribe();
    let api = ApiClient::from_config(&config, config.token_store()?, Arc::new(redirect))?;
    let auth = AuthSession::new(api);

    let result = commands::run(cli.command, &auth, &config).await;

    if let Ok(SessionEvent::LoginRequired { login_path, reason }) = session_events.try_recv() {
        info!(%reason, %login_path, "Session ended");
        eprintln!("Session expired ({}). Please log in again with `mytube login`.", reason);
    }

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        // exit() skips destructors; flush file logs first
        drop(log_guard);
        std::process::exit(1);
    }

    info!("mytube shutting down");
    drop(log_guard);
    Ok(())
}
