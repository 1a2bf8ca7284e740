//! Revenue Guardian - command-line back office for insurance agents.
//!
//! Log in once, then list clients and policies and keep an eye on upcoming
//! renewals. The access token is kept between runs.

mod app;
mod commands;
mod display;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use guardian_core::{ApiClient, Config, SessionManager, SystemClock};

use app::App;
use commands::Command;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });

    let session = Arc::new(SessionManager::open(
        config.token_store()?,
        Arc::new(SystemClock),
    ));
    info!(status = ?session.snapshot().status(), "Session restored");

    let api = ApiClient::with_timeout(&config.api_base_url(), config.request_timeout())?
        .with_session(session.clone());

    let mut app = App::new(config, session, api);
    app.run(command).await
}
