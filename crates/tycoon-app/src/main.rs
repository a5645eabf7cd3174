//! `tycoon` binary: a single-player earning game served over HTTP.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (path from the first argument, `TYCOON_CONFIG`,
//!    or `tycoon-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the LLM content provider
//! 4. Create the game session and start the energy ticker
//! 5. Fetch the first task batch in the background
//! 6. Serve the API until Ctrl-C

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tycoon_core::{GameSession, TycoonConfig, spawn_energy_regen};
use tycoon_provider::LlmContentProvider;
use tycoon_server::{AppState, start_server};

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "tycoon-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Config first: it carries the fallback log level.
    let config_path = config_path();
    let config = TycoonConfig::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        backend = %config.llm.backend,
        model = %config.llm.model,
        bind = %config.bind_addr(),
        "configuration loaded"
    );
    if config.llm.api_key.is_empty() {
        warn!("no LLM API key configured; task batches will be empty");
    }

    let provider = LlmContentProvider::new(&config.provider_settings()?)?;
    let session = GameSession::new(provider, config.session_settings());
    let stats = session.stats().await;
    info!(referral_code = %stats.referral_code, "session created");

    let regen = spawn_energy_regen(session.clone(), config.energy_regen_interval());

    let initial = session.clone();
    tokio::spawn(async move {
        if let Err(e) = initial.fetch_tasks().await {
            warn!(error = %e, "initial task fetch refused");
        }
    });

    let state = Arc::new(AppState::new(session));
    let result = start_server(&config.server, state, shutdown_signal()).await;

    regen.abort();
    result?;
    info!("tycoon stopped");
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TYCOON_CONFIG").ok())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
