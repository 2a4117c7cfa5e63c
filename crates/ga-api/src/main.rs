//! Binary entrypoint for the GA API server.
use std::sync::Arc;

use anyhow::Context;
use ga_api::{run, AppConfig, AppState};
use ga_core::FetchResult;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = Arc::new(AppState::from_config(&config).context("building server state")?);

    if let Some((property_id, credentials)) = config.startup_session() {
        match state.open_session(property_id, credentials).await {
            FetchResult::Success(summary) => tracing::info!(email = %summary.client_email, "{}", summary.message),
            FetchResult::Failure(failure) => {
                tracing::warn!(error = %failure.error, "startup session not opened; use the authenticate tool")
            }
        }
    }

    run(&config.listen_addr, state)
        .await
        .with_context(|| format!("serving on {}", config.listen_addr))
}
