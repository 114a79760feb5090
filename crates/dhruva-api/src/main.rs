//! Binary entrypoint for the Dhruva API server.
use anyhow::Context;
use dhruva_api::{run, AppState, ServerConfig};
use dhruva_client::{ApiClient, EndpointResolver};
use dhruva_core::InstantPacer;
use dhruva_orchestrator::Orchestrator;
use dhruva_stages::{KeywordTables, Simulator};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let candidates = config.endpoints.candidates();
    tracing::info!(
        production = config.production,
        candidates = ?candidates,
        "starting dhruva"
    );

    let client = Arc::new(ApiClient::new()?);
    let resolver = Arc::new(EndpointResolver::new(candidates, client.clone())?);

    let tables = match &config.tables_path {
        Some(path) => KeywordTables::load(path).with_context(|| format!("loading {}", path))?,
        None => KeywordTables::builtin()?.clone(),
    };
    let simulator = Arc::new(Simulator::new(tables)?);

    let mut orchestrator = Orchestrator::new(resolver.clone(), client, simulator)
        .with_default_location(config.default_location.clone());
    if !config.pacing {
        orchestrator = orchestrator.with_pacer(Arc::new(InstantPacer));
    }
    if let Some(seed) = config.seed {
        orchestrator = orchestrator.with_seed(seed);
    }

    let refresh = resolver.spawn_refresh(Duration::from_secs(config.refresh_secs));
    let state = AppState::new(Arc::new(orchestrator))?;

    let served = run(&config.addr, state).await;
    refresh.abort();
    served.with_context(|| format!("serving on {}", config.addr))
}
