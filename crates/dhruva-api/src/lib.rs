//! Dhruva API /v1: JSON endpoints over the grievance orchestrator
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ConfigError};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/grievances", post(handlers::submit))
        .route("/v1/reset", post(handlers::reset))
        .route("/v1/cases", get(handlers::cases))
        .route("/v1/cases/accept", post(handlers::accept))
        .route("/v1/cases/reassign", post(handlers::reassign))
        .route("/v1/cases/:id", get(handlers::get_case))
        .route("/v1/cases/:id/resolve", post(handlers::resolve_case))
        .route("/v1/cases/:id/status", post(handlers::set_case_status))
        .route("/v1/clarification", post(handlers::answer_clarification))
        .route("/v1/clarification/skip", post(handlers::skip_clarification))
        .route("/v1/pipeline/steps", get(handlers::steps))
        .route("/v1/pipeline/result", get(handlers::result))
        .route("/v1/audit", get(handlers::audit))
        .route("/v1/audit/export", get(handlers::audit_export))
        .route("/v1/backend", get(handlers::backend))
        .route("/v1/backend/override", post(handlers::override_backend))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_id))
                .layer(middleware::cors()),
        )
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Dhruva API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
