//! Seams the orchestrator talks to, so runs can be driven without a network.
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::wire::{AnalyzeRequest, AnalyzeResponse};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy(String),
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

/// Liveness check against one base URL. Never fails; any problem is an
/// `Unhealthy` outcome.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, base_url: &str, timeout: Duration) -> ProbeOutcome;
}

/// Full remote analysis of one grievance.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        base_url: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, ClientError>;
}

#[async_trait]
impl HealthProbe for ApiClient {
    async fn probe(&self, base_url: &str, timeout: Duration) -> ProbeOutcome {
        match self.health(base_url, timeout).await {
            Ok(health) if health.is_serving() => ProbeOutcome::Healthy,
            Ok(health) => ProbeOutcome::Unhealthy(format!("status {}", health.status)),
            Err(e) => ProbeOutcome::Unhealthy(e.to_string()),
        }
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn analyze(
        &self,
        base_url: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, ClientError> {
        ApiClient::analyze(self, base_url, request).await
    }
}
