use crate::metrics::Metrics;
use dhruva_orchestrator::Orchestrator;
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            orchestrator,
            metrics: Arc::new(Metrics::new()?),
        })
    }
}
