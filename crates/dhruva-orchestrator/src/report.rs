//! What a run reports back to its caller.
use dhruva_core::PipelineResult;
use dhruva_stages::ClarifyingQuestion;
use serde::Serialize;

/// Execution strategy that produced the result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Remote { url: String },
    Simulation,
    /// The remote path failed part-way and the simulation finished the run
    Fallback { url: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: u64,
    pub result: PipelineResult,
    pub strategy: Strategy,
    pub needs_clarification: bool,
    pub questions: Vec<ClarifyingQuestion>,
    /// False when a reset or newer run superseded this one before commit
    pub committed: bool,
}

impl RunReport {
    pub fn fell_back(&self) -> bool {
        matches!(self.strategy, Strategy::Fallback { .. })
    }
}
