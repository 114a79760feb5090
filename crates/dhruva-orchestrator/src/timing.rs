//! Pacing between steps and the durations reported on the board.
use dhruva_core::StageId;
use std::time::Duration;

/// Simulation pause before each stage computes, by stage index
const SIMULATION_PACING_MS: [u64; 9] = [300, 600, 400, 200, 500, 400, 200, 150, 100];

/// Duration in seconds reported for each completed stage
const REPORTED_SECS: [f64; 9] = [0.12, 0.45, 0.28, 0.08, 0.38, 0.32, 0.15, 0.05, 0.03];

/// Remote path: stages animated while the analyze call is in flight
pub const REMOTE_LEAD_IN: [(StageId, u64); 3] = [
    (StageId::Duplicate, 200),
    (StageId::Classify, 300),
    (StageId::Sentiment, 200),
];

/// Remote path: pause before the lapse and similar-case stages complete
pub const REMOTE_TAIL_PAUSE: Duration = Duration::from_millis(100);

pub fn simulation_pause(stage: StageId) -> Duration {
    Duration::from_millis(SIMULATION_PACING_MS[stage.index()])
}

pub fn reported_secs(stage: StageId) -> f64 {
    REPORTED_SECS[stage.index()]
}
