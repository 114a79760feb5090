//! Pipeline steps and the shared step board observers watch.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

/// The nine stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Duplicate,
    Classify,
    Sentiment,
    Sla,
    Lapse,
    Similar,
    Alerts,
    Template,
    Actions,
}

impl StageId {
    pub const ALL: [StageId; 9] = [
        StageId::Duplicate,
        StageId::Classify,
        StageId::Sentiment,
        StageId::Sla,
        StageId::Lapse,
        StageId::Similar,
        StageId::Alerts,
        StageId::Template,
        StageId::Actions,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn id(&self) -> &'static str {
        match self {
            StageId::Duplicate => "duplicate",
            StageId::Classify => "classify",
            StageId::Sentiment => "sentiment",
            StageId::Sla => "sla",
            StageId::Lapse => "lapse",
            StageId::Similar => "similar",
            StageId::Alerts => "alerts",
            StageId::Template => "template",
            StageId::Actions => "actions",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StageId::Duplicate => "Duplicate Detection",
            StageId::Classify => "Department Classification",
            StageId::Sentiment => "Distress Detection",
            StageId::Sla => "SLA Calculation",
            StageId::Lapse => "Lapse Risk Prediction",
            StageId::Similar => "Similar Case Matching",
            StageId::Alerts => "Proactive Alerts",
            StageId::Template => "Response Template",
            StageId::Actions => "Recommended Actions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: String,
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl PipelineStep {
    pub fn pending(stage: StageId) -> Self {
        Self {
            id: stage.id().to_string(),
            name: stage.display_name().to_string(),
            status: StepStatus::Pending,
            duration: None,
            result: None,
            confidence: None,
        }
    }
}

/// Nine fresh `pending` steps.
pub fn initial_steps() -> Vec<PipelineStep> {
    StageId::ALL.iter().map(|s| PipelineStep::pending(*s)).collect()
}

/// What a finished step reports
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub duration: Option<f64>,
    pub result: Option<Value>,
    pub confidence: Option<f64>,
}

impl StepOutcome {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

/// Snapshot published to observers after every change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub run_id: u64,
    pub steps: Vec<PipelineStep>,
}

impl BoardSnapshot {
    /// Every step is `completed` or `skipped`.
    pub fn is_settled(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_terminal())
    }
}

/// Shared step buffer for the current run.
///
/// Every mutation carries the run id it belongs to; updates for a run that
/// is no longer current (a reset or newer run happened) are dropped.
/// Status moves forward only, and a step cannot finish while a lower-indexed
/// step is still `pending`.
pub struct StepBoard {
    tx: watch::Sender<BoardSnapshot>,
}

impl StepBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BoardSnapshot {
            run_id: 0,
            steps: initial_steps(),
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.tx.borrow().clone()
    }

    pub fn current_run(&self) -> u64 {
        self.tx.borrow().run_id
    }

    pub fn is_current(&self, run_id: u64) -> bool {
        self.current_run() == run_id
    }

    /// Install fresh steps for a new run and return its id.
    pub fn begin_run(&self) -> u64 {
        let mut run_id = 0;
        self.tx.send_modify(|snap| {
            snap.run_id += 1;
            snap.steps = initial_steps();
            run_id = snap.run_id;
        });
        run_id
    }

    /// Discard all step state. Any in-flight run becomes stale.
    pub fn reset(&self) -> u64 {
        self.begin_run()
    }

    /// `pending → processing`
    pub fn start(&self, run_id: u64, stage: StageId) -> bool {
        self.apply(run_id, stage, |steps, idx| {
            let step = &mut steps[idx];
            if step.status != StepStatus::Pending {
                return false;
            }
            step.status = StepStatus::Processing;
            true
        })
    }

    /// `pending|processing → completed`. A step that is already completed
    /// keeps its status and only receives fields it does not have yet.
    pub fn complete(&self, run_id: u64, stage: StageId, outcome: StepOutcome) -> bool {
        self.apply(run_id, stage, |steps, idx| {
            if !lower_steps_started(steps, idx) {
                tracing::warn!(stage = stage.id(), "completion before earlier steps started");
                return false;
            }
            let step = &mut steps[idx];
            match step.status {
                StepStatus::Pending | StepStatus::Processing => {
                    step.status = StepStatus::Completed;
                    step.duration = outcome.duration;
                    step.result = outcome.result;
                    step.confidence = outcome.confidence;
                    true
                }
                StepStatus::Completed => {
                    let mut changed = false;
                    if step.duration.is_none() && outcome.duration.is_some() {
                        step.duration = outcome.duration;
                        changed = true;
                    }
                    if step.result.is_none() && outcome.result.is_some() {
                        step.result = outcome.result;
                        changed = true;
                    }
                    if step.confidence.is_none() && outcome.confidence.is_some() {
                        step.confidence = outcome.confidence;
                        changed = true;
                    }
                    changed
                }
                StepStatus::Skipped => false,
            }
        })
    }

    /// `pending|processing → skipped`
    pub fn skip(&self, run_id: u64, stage: StageId, reason: &str) -> bool {
        self.apply(run_id, stage, |steps, idx| {
            if !lower_steps_started(steps, idx) {
                return false;
            }
            let step = &mut steps[idx];
            if step.status.is_terminal() {
                return false;
            }
            step.status = StepStatus::Skipped;
            step.result = Some(serde_json::json!({ "reason": reason }));
            true
        })
    }

    fn apply<F>(&self, run_id: u64, stage: StageId, f: F) -> bool
    where
        F: FnOnce(&mut Vec<PipelineStep>, usize) -> bool,
    {
        self.tx.send_if_modified(|snap| {
            if snap.run_id != run_id {
                tracing::debug!(run_id, current = snap.run_id, stage = stage.id(), "stale step update dropped");
                return false;
            }
            f(&mut snap.steps, stage.index())
        })
    }
}

impl Default for StepBoard {
    fn default() -> Self {
        Self::new()
    }
}

fn lower_steps_started(steps: &[PipelineStep], idx: usize) -> bool {
    steps[..idx].iter().all(|s| s.status != StepStatus::Pending)
}
