//! State of the active submission.
use dhruva_core::PipelineResult;
use dhruva_stages::ClarifyingQuestion;
use serde::Serialize;

/// Where the active submission is in the review workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    /// Submitting, or waiting for a clarification answer
    Submit,
    /// Routed; waiting for an officer decision
    Review,
    Done,
}

impl WorkflowPhase {
    /// Step number shown in progress indicators.
    pub fn step_number(&self) -> u8 {
        match self {
            WorkflowPhase::Submit => 1,
            WorkflowPhase::Review => 2,
            WorkflowPhase::Done => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub result: Option<PipelineResult>,
    pub needs_clarification: bool,
    pub clarification_answered: bool,
    pub questions: Vec<ClarifyingQuestion>,
    pub phase: WorkflowPhase,
}

impl Session {
    pub fn new() -> Self {
        Self {
            result: None,
            needs_clarification: false,
            clarification_answered: false,
            questions: Vec::new(),
            phase: WorkflowPhase::Submit,
        }
    }

    pub fn case_id(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.case_id.as_str())
    }

    /// Clarification asked for and not yet answered or skipped.
    pub fn clarification_pending(&self) -> bool {
        self.needs_clarification && !self.clarification_answered
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
