//! Dhruva Core: data model, step board and run context
//!
//! Shared vocabulary for the grievance pipeline. Both execution strategies
//! (remote backend and local simulation) write into the same [`StepBoard`]
//! and produce the same [`PipelineResult`].

pub mod case_id;
pub mod context;
pub mod data_model;
pub mod error;
pub mod pacing;
pub mod stage;

pub use case_id::{generate_case_id, is_valid_case_id};
pub use context::{validate_text, RunContext};
pub use data_model::{
    CaseRecord, CaseStatus, Classification, ClassificationMethod, DepartmentScore, DistressLevel,
    DuplicateCheck, LapseLevel, LapseRisk, PipelineResult, ProactiveAlert, RecommendedAction,
    ResponseTemplate, ResultSource, Sentiment, SimilarCase, Sla, CLARIFICATION_THRESHOLD,
};
pub use error::DhruvaError;
pub use pacing::{InstantPacer, Pacer, TokioPacer};
pub use stage::{BoardSnapshot, PipelineStep, StageId, StepBoard, StepOutcome, StepStatus};

/// Engine version reported by the health endpoint
pub const DHRUVA_VERSION: &str = "1.0.0";
