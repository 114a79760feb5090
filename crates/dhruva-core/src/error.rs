//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DhruvaError {
    #[error("INPUT/{0}")]
    InvalidInput(String),

    #[error("STATE/no active pipeline result")]
    NoActiveResult,

    #[error("STATE/clarification pending for case {0}")]
    ClarificationPending(String),

    #[error("STATE/no clarification pending")]
    NoPendingClarification,

    #[error("STATE/unknown case {0}")]
    UnknownCase(String),

    #[error("STATE/case {case_id} cannot move from {from} to {to}")]
    InvalidTransition {
        case_id: String,
        from: String,
        to: String,
    },

    #[error("TABLES/{0}")]
    TablesError(String),

    #[error("TEMPLATE/{0}")]
    TemplateError(String),
}
