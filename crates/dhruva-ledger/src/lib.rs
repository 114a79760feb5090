//! Dhruva Ledger: audit trail, case queue and session state.
//!
//! One [`Ledger`] value owns all cross-role state. The orchestrator keeps it
//! behind a mutex and is its only writer.

pub mod audit;
pub mod queue;
pub mod session;
pub mod store;

pub use audit::{AuditAction, AuditActor, AuditEntry, AuditLog, AuditStats};
pub use queue::CaseQueue;
pub use session::{Session, WorkflowPhase};
pub use store::{CommitOutcome, Ledger};
