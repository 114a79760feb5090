//! Ledger: the single-writer store behind the orchestrator.
//!
//! Holds the audit trail, the case queue and the active session. Every
//! run-scoped write carries a run id; writes for a run that is no longer
//! current are dropped, so a reset during an in-flight run wins.

use crate::audit::{AuditAction, AuditActor, AuditEntry, AuditLog};
use crate::queue::CaseQueue;
use crate::session::{Session, WorkflowPhase};
use dhruva_core::{CaseRecord, CaseStatus, DhruvaError, PipelineResult, RunContext};
use dhruva_stages::ClarifyingQuestion;

/// What a commit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Confidence below threshold; waiting for the citizen
    AwaitingClarification,
    AutoRouted,
    /// Run was superseded by a reset or newer run
    Stale,
}

pub struct Ledger {
    current_run: u64,
    audit: AuditLog,
    queue: CaseQueue,
    session: Session,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_queue(CaseQueue::new())
    }

    pub fn with_queue(queue: CaseQueue) -> Self {
        Self {
            current_run: 0,
            audit: AuditLog::new(),
            queue,
            session: Session::new(),
        }
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn queue(&self) -> &CaseQueue {
        &self.queue
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_run(&self) -> u64 {
        self.current_run
    }

    /// Start tracking a new run. The previous result is superseded.
    pub fn begin_run(&mut self, run_id: u64) {
        self.current_run = run_id;
        self.session = Session::new();
    }

    /// Clear the session and the audit trail. The queue is kept.
    pub fn reset(&mut self, run_id: u64) {
        self.current_run = run_id;
        self.session = Session::new();
        self.audit.clear();
    }

    /// Append a run-scoped audit entry. Returns false for a stale run.
    pub fn record(&mut self, run_id: u64, entry: AuditEntry) -> bool {
        if run_id != self.current_run {
            tracing::debug!(run_id, current = self.current_run, "stale audit entry dropped");
            return false;
        }
        self.audit.log(entry.with_run(run_id));
        true
    }

    /// Store a finished run: session result, queue entry, and either
    /// clarification or auto-routing.
    pub fn commit(
        &mut self,
        ctx: &RunContext,
        result: PipelineResult,
        questions: Vec<ClarifyingQuestion>,
    ) -> CommitOutcome {
        if ctx.run_id != self.current_run {
            tracing::info!(
                run_id = ctx.run_id,
                current = self.current_run,
                case_id = %result.case_id,
                "stale run result not committed"
            );
            return CommitOutcome::Stale;
        }

        self.queue.push_front(CaseRecord::from_result(ctx, &result));

        let outcome = if result.needs_clarification() {
            self.session.needs_clarification = true;
            self.session.questions = questions;
            self.session.phase = WorkflowPhase::Submit;
            CommitOutcome::AwaitingClarification
        } else {
            self.audit.log(
                AuditEntry::new(
                    &result.case_id,
                    AuditAction::AutoRouted,
                    AuditActor::System,
                    format!(
                        "Auto-routed to {} ({:.1}% confidence)",
                        result.classification.department,
                        result.classification.confidence * 100.0
                    ),
                )
                .with_run(ctx.run_id),
            );
            self.session.phase = WorkflowPhase::Review;
            CommitOutcome::AutoRouted
        };

        self.session.result = Some(result);
        outcome
    }

    /// Officer accepts the AI routing.
    pub fn accept(&mut self, feedback: Option<&str>) -> Result<(), DhruvaError> {
        let result = self.active_result()?;
        if self.session.clarification_pending() {
            return Err(DhruvaError::ClarificationPending(result.case_id.clone()));
        }

        let mut details = format!("Accepted AI routing to {}", result.classification.department);
        if let Some(feedback) = feedback.filter(|f| !f.trim().is_empty()) {
            details.push_str(&format!(". Feedback: {}", feedback));
        }
        let entry = AuditEntry::new(&result.case_id, AuditAction::Accepted, AuditActor::Officer, details);
        self.audit.log(entry);
        self.session.phase = WorkflowPhase::Done;
        Ok(())
    }

    /// Officer overrides the AI routing. Returns the previous department.
    pub fn reassign(&mut self, department: &str, feedback: Option<&str>) -> Result<String, DhruvaError> {
        let case_id = self.active_result()?.case_id.clone();
        let previous = self.move_department(department)?;

        let feedback = feedback.filter(|f| !f.trim().is_empty()).unwrap_or("None");
        self.audit.log(AuditEntry::new(
            &case_id,
            AuditAction::Reassigned,
            AuditActor::Officer,
            format!("Reassigned from {} to {}. Feedback: {}", previous, department, feedback),
        ));
        self.session.phase = WorkflowPhase::Done;
        Ok(previous)
    }

    /// Citizen picked an option for a clarifying question.
    pub fn answer_clarification(&mut self, question: &str, department: &str) -> Result<(), DhruvaError> {
        let result = self.active_result()?;
        if !self.session.clarification_pending() {
            return Err(DhruvaError::NoPendingClarification);
        }
        let case_id = result.case_id.clone();
        if result.classification.department != department {
            self.move_department(department)?;
        }

        self.audit.log(AuditEntry::new(
            &case_id,
            AuditAction::Clarified,
            AuditActor::Citizen,
            format!("Answered: \"{}\" - Routed to {}", question, department),
        ));
        self.session.clarification_answered = true;
        self.session.phase = WorkflowPhase::Review;
        Ok(())
    }

    /// Citizen declined to clarify; the AI department stands.
    pub fn skip_clarification(&mut self) -> Result<(), DhruvaError> {
        let result = self.active_result()?;
        if !self.session.clarification_pending() {
            return Err(DhruvaError::NoPendingClarification);
        }
        let entry = AuditEntry::new(
            &result.case_id,
            AuditAction::SkippedClarification,
            AuditActor::Citizen,
            format!(
                "Clarification skipped - routed to {}",
                result.classification.department
            ),
        );
        self.audit.log(entry);
        self.session.clarification_answered = true;
        self.session.phase = WorkflowPhase::Review;
        Ok(())
    }

    /// Officer resolves a queued case.
    pub fn resolve_case(&mut self, case_id: &str, resolution: &str) -> Result<(), DhruvaError> {
        self.queue.set_status(case_id, CaseStatus::Resolved)?;
        self.audit.log(AuditEntry::new(
            case_id,
            AuditAction::Resolved,
            AuditActor::Officer,
            format!("Case resolved: {}", resolution),
        ));
        if self.session.case_id() == Some(case_id) {
            self.session.phase = WorkflowPhase::Done;
        }
        Ok(())
    }

    /// Any other validated status change.
    pub fn set_case_status(&mut self, case_id: &str, status: CaseStatus) -> Result<CaseStatus, DhruvaError> {
        let previous = self.queue.set_status(case_id, status)?;
        self.audit.log(AuditEntry::new(
            case_id,
            AuditAction::StatusChanged,
            AuditActor::Officer,
            format!("Status changed from {} to {}", previous, status),
        ));
        Ok(previous)
    }

    fn active_result(&self) -> Result<&PipelineResult, DhruvaError> {
        self.session.result.as_ref().ok_or(DhruvaError::NoActiveResult)
    }

    fn move_department(&mut self, department: &str) -> Result<String, DhruvaError> {
        let result = self.session.result.as_mut().ok_or(DhruvaError::NoActiveResult)?;
        let previous = result.reassign_department(department);
        let case_id = result.case_id.clone();
        // The queue copy is missing only if the case was never committed
        if let Err(e) = self.queue.reassign(&case_id, department) {
            tracing::warn!(error = %e, case_id = %case_id, "queue record not updated");
        }
        Ok(previous)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
