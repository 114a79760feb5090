//! Reviewer operations and read access to the ledger.
use crate::runner::Orchestrator;
use dhruva_client::BackendSnapshot;
use dhruva_core::{CaseRecord, CaseStatus, DhruvaError, PipelineResult};
use dhruva_ledger::{AuditEntry, AuditStats, Session};

impl Orchestrator {
    /// Officer accepts the AI routing of the active case.
    pub fn accept(&self, feedback: Option<&str>) -> Result<(), DhruvaError> {
        self.ledger().accept(feedback)
    }

    /// Officer moves the active case to another department.
    pub fn reassign(&self, department: &str, feedback: Option<&str>) -> Result<String, DhruvaError> {
        self.check_department(department)?;
        let previous = self.ledger().reassign(department, feedback)?;
        tracing::info!(from = %previous, to = %department, "case reassigned");
        Ok(previous)
    }

    pub fn answer_clarification(&self, question: &str, department: &str) -> Result<(), DhruvaError> {
        self.check_department(department)?;
        self.ledger().answer_clarification(question, department)
    }

    pub fn skip_clarification(&self) -> Result<(), DhruvaError> {
        self.ledger().skip_clarification()
    }

    pub fn resolve_case(&self, case_id: &str, resolution: &str) -> Result<(), DhruvaError> {
        self.ledger().resolve_case(case_id, resolution)
    }

    pub fn set_case_status(&self, case_id: &str, status: CaseStatus) -> Result<CaseStatus, DhruvaError> {
        self.ledger().set_case_status(case_id, status)
    }

    pub fn result(&self) -> Option<PipelineResult> {
        self.ledger().session().result.clone()
    }

    pub fn session(&self) -> Session {
        self.ledger().session().clone()
    }

    pub fn cases(&self) -> Vec<CaseRecord> {
        self.ledger().queue().cases().to_vec()
    }

    pub fn submitted(&self) -> Vec<CaseRecord> {
        self.ledger().queue().submitted().to_vec()
    }

    pub fn case(&self, case_id: &str) -> Option<CaseRecord> {
        self.ledger().queue().get(case_id).cloned()
    }

    pub fn audit(&self) -> Vec<AuditEntry> {
        self.ledger().audit().entries().to_vec()
    }

    /// Audit entries for one case, oldest first.
    pub fn audit_for_case(&self, case_id: &str) -> Vec<AuditEntry> {
        self.ledger()
            .audit()
            .entries_for_case(case_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The whole trail as JSON Lines.
    pub fn audit_jsonl(&self) -> String {
        self.ledger().audit().to_jsonl()
    }

    pub fn audit_stats(&self) -> AuditStats {
        self.ledger().audit().stats()
    }

    pub fn backend_status(&self) -> BackendSnapshot {
        self.resolver().status().snapshot()
    }

    /// Known departments, plus whatever the active result already names:
    /// its current department, its top-3 and its clarification options.
    /// A remote result may carry departments the local tables lack.
    fn check_department(&self, department: &str) -> Result<(), DhruvaError> {
        if self.simulator.is_known_department(department) {
            return Ok(());
        }
        let ledger = self.ledger();
        let session = ledger.session();
        let in_result = session.result.as_ref().is_some_and(|r| {
            r.classification.department == department
                || r.classification.top3.iter().any(|d| d.department == department)
        });
        let in_questions = session
            .questions
            .iter()
            .flat_map(|q| q.options.iter())
            .any(|o| o.target_department == department);
        if in_result || in_questions {
            Ok(())
        } else {
            Err(DhruvaError::InvalidInput(format!("unknown department '{}'", department)))
        }
    }
}
