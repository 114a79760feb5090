//! Case queue shared by all roles.
//!
//! The officer queue and the citizen's submitted list hold the same
//! records, newest first. Reviewer status changes are applied to both.

use dhruva_core::{CaseRecord, CaseStatus, DhruvaError};

#[derive(Debug, Default)]
pub struct CaseQueue {
    queue: Vec<CaseRecord>,
    submitted: Vec<CaseRecord>,
}

impl CaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue pre-filled with existing cases (not part of the submitted list).
    pub fn with_cases(cases: Vec<CaseRecord>) -> Self {
        Self {
            queue: cases,
            submitted: Vec::new(),
        }
    }

    /// Prepend a freshly analyzed case to both lists.
    pub fn push_front(&mut self, record: CaseRecord) {
        self.submitted.insert(0, record.clone());
        self.queue.insert(0, record);
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.queue
    }

    pub fn submitted(&self) -> &[CaseRecord] {
        &self.submitted
    }

    pub fn get(&self, case_id: &str) -> Option<&CaseRecord> {
        self.queue
            .iter()
            .chain(self.submitted.iter())
            .find(|c| c.id == case_id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// `(case id, text)` pairs for duplicate detection.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.queue.iter().map(|c| (c.id.as_str(), c.text.as_str()))
    }

    /// Validated status transition. Returns the previous status.
    pub fn set_status(&mut self, case_id: &str, next: CaseStatus) -> Result<CaseStatus, DhruvaError> {
        let current = self
            .get(case_id)
            .map(|c| c.status)
            .ok_or_else(|| DhruvaError::UnknownCase(case_id.to_string()))?;

        if !current.can_transition_to(next) {
            return Err(DhruvaError::InvalidTransition {
                case_id: case_id.to_string(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        self.for_each_copy(case_id, |c| c.status = next);
        Ok(current)
    }

    /// Move a case to another department. Returns the previous department.
    pub fn reassign(&mut self, case_id: &str, department: &str) -> Result<String, DhruvaError> {
        let previous = self
            .get(case_id)
            .map(|c| c.department.clone())
            .ok_or_else(|| DhruvaError::UnknownCase(case_id.to_string()))?;

        self.for_each_copy(case_id, |c| {
            c.department = department.to_string();
            if let Some(result) = c.pipeline_result.as_mut() {
                result.reassign_department(department);
            }
        });
        Ok(previous)
    }

    fn for_each_copy(&mut self, case_id: &str, mut f: impl FnMut(&mut CaseRecord)) {
        self.queue
            .iter_mut()
            .chain(self.submitted.iter_mut())
            .filter(|c| c.id == case_id)
            .for_each(|c| f(c));
    }
}
