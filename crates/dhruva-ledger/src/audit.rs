//! Audit trail
//!
//! Every submission, analysis, routing decision and reviewer action is
//! appended here. Entries are never removed during a run; only an explicit
//! reset clears the trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who triggered an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuditActor {
    Citizen,
    System,
    Officer,
    #[serde(rename = "AI")]
    Ai,
}

impl std::fmt::Display for AuditActor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AuditActor::Citizen => write!(f, "Citizen"),
            AuditActor::System => write!(f, "System"),
            AuditActor::Officer => write!(f, "Officer"),
            AuditActor::Ai => write!(f, "AI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Submitted,
    AiAnalyzed,
    AutoRouted,
    Accepted,
    Reassigned,
    Resolved,
    Clarified,
    SkippedClarification,
    StatusChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Submitted => "SUBMITTED",
            AuditAction::AiAnalyzed => "AI_ANALYZED",
            AuditAction::AutoRouted => "AUTO_ROUTED",
            AuditAction::Accepted => "ACCEPTED",
            AuditAction::Reassigned => "REASSIGNED",
            AuditAction::Resolved => "RESOLVED",
            AuditAction::Clarified => "CLARIFIED",
            AuditAction::SkippedClarification => "SKIPPED_CLARIFICATION",
            AuditAction::StatusChanged => "STATUS_CHANGED",
        }
    }
}

/// An audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub case_id: String,
    pub action: AuditAction,
    pub actor: AuditActor,
    pub details: String,

    /// Run that produced this entry, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(
        case_id: impl Into<String>,
        action: AuditAction,
        actor: AuditActor,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_audit_id(),
            timestamp: Utc::now(),
            case_id: case_id.into(),
            action,
            actor,
            details: details.into(),
            run_id: None,
            context: None,
        }
    }

    pub fn with_run(mut self, run_id: u64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Audit log collector, oldest entry first.
///
/// Append-only: entries leave the log only through [`AuditLog::clear`].
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn log(&mut self, entry: AuditEntry) {
        tracing::debug!(
            case_id = %entry.case_id,
            action = entry.action.as_str(),
            actor = %entry.actor,
            "audit"
        );
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for_case(&self, case_id: &str) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.case_id == case_id).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Export to JSON Lines
    pub fn to_jsonl(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stats(&self) -> AuditStats {
        let mut by_action = BTreeMap::new();
        let mut by_actor = BTreeMap::new();
        for entry in &self.entries {
            *by_action.entry(entry.action).or_insert(0) += 1;
            *by_actor.entry(entry.actor).or_insert(0) += 1;
        }
        let reassigned = by_action.get(&AuditAction::Reassigned).copied().unwrap_or(0);
        let routed = reassigned + by_action.get(&AuditAction::Accepted).copied().unwrap_or(0);

        AuditStats {
            total: self.entries.len(),
            by_action,
            by_actor,
            override_rate: if routed > 0 {
                reassigned as f64 / routed as f64
            } else {
                0.0
            },
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about audit entries
#[derive(Debug, Clone, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub by_action: BTreeMap<AuditAction, usize>,
    pub by_actor: BTreeMap<AuditActor, usize>,
    /// Share of reviewer decisions that overrode the AI routing
    pub override_rate: f64,
}

fn generate_audit_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("aud_{:x}_{:04x}", millis, counter % 0xFFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: AuditAction, actor: AuditActor) -> AuditEntry {
        AuditEntry::new("PGRS-20251126-AB12", action, actor, "details")
    }

    #[test]
    fn test_audit_log() {
        let mut log = AuditLog::new();
        log.log(entry(AuditAction::Submitted, AuditActor::Citizen));
        log.log(entry(AuditAction::AiAnalyzed, AuditActor::Ai));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].action, AuditAction::Submitted);
        assert_ne!(log.entries()[0].id, log.entries()[1].id);
        assert_eq!(log.entries_for_case("PGRS-20251126-AB12").len(), 2);
        assert!(log.entries_for_case("PGRS-20251126-ZZZZ").is_empty());
    }

    #[test]
    fn test_audit_entry_builder() {
        let e = entry(AuditAction::Accepted, AuditActor::Officer)
            .with_run(7)
            .with_context(serde_json::json!({ "feedback": "ok" }));
        assert_eq!(e.run_id, Some(7));
        assert!(e.context.is_some());
    }

    #[test]
    fn test_audit_serialization() {
        let e = entry(AuditAction::SkippedClarification, AuditActor::Ai);
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["action"], "SKIPPED_CLARIFICATION");
        assert_eq!(value["actor"], "AI");
        assert!(value.get("run_id").is_none());
    }

    #[test]
    fn test_audit_stats() {
        let mut log = AuditLog::new();
        log.log(entry(AuditAction::Accepted, AuditActor::Officer));
        log.log(entry(AuditAction::Reassigned, AuditActor::Officer));
        log.log(entry(AuditAction::Reassigned, AuditActor::Officer));
        log.log(entry(AuditAction::Submitted, AuditActor::Citizen));

        let stats = log.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_actor[&AuditActor::Officer], 3);
        assert!((stats.override_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_audit_log_keeps_every_entry() {
        let mut log = AuditLog::new();
        log.log(AuditEntry::new(
            "PGRS-20251126-FRST",
            AuditAction::Submitted,
            AuditActor::Citizen,
            "first",
        ));
        for _ in 0..12_000 {
            log.log(entry(AuditAction::StatusChanged, AuditActor::Officer));
        }

        assert_eq!(log.len(), 12_001);
        assert_eq!(log.entries()[0].case_id, "PGRS-20251126-FRST");
        assert_eq!(log.entries_for_case("PGRS-20251126-FRST").len(), 1);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_audit_jsonl_export() {
        let mut log = AuditLog::new();
        log.log(entry(AuditAction::Submitted, AuditActor::Citizen));
        log.log(entry(AuditAction::AutoRouted, AuditActor::System));

        let jsonl = log.to_jsonl();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["action"], "AUTO_ROUTED");
    }
}
