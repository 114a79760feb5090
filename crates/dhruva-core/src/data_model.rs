//! Data Model: PipelineResult, CaseRecord and the enums shared by both
//! execution strategies.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Classification confidence below which a case needs clarification
/// before it is routed.
pub const CLARIFICATION_THRESHOLD: f64 = 0.70;

/// Lapse score above which a supervisor review is recommended.
pub const SUPERVISOR_REVIEW_THRESHOLD: f64 = 0.6;

/// Department used when the backend returns none.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Distress level detected in the grievance text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistressLevel {
    Normal,
    Medium,
    High,
    Critical,
}

impl DistressLevel {
    /// SLA hours for this level. Both execution paths use this mapping.
    pub fn sla_hours(&self) -> u32 {
        match self {
            DistressLevel::Critical => 24,
            DistressLevel::High => 72,
            DistressLevel::Medium => 168,
            DistressLevel::Normal => 336,
        }
    }

    /// Detection confidence reported by the keyword detector.
    pub fn keyword_confidence(&self) -> f64 {
        match self {
            DistressLevel::Critical => 0.98,
            DistressLevel::High => 0.92,
            DistressLevel::Medium => 0.85,
            DistressLevel::Normal => 0.78,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistressLevel::Critical => "CRITICAL",
            DistressLevel::High => "HIGH",
            DistressLevel::Medium => "MEDIUM",
            DistressLevel::Normal => "NORMAL",
        }
    }
}

impl std::fmt::Display for DistressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lapse risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LapseLevel {
    Low,
    Medium,
    High,
}

impl LapseLevel {
    /// Level from a score in 0.0..=1.0
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            LapseLevel::High
        } else if score > 0.4 {
            LapseLevel::Medium
        } else {
            LapseLevel::Low
        }
    }
}

/// How the department was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    Primary,
    Fallback,
    Manual,
}

impl ClassificationMethod {
    /// Method implied by a locally computed confidence.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.75 {
            ClassificationMethod::Primary
        } else if confidence >= 0.4 {
            ClassificationMethod::Fallback
        } else {
            ClassificationMethod::Manual
        }
    }

    /// Method from the backend's classifier tag.
    pub fn from_backend_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("primary_classifier") => ClassificationMethod::Primary,
            Some("fallback_classifier") => ClassificationMethod::Fallback,
            _ => ClassificationMethod::Manual,
        }
    }
}

/// Which execution strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Api,
    Simulation,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Api => "api",
            ResultSource::Simulation => "simulation",
        }
    }
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentScore {
    pub department: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub department: String,
    pub confidence: f64,
    pub method: ClassificationMethod,
    pub top3: Vec<DepartmentScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub distress_level: DistressLevel,
    pub confidence: f64,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sla {
    pub hours: u32,
    pub deadline: DateTime<Utc>,
    pub priority: String,
}

impl Sla {
    /// SLA for a distress level, counted from `from`.
    pub fn for_level(level: DistressLevel, from: DateTime<Utc>) -> Self {
        let hours = level.sla_hours();
        Self {
            hours,
            deadline: from + Duration::hours(i64::from(hours)),
            priority: level.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapseRisk {
    pub score: f64,
    pub level: LapseLevel,
    pub likely_lapses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCase {
    pub id: String,
    pub similarity: f64,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_case_id: Option<String>,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProactiveAlert {
    pub alert_type: String,
    pub location: String,
    pub department: String,
    pub count: u32,
}

/// Citizen-facing acknowledgement in English and Telugu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    pub english: String,
    pub telugu: String,
}

impl Default for ResponseTemplate {
    fn default() -> Self {
        Self {
            english: "Your grievance has been registered. We will respond within the SLA period."
                .to_string(),
            telugu: "మీ ఫిర్యాదు నమోదు చేయబడింది. SLA వ్యవధిలో స్పందిస్తాము.".to_string(),
        }
    }
}

/// Recommended follow-up for a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    ImmediateAttention,
    ManualClassification,
    SupervisorReview,
    SimilarCaseReview,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::ImmediateAttention => "IMMEDIATE_ATTENTION",
            RecommendedAction::ManualClassification => "MANUAL_CLASSIFICATION",
            RecommendedAction::SupervisorReview => "SUPERVISOR_REVIEW",
            RecommendedAction::SimilarCaseReview => "SIMILAR_CASE_REVIEW",
        }
    }

    /// Actions implied by the final values of a run.
    pub fn derive(
        distress: DistressLevel,
        classification_confidence: f64,
        lapse_score: f64,
        similar_cases: usize,
    ) -> Vec<RecommendedAction> {
        let mut actions = Vec::new();
        if distress == DistressLevel::Critical {
            actions.push(RecommendedAction::ImmediateAttention);
        }
        if classification_confidence < CLARIFICATION_THRESHOLD {
            actions.push(RecommendedAction::ManualClassification);
        }
        if lapse_score > SUPERVISOR_REVIEW_THRESHOLD {
            actions.push(RecommendedAction::SupervisorReview);
        }
        if similar_cases > 0 {
            actions.push(RecommendedAction::SimilarCaseReview);
        }
        actions
    }
}

/// Normalized output of one orchestration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub case_id: String,
    pub classification: Classification,
    pub sentiment: Sentiment,
    pub sla: Sla,
    pub lapse_risk: LapseRisk,
    pub duplicate_check: DuplicateCheck,
    pub similar_cases: Vec<SimilarCase>,
    pub proactive_alerts: Vec<ProactiveAlert>,
    pub recommended_actions: Vec<String>,
    pub response_template: ResponseTemplate,
    pub source: ResultSource,
}

impl PipelineResult {
    /// Whether the case must be clarified before routing.
    pub fn needs_clarification(&self) -> bool {
        self.classification.confidence < CLARIFICATION_THRESHOLD
    }

    /// The only mutation allowed after a run: a reviewer moves the case to
    /// another department. Returns the previous department.
    pub fn reassign_department(&mut self, department: impl Into<String>) -> String {
        std::mem::replace(&mut self.classification.department, department.into())
    }
}

/// Lifecycle of a queued case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    InProgress,
    Resolved,
    Reopened,
}

impl CaseStatus {
    /// Whether a reviewer may move a case from `self` to `next`.
    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Resolved)
                | (InProgress, Resolved)
                | (Resolved, Reopened)
                | (Reopened, InProgress)
                | (Reopened, Resolved)
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CaseStatus::Pending => write!(f, "pending"),
            CaseStatus::InProgress => write!(f, "in_progress"),
            CaseStatus::Resolved => write!(f, "resolved"),
            CaseStatus::Reopened => write!(f, "reopened"),
        }
    }
}

/// Queue entry derived from a PipelineResult, visible to every role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: String,
    pub text: String,
    pub citizen_name: String,
    pub district: String,
    pub mandal: String,
    pub department: String,
    pub distress_level: DistressLevel,
    pub confidence: f64,
    pub lapse_risk: f64,
    pub sla_hours: u32,
    pub status: CaseStatus,
    pub submitted_at: DateTime<Utc>,
    pub distress_signals: Vec<String>,
    pub similar_cases: Vec<SimilarCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_result: Option<PipelineResult>,
}

impl CaseRecord {
    pub fn from_result(ctx: &crate::context::RunContext, result: &PipelineResult) -> Self {
        Self {
            id: result.case_id.clone(),
            text: ctx.text.clone(),
            citizen_name: ctx.citizen_name.clone(),
            district: ctx.district.clone(),
            mandal: ctx.mandal.clone(),
            department: result.classification.department.clone(),
            distress_level: result.sentiment.distress_level,
            confidence: result.classification.confidence,
            lapse_risk: result.lapse_risk.score,
            sla_hours: result.sla.hours,
            status: CaseStatus::Pending,
            submitted_at: ctx.submitted_at,
            distress_signals: result.sentiment.signals.clone(),
            similar_cases: result.similar_cases.clone(),
            pipeline_result: Some(result.clone()),
        }
    }
}
