//! Run Context: per-submission state shared by both execution paths
use chrono::{DateTime, Utc};

/// Default district recorded on cases submitted without one.
pub const DEFAULT_DISTRICT: &str = "Guntur";
/// Default mandal recorded on cases submitted without one.
pub const DEFAULT_MANDAL: &str = "Tenali";
/// Minimum trimmed grievance length accepted for a run.
pub const MIN_TEXT_CHARS: usize = 10;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: u64,
    pub case_id: String,
    pub trace_id: String,
    pub text: String,
    pub citizen_name: String,
    pub citizen_id: Option<String>,
    pub location: Option<String>,
    pub district: String,
    pub mandal: String,
    pub submitted_at: DateTime<Utc>,
}

impl RunContext {
    pub fn new(run_id: u64, case_id: String, text: String) -> Self {
        Self {
            run_id,
            case_id,
            trace_id: uuid::Uuid::new_v4().to_string(),
            text,
            citizen_name: "Demo User".to_string(),
            citizen_id: None,
            location: None,
            district: DEFAULT_DISTRICT.to_string(),
            mandal: DEFAULT_MANDAL.to_string(),
            submitted_at: Utc::now(),
        }
    }

    pub fn with_citizen(mut self, name: impl Into<String>, id: Option<String>) -> Self {
        self.citizen_name = name.into();
        self.citizen_id = id;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn with_area(mut self, district: impl Into<String>, mandal: impl Into<String>) -> Self {
        self.district = district.into();
        self.mandal = mandal.into();
        self
    }

    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = at;
        self
    }
}

/// Reject grievance text that is empty or too short to analyze.
pub fn validate_text(text: &str) -> Result<(), crate::error::DhruvaError> {
    let len = text.trim().chars().count();
    if len < MIN_TEXT_CHARS {
        return Err(crate::error::DhruvaError::InvalidInput(format!(
            "grievance text must be at least {} characters, got {}",
            MIN_TEXT_CHARS, len
        )));
    }
    Ok(())
}
