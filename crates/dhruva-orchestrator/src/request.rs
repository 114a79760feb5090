use serde::Deserialize;

/// A grievance as submitted by a citizen
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrievanceRequest {
    pub text: String,
    #[serde(default)]
    pub citizen_name: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<String>,
    /// Used for proactive alerts; without one the alerts stage is skipped
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub mandal: Option<String>,
}

impl GrievanceRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
