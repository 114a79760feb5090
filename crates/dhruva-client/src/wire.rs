//! Wire types for the remote ML backend (`/api/v1/ml/*`).
use dhruva_core::{DistressLevel, LapseLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citizen_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TextRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub models: Option<serde_json::Value>,
    #[serde(default)]
    pub knowledge_base_loaded: bool,
}

impl HealthResponse {
    /// `degraded` still serves analyze requests through fallback models.
    pub fn is_serving(&self) -> bool {
        self.status == "healthy" || self.status == "degraded"
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartmentConfidence {
    pub department: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassificationResult {
    pub department: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub top_3: Vec<DepartmentConfidence>,
    #[serde(default)]
    pub needs_manual_review: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Signal {
    pub keyword: String,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentimentResult {
    pub distress_level: DistressLevel,
    pub confidence: f64,
    #[serde(default)]
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LikelyLapse {
    pub lapse: String,
    #[serde(default)]
    pub probability: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LapsePredictionResult {
    pub risk_score: f64,
    pub risk_level: LapseLevel,
    #[serde(default)]
    pub likely_lapses: Vec<LikelyLapse>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlaResult {
    pub hours: u32,
    pub deadline: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DuplicateCheckResult {
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default)]
    pub existing_case_id: Option<String>,
    #[serde(default)]
    pub similarity: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarCaseResult {
    pub case_id: String,
    pub similarity: f64,
    pub resolution: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProactiveAlertResult {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub location: String,
    pub department: String,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendedActionResult {
    pub action: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseTemplateResult {
    pub telugu: String,
    pub english: String,
    #[serde(default)]
    pub category: String,
}

/// Full `/analyze` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub classification: ClassificationResult,
    pub sentiment: SentimentResult,
    pub lapse_prediction: LapsePredictionResult,
    pub sla: SlaResult,
    #[serde(default)]
    pub duplicate_check: DuplicateCheckResult,
    #[serde(default)]
    pub similar_cases: Vec<SimilarCaseResult>,
    #[serde(default)]
    pub proactive_alerts: Vec<ProactiveAlertResult>,
    #[serde(default)]
    pub recommended_actions: Vec<RecommendedActionResult>,
    #[serde(default)]
    pub response_template: Option<ResponseTemplateResult>,
}

impl AnalyzeResponse {
    /// Basic presence and range checks. Anything failing here is treated
    /// like any other remote failure.
    pub fn validate(&self) -> Result<(), String> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.classification.confidence) {
            return Err(format!(
                "classification confidence {} outside 0..1",
                self.classification.confidence
            ));
        }
        if !unit.contains(&self.sentiment.confidence) {
            return Err(format!(
                "sentiment confidence {} outside 0..1",
                self.sentiment.confidence
            ));
        }
        if !unit.contains(&self.lapse_prediction.risk_score) {
            return Err(format!(
                "risk score {} outside 0..1",
                self.lapse_prediction.risk_score
            ));
        }
        Ok(())
    }
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_response() -> serde_json::Value {
        json!({
            "timestamp": "2025-11-26T08:30:00Z",
            "classification": {
                "department": "Social Welfare",
                "confidence": 0.91,
                "method": "primary_classifier",
                "top_3": [
                    { "department": "Social Welfare", "confidence": 0.91 },
                    { "department": "Civil Supplies", "confidence": 0.05 }
                ],
                "needs_manual_review": false
            },
            "sentiment": {
                "distress_level": "HIGH",
                "confidence": 0.9,
                "signals": [{ "keyword": "రాలేదు", "level": "HIGH" }]
            },
            "lapse_prediction": {
                "risk_score": 0.64,
                "risk_level": "MEDIUM",
                "likely_lapses": [{ "lapse": "No Direct Contact", "probability": 0.4 }]
            },
            "sla": { "hours": 72, "deadline": "2025-11-29T08:30:00Z", "priority": "HIGH" },
            "duplicate_check": { "is_duplicate": false, "similarity": 0.1 },
            "similar_cases": [],
            "proactive_alerts": [
                { "type": "cluster", "location": "Guntur", "department": "Social Welfare", "count": 4 }
            ],
            "recommended_actions": [
                { "action": "SUPERVISOR_REVIEW", "priority": "high", "reason": "risk" }
            ],
            "response_template": null
        })
    }

    #[test]
    fn test_parse_full_response() {
        let resp: AnalyzeResponse = serde_json::from_value(sample_response()).unwrap();
        assert_eq!(resp.classification.department.as_deref(), Some("Social Welfare"));
        assert_eq!(resp.sentiment.distress_level, DistressLevel::High);
        assert_eq!(resp.lapse_prediction.risk_level, LapseLevel::Medium);
        assert_eq!(resp.proactive_alerts[0].alert_type, "cluster");
        assert!(resp.response_template.is_none());
        assert!(resp.validate().is_ok());
    }

    #[test]
    fn test_missing_section_rejected() {
        let mut value = sample_response();
        value.as_object_mut().unwrap().remove("sentiment");
        assert!(serde_json::from_value::<AnalyzeResponse>(value).is_err());
    }

    #[test]
    fn test_out_of_range_confidence() {
        let mut value = sample_response();
        value["classification"]["confidence"] = json!(1.7);
        let resp: AnalyzeResponse = serde_json::from_value(value).unwrap();
        assert!(resp.validate().is_err());
    }

    #[test]
    fn test_health_serving() {
        let h: HealthResponse = serde_json::from_value(json!({ "status": "degraded" })).unwrap();
        assert!(h.is_serving());
        let h: HealthResponse =
            serde_json::from_value(json!({ "status": "starting", "models_loaded": false })).unwrap();
        assert!(!h.is_serving());
    }

    #[test]
    fn test_request_omits_empty_fields() {
        let req = AnalyzeRequest {
            text: "water problem".to_string(),
            citizen_id: None,
            location: Some("Guntur".to_string()),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("citizen_id").is_none());
        assert_eq!(value["location"], "Guntur");
    }
}
