//! Normalizing a backend analysis into a [`PipelineResult`].
use chrono::{DateTime, NaiveDateTime, Utc};
use dhruva_client::{AnalyzeResponse, ClientError};
use dhruva_core::data_model::UNKNOWN_DEPARTMENT;
use dhruva_core::{
    Classification, ClassificationMethod, DepartmentScore, DuplicateCheck, LapseRisk,
    PipelineResult, ProactiveAlert, RecommendedAction, ResponseTemplate, ResultSource, RunContext,
    Sentiment, SimilarCase, Sla,
};
use thiserror::Error;

/// Why the remote path gave up
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteFailure {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("analyze task aborted: {0}")]
    Aborted(String),
}

pub type RemoteOutcome = Result<PipelineResult, RemoteFailure>;

pub fn normalize(ctx: &RunContext, response: AnalyzeResponse) -> PipelineResult {
    let classification = Classification {
        department: response
            .classification
            .department
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string()),
        confidence: response.classification.confidence,
        method: ClassificationMethod::from_backend_tag(response.classification.method.as_deref()),
        top3: response
            .classification
            .top_3
            .into_iter()
            .take(3)
            .map(|t| DepartmentScore {
                department: t.department,
                confidence: t.confidence,
            })
            .collect(),
    };

    let level = response.sentiment.distress_level;
    let sentiment = Sentiment {
        distress_level: level,
        confidence: response.sentiment.confidence,
        signals: response
            .sentiment
            .signals
            .into_iter()
            .map(|s| format!("{} ({})", s.keyword, s.level))
            .collect(),
    };

    // Hours always follow the distress mapping; the backend's deadline and
    // label are kept only when it agrees on the hours.
    let mut sla = Sla::for_level(level, ctx.submitted_at);
    if response.sla.hours == sla.hours {
        if let Some(deadline) = parse_deadline(&response.sla.deadline) {
            sla.deadline = deadline;
        }
        if !response.sla.priority.is_empty() {
            sla.priority = response.sla.priority;
        }
    } else {
        tracing::warn!(
            case_id = %ctx.case_id,
            backend_hours = response.sla.hours,
            hours = sla.hours,
            "backend SLA disagrees with distress mapping"
        );
    }

    let lapse_risk = LapseRisk {
        score: response.lapse_prediction.risk_score,
        level: response.lapse_prediction.risk_level,
        likely_lapses: response
            .lapse_prediction
            .likely_lapses
            .into_iter()
            .map(|l| l.lapse)
            .collect(),
    };

    let similar_cases: Vec<SimilarCase> = response
        .similar_cases
        .into_iter()
        .map(|c| SimilarCase {
            id: c.case_id,
            similarity: c.similarity,
            resolution: c.resolution,
        })
        .collect();

    let recommended_actions = if response.recommended_actions.is_empty() {
        RecommendedAction::derive(
            level,
            classification.confidence,
            lapse_risk.score,
            similar_cases.len(),
        )
        .iter()
        .map(|a| a.as_str().to_string())
        .collect()
    } else {
        response
            .recommended_actions
            .into_iter()
            .map(|a| a.action)
            .collect()
    };

    PipelineResult {
        case_id: ctx.case_id.clone(),
        classification,
        sentiment,
        sla,
        lapse_risk,
        duplicate_check: DuplicateCheck {
            is_duplicate: response.duplicate_check.is_duplicate,
            existing_case_id: response.duplicate_check.existing_case_id,
            similarity: response.duplicate_check.similarity,
        },
        similar_cases,
        proactive_alerts: response
            .proactive_alerts
            .into_iter()
            .map(|a| ProactiveAlert {
                alert_type: a.alert_type,
                location: a.location,
                department: a.department,
                count: a.count,
            })
            .collect(),
        recommended_actions,
        response_template: response
            .response_template
            .map(|t| ResponseTemplate {
                english: t.english,
                telugu: t.telugu,
            })
            .unwrap_or_default(),
        source: ResultSource::Api,
    }
}

fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}
