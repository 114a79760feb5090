//! Dhruva Stages: local simulation of the analysis pipeline.
//!
//! Used whenever no remote backend is reachable, or when a remote call fails
//! part-way through a run. Everything here is synchronous; pacing between
//! steps is the orchestrator's concern.
//!
//! # Pipeline Flow
//!
//! ```text
//! duplicate → classify → sentiment → sla → lapse → similar → alerts → template → actions
//!     ↓           ↓           ↓        ↓       ↓        ↓         ↓         ↓          ↓
//! fingerprint  keywords    tiers   mapping  sample   seeds    location  handlebars  derived
//! ```

pub mod clarify;
pub mod classify;
pub mod distress;
pub mod duplicate;
pub mod lapse;
pub mod similar;
pub mod tables;
pub mod templates;

pub use clarify::ClarifyingQuestion;
pub use tables::{ClarifyOption, KeywordTables};
pub use templates::ResponseRenderer;

use chrono::{DateTime, Utc};
use dhruva_core::{
    Classification, DepartmentScore, DhruvaError, DistressLevel, DuplicateCheck, LapseRisk,
    ProactiveAlert, RecommendedAction, ResponseTemplate, Sentiment, SimilarCase, Sla,
};
use rand::Rng;

/// Bundles the keyword tables with a compiled template renderer
pub struct Simulator {
    tables: KeywordTables,
    renderer: ResponseRenderer,
}

impl Simulator {
    pub fn new(tables: KeywordTables) -> Result<Self, DhruvaError> {
        let renderer = ResponseRenderer::new(&tables)?;
        Ok(Self { tables, renderer })
    }

    /// Simulator over the embedded tables
    pub fn builtin() -> Result<Self, DhruvaError> {
        Self::new(KeywordTables::builtin()?.clone())
    }

    pub fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    pub fn duplicate<'a, I>(&self, text: &str, existing: I) -> DuplicateCheck
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        duplicate::check(text, existing)
    }

    pub fn classify<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Classification {
        classify::classify(&self.tables, text, rng)
    }

    pub fn distress(&self, text: &str) -> Sentiment {
        distress::detect(&self.tables, text)
    }

    pub fn sla(&self, level: DistressLevel, from: DateTime<Utc>) -> Sla {
        Sla::for_level(level, from)
    }

    pub fn lapse<R: Rng + ?Sized>(&self, rng: &mut R) -> LapseRisk {
        lapse::predict(&self.tables, rng)
    }

    /// Accuracy reported as the lapse step's confidence
    pub fn lapse_model_accuracy(&self) -> f64 {
        self.tables.lapse.model_accuracy
    }

    pub fn similar<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SimilarCase> {
        similar::find(&self.tables, rng)
    }

    /// Proactive alerts need a location; there is no local alert source, so
    /// a located grievance yields an empty list and an unlocated one `None`.
    pub fn alerts(&self, location: Option<&str>) -> Option<Vec<ProactiveAlert>> {
        location.map(|_| Vec::new())
    }

    pub fn template(&self, level: DistressLevel, case_id: &str) -> ResponseTemplate {
        self.renderer.render(level, case_id).unwrap_or_else(|e| {
            tracing::warn!(error = %e, distress = %level, "template render failed, using default");
            ResponseTemplate::default()
        })
    }

    pub fn actions(
        &self,
        distress: DistressLevel,
        classification_confidence: f64,
        lapse_score: f64,
        similar_cases: usize,
    ) -> Vec<String> {
        RecommendedAction::derive(distress, classification_confidence, lapse_score, similar_cases)
            .iter()
            .map(|a| a.as_str().to_string())
            .collect()
    }

    pub fn clarifying_questions(
        &self,
        text: &str,
        department: &str,
        top3: &[DepartmentScore],
    ) -> Vec<ClarifyingQuestion> {
        clarify::questions_for(&self.tables, text, department, top3)
    }

    pub fn is_known_department(&self, department: &str) -> bool {
        self.tables.is_known_department(department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_simulator_end_to_end() {
        let sim = Simulator::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let text = "Emergency! My pension has not come and we face starvation";

        let classification = sim.classify(text, &mut rng);
        let sentiment = sim.distress(text);
        let sla = sim.sla(sentiment.distress_level, Utc::now());
        let lapse = sim.lapse(&mut rng);
        let similar = sim.similar(&mut rng);
        let actions = sim.actions(
            sentiment.distress_level,
            classification.confidence,
            lapse.score,
            similar.len(),
        );

        assert_eq!(classification.department, "Social Welfare");
        assert_eq!(sentiment.distress_level, DistressLevel::Critical);
        assert_eq!(sla.hours, 24);
        assert_eq!(actions[0], "IMMEDIATE_ATTENTION");
        assert!(actions.contains(&"SIMILAR_CASE_REVIEW".to_string()));
    }

    #[test]
    fn test_alerts_need_location() {
        let sim = Simulator::builtin().unwrap();
        assert!(sim.alerts(None).is_none());
        assert_eq!(sim.alerts(Some("Guntur")), Some(vec![]));
    }
}
