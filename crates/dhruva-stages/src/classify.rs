//! Department classification by keyword scoring.

use crate::tables::KeywordTables;
use dhruva_core::{Classification, ClassificationMethod, DepartmentScore};
use rand::Rng;

const KEYWORD_WEIGHT: f64 = 0.25;
const MAX_CONFIDENCE: f64 = 0.95;
const MIN_ALTERNATIVE: f64 = 0.15;

/// Raw keyword score per department, highest first. Ties keep table order.
pub fn score_departments(tables: &KeywordTables, text: &str) -> Vec<(String, f64)> {
    let lowered = text.to_lowercase();
    let mut scores: Vec<(String, f64)> = tables
        .departments
        .iter()
        .map(|dept| {
            let hits = dept
                .keywords
                .iter()
                .filter(|kw| lowered.contains(kw.as_str()))
                .count();
            (dept.name.clone(), (hits as f64 * KEYWORD_WEIGHT).min(MAX_CONFIDENCE))
        })
        .collect();

    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scores
}

/// Classify grievance text into a department.
pub fn classify<R: Rng + ?Sized>(tables: &KeywordTables, text: &str, rng: &mut R) -> Classification {
    let scores = score_departments(tables, text);

    let top_score = scores.first().map(|(_, s)| *s).unwrap_or(0.0);
    if top_score == 0.0 {
        let top3: Vec<DepartmentScore> = tables.unmatched.iter().take(3).cloned().collect();
        let (department, confidence) = top3
            .first()
            .map(|d| (d.department.clone(), d.confidence))
            .unwrap_or_else(|| ("Revenue".to_string(), 0.45));
        return Classification {
            department,
            confidence,
            method: ClassificationMethod::from_confidence(confidence),
            top3,
        };
    }

    let confidence = (top_score + rng.gen_range(0.0..0.2) + 0.4).min(MAX_CONFIDENCE);
    let top3 = scores
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, (department, _))| DepartmentScore {
            department: department.clone(),
            confidence: (confidence - i as f64 * 0.15 - rng.gen_range(0.0..0.1))
                .max(MIN_ALTERNATIVE),
        })
        .collect();

    Classification {
        department: scores[0].0.clone(),
        confidence,
        method: ClassificationMethod::from_confidence(confidence),
        top3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tables() -> &'static KeywordTables {
        KeywordTables::builtin().unwrap()
    }

    #[test]
    fn test_pension_goes_to_social_welfare() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = classify(tables(), "My pension has not been received for 6 months", &mut rng);
        assert_eq!(c.department, "Social Welfare");
        assert!(c.confidence > 0.0);
        assert!(c.confidence >= 0.65 && c.confidence <= 0.95);
        assert_eq!(c.top3.len(), 3);
        assert_eq!(c.top3[0].department, "Social Welfare");
    }

    #[test]
    fn test_telugu_keyword() {
        let mut rng = StdRng::seed_from_u64(2);
        let c = classify(tables(), "మా ఊరిలో రేషన్ బియ్యం రాలేదు", &mut rng);
        assert_eq!(c.department, "Civil Supplies");
    }

    #[test]
    fn test_unmatched_falls_back_to_revenue() {
        let mut rng = StdRng::seed_from_u64(3);
        let c = classify(tables(), "Nobody answers my letters at all", &mut rng);
        assert_eq!(c.department, "Revenue");
        assert_eq!(c.confidence, 0.45);
        assert_eq!(c.method, ClassificationMethod::Fallback);
        assert_eq!(c.top3[1].department, "Municipal Administration");
    }

    #[test]
    fn test_score_capped() {
        let scores = score_departments(
            tables(),
            "pension welfare widow old age disability pension",
        );
        assert_eq!(scores[0].0, "Social Welfare");
        assert_eq!(scores[0].1, 0.95);
    }

    #[test]
    fn test_alternatives_have_floor() {
        let mut rng = StdRng::seed_from_u64(4);
        let c = classify(tables(), "land patta survey", &mut rng);
        assert!(c.top3.iter().all(|d| d.confidence >= 0.15));
    }
}
