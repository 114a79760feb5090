//! Distress detection against tiered keyword lists.
//!
//! Tiers are checked from most to least severe; a lower tier is only
//! consulted when no higher tier matched.

use crate::tables::{DistressKeyword, KeywordTables};
use dhruva_core::{DistressLevel, Sentiment};

fn matches(text: &str, lowered: &str, kw: &DistressKeyword) -> bool {
    text.contains(kw.telugu.as_str()) || lowered.contains(kw.english.as_str())
}

pub fn detect(tables: &KeywordTables, text: &str) -> Sentiment {
    let lowered = text.to_lowercase();
    let mut level = DistressLevel::Normal;
    let mut signals = Vec::new();

    for (tier, keywords) in tables.distress.tiers() {
        for kw in keywords.iter().filter(|kw| matches(text, &lowered, kw)) {
            signals.push(format!("{} ({})", kw.telugu, kw.english));
            level = tier;
        }
        if level != DistressLevel::Normal {
            break;
        }
    }

    Sentiment {
        distress_level: level,
        confidence: level.keyword_confidence(),
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> &'static KeywordTables {
        KeywordTables::builtin().unwrap()
    }

    #[test]
    fn test_critical_keyword() {
        let s = detect(tables(), "This is an emergency, my family faces starvation");
        assert_eq!(s.distress_level, DistressLevel::Critical);
        assert_eq!(s.confidence, 0.98);
        assert_eq!(s.signals.len(), 2);
        assert!(s.signals.iter().any(|sig| sig.contains("starvation")));
    }

    #[test]
    fn test_critical_suppresses_lower_tiers() {
        let s = detect(tables(), "suicide thoughts, there is a problem for many days waiting");
        assert_eq!(s.distress_level, DistressLevel::Critical);
        assert_eq!(s.signals.len(), 1);
    }

    #[test]
    fn test_telugu_high() {
        let s = detect(tables(), "పెన్షన్ నెలలుగా రాలేదు");
        assert_eq!(s.distress_level, DistressLevel::High);
        assert_eq!(s.signals.len(), 2);
    }

    #[test]
    fn test_medium_and_normal() {
        let s = detect(tables(), "There is a problem with the road");
        assert_eq!(s.distress_level, DistressLevel::Medium);

        let s = detect(tables(), "My pension has not been received for 6 months");
        assert_eq!(s.distress_level, DistressLevel::Normal);
        assert!(s.signals.is_empty());
        assert_eq!(s.confidence, 0.78);
    }
}
