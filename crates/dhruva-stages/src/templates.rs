//! Citizen response templates rendered with Handlebars.

use crate::tables::KeywordTables;
use dhruva_core::{DhruvaError, DistressLevel, ResponseTemplate};
use handlebars::Handlebars;
use serde_json::json;

/// Renders the per-distress-level acknowledgement for a case
pub struct ResponseRenderer {
    registry: Handlebars<'static>,
}

impl ResponseRenderer {
    pub fn new(tables: &KeywordTables) -> Result<Self, DhruvaError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (level, pair) in &tables.response_templates {
            registry
                .register_template_string(&Self::key(*level, "english"), &pair.english)
                .map_err(|e| DhruvaError::TemplateError(e.to_string()))?;
            registry
                .register_template_string(&Self::key(*level, "telugu"), &pair.telugu)
                .map_err(|e| DhruvaError::TemplateError(e.to_string()))?;
        }

        Ok(Self { registry })
    }

    fn key(level: DistressLevel, lang: &str) -> String {
        format!("{}.{}", level.as_str(), lang)
    }

    pub fn render(&self, level: DistressLevel, case_id: &str) -> Result<ResponseTemplate, DhruvaError> {
        let data = json!({ "case_id": case_id });
        let english = self
            .registry
            .render(&Self::key(level, "english"), &data)
            .map_err(|e| DhruvaError::TemplateError(e.to_string()))?;
        let telugu = self
            .registry
            .render(&Self::key(level, "telugu"), &data)
            .map_err(|e| DhruvaError::TemplateError(e.to_string()))?;
        Ok(ResponseTemplate { english, telugu })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_critical() {
        let renderer = ResponseRenderer::new(KeywordTables::builtin().unwrap()).unwrap();
        let t = renderer
            .render(DistressLevel::Critical, "PGRS-20250101-AB12")
            .unwrap();
        assert!(t.english.contains("#PGRS-20250101-AB12"));
        assert!(t.english.contains("CRITICAL"));
        assert!(t.telugu.contains("PGRS-20250101-AB12"));
        assert!(!t.english.contains("{{"));
    }

    #[test]
    fn test_every_level_renders() {
        let renderer = ResponseRenderer::new(KeywordTables::builtin().unwrap()).unwrap();
        for level in [
            DistressLevel::Critical,
            DistressLevel::High,
            DistressLevel::Medium,
            DistressLevel::Normal,
        ] {
            assert!(renderer.render(level, "X").is_ok(), "{} failed", level);
        }
    }
}
