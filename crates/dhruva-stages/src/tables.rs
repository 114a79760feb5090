//! Keyword tables for the simulation path.
//!
//! The tables ship embedded as `tables/keywords.yaml`; deployments may load
//! their own file with the same layout.

use dhruva_core::{DepartmentScore, DhruvaError, DistressLevel};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

static BUILTIN_YAML: &str = include_str!("../tables/keywords.yaml");

static BUILTIN: Lazy<Result<KeywordTables, DhruvaError>> =
    Lazy::new(|| KeywordTables::from_yaml(BUILTIN_YAML));

/// Top-level tables file structure
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordTables {
    pub version: String,
    pub departments: Vec<DepartmentKeywords>,
    /// Fixed ranking used when no department keyword matches
    pub unmatched: Vec<DepartmentScore>,
    pub distress: DistressTiers,
    pub response_templates: HashMap<DistressLevel, TemplatePair>,
    pub similar_cases: Vec<SimilarCaseSeed>,
    pub lapse: LapseTable,
    pub clarification: ClarificationRules,
    #[serde(default)]
    pub all_departments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistressTiers {
    pub critical: Vec<DistressKeyword>,
    pub high: Vec<DistressKeyword>,
    pub medium: Vec<DistressKeyword>,
}

impl DistressTiers {
    /// Tiers from most to least severe.
    pub fn tiers(&self) -> [(DistressLevel, &[DistressKeyword]); 3] {
        [
            (DistressLevel::Critical, &self.critical),
            (DistressLevel::High, &self.high),
            (DistressLevel::Medium, &self.medium),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistressKeyword {
    pub telugu: String,
    pub english: String,
    pub sla_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePair {
    pub english: String,
    pub telugu: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarCaseSeed {
    pub similarity: f64,
    pub resolution: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LapseTable {
    pub min_score: f64,
    pub max_score: f64,
    pub likely_lapses_above: f64,
    pub likely_lapses: Vec<String>,
    pub model_accuracy: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClarificationRules {
    pub ambiguity_gap: f64,
    pub max_questions: usize,
    #[serde(default)]
    pub pair_rules: Vec<PairRule>,
    #[serde(default)]
    pub keyword_rules: Vec<KeywordRule>,
    #[serde(default)]
    pub defaults: HashMap<String, Vec<DefaultQuestion>>,
}

/// Asked when the top two departments are close and each side of `between`
/// appears in one of them.
#[derive(Debug, Clone, Deserialize)]
pub struct PairRule {
    pub between: [String; 2],
    pub question: String,
    pub telugu: String,
    pub options: Vec<ClarifyOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub keywords: Vec<String>,
    /// Skip this rule if an earlier question already mentions this word
    #[serde(default)]
    pub unless_asked: Option<String>,
    pub question: String,
    pub telugu: String,
    pub options: Vec<ClarifyOption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct ClarifyOption {
    pub label: String,
    pub telugu: String,
    pub target_department: String,
    pub boost: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultQuestion {
    pub question: String,
    pub telugu: String,
    pub target_department: String,
    pub boost: f64,
}

impl KeywordTables {
    /// The embedded tables.
    pub fn builtin() -> Result<&'static KeywordTables, DhruvaError> {
        match &*BUILTIN {
            Ok(tables) => Ok(tables),
            Err(e) => Err(e.clone()),
        }
    }

    /// Load tables from a YAML file
    pub fn load(path: &str) -> Result<Self, DhruvaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DhruvaError::TablesError(format!("failed to read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate tables from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, DhruvaError> {
        let tables: KeywordTables = serde_yaml::from_str(yaml)
            .map_err(|e| DhruvaError::TablesError(e.to_string()))?;
        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> Result<(), DhruvaError> {
        if self.departments.is_empty() {
            return Err(DhruvaError::TablesError("no departments defined".to_string()));
        }
        if self.unmatched.is_empty() {
            return Err(DhruvaError::TablesError("unmatched ranking is empty".to_string()));
        }

        // Keyword SLA hints must agree with the fixed distress mapping
        for (level, keywords) in self.distress.tiers() {
            if let Some(kw) = keywords.iter().find(|k| k.sla_hours != level.sla_hours()) {
                return Err(DhruvaError::TablesError(format!(
                    "keyword '{}' has sla_hours {} but {} requires {}",
                    kw.english,
                    kw.sla_hours,
                    level,
                    level.sla_hours()
                )));
            }
        }

        for level in [
            DistressLevel::Critical,
            DistressLevel::High,
            DistressLevel::Medium,
            DistressLevel::Normal,
        ] {
            if !self.response_templates.contains_key(&level) {
                return Err(DhruvaError::TablesError(format!(
                    "missing response template for {}",
                    level
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.lapse.min_score)
            || !(0.0..=1.0).contains(&self.lapse.max_score)
            || self.lapse.min_score >= self.lapse.max_score
        {
            return Err(DhruvaError::TablesError(format!(
                "invalid lapse score range {}..{}",
                self.lapse.min_score, self.lapse.max_score
            )));
        }

        Ok(())
    }

    /// Whether `department` is one an officer may route to.
    pub fn is_known_department(&self, department: &str) -> bool {
        self.all_departments.iter().any(|d| d == department)
            || self.departments.iter().any(|d| d.name == department)
    }
}
