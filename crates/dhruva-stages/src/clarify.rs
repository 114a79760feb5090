//! Clarifying questions for low-confidence classifications.
//!
//! Rule-based: when the two best departments are close, a pair rule asks
//! the citizen to disambiguate; ambiguous words (payment, certificate) add
//! keyword questions. Without any smart question the department's default
//! questions are used.

use crate::tables::{ClarifyOption, KeywordTables};
use dhruva_core::DepartmentScore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClarifyingQuestion {
    pub question: String,
    pub telugu: String,
    pub options: Vec<ClarifyOption>,
}

/// Smart questions for `text` given the ranked alternatives. At most
/// `max_questions` are returned; may be empty.
pub fn smart_questions(
    tables: &KeywordTables,
    text: &str,
    top3: &[DepartmentScore],
) -> Vec<ClarifyingQuestion> {
    let rules = &tables.clarification;
    let lowered = text.to_lowercase();
    let mut questions: Vec<ClarifyingQuestion> = Vec::new();

    if let [first, second, ..] = top3 {
        if first.confidence - second.confidence < rules.ambiguity_gap {
            let pair = [first.department.as_str(), second.department.as_str()];
            for rule in &rules.pair_rules {
                let hits = |needle: &str| pair.iter().any(|d| d.contains(needle));
                if hits(&rule.between[0]) && hits(&rule.between[1]) {
                    questions.push(ClarifyingQuestion {
                        question: rule.question.clone(),
                        telugu: rule.telugu.clone(),
                        options: rule.options.clone(),
                    });
                }
            }
        }
    }

    for rule in &rules.keyword_rules {
        if !rule.keywords.iter().any(|kw| lowered.contains(kw.as_str())) {
            continue;
        }
        let already_asked = rule.unless_asked.as_deref().is_some_and(|word| {
            questions.iter().any(|q| q.question.contains(word))
        });
        if !already_asked {
            questions.push(ClarifyingQuestion {
                question: rule.question.clone(),
                telugu: rule.telugu.clone(),
                options: rule.options.clone(),
            });
        }
    }

    questions.truncate(rules.max_questions);
    questions
}

/// Default questions for a department, each offering a single
/// confirmation option. Unknown departments get the generic set.
pub fn default_questions(tables: &KeywordTables, department: &str) -> Vec<ClarifyingQuestion> {
    let defaults = &tables.clarification.defaults;
    let Some(list) = defaults.get(department).or_else(|| defaults.get("default")) else {
        return Vec::new();
    };

    list.iter()
        .map(|q| {
            let target = if q.target_department.is_empty() {
                department.to_string()
            } else {
                q.target_department.clone()
            };
            ClarifyingQuestion {
                question: q.question.clone(),
                telugu: q.telugu.clone(),
                options: vec![ClarifyOption {
                    label: q.question.clone(),
                    telugu: q.telugu.clone(),
                    target_department: target,
                    boost: q.boost,
                }],
            }
        })
        .collect()
}

/// Smart questions if any apply, otherwise the department defaults.
pub fn questions_for(
    tables: &KeywordTables,
    text: &str,
    department: &str,
    top3: &[DepartmentScore],
) -> Vec<ClarifyingQuestion> {
    let smart = smart_questions(tables, text, top3);
    if smart.is_empty() {
        default_questions(tables, department)
    } else {
        smart
    }
}
