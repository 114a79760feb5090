//! Duplicate detection by text fingerprint.
//!
//! Grievances are normalized (lowercase, collapsed whitespace, trailing
//! punctuation dropped) and hashed; a submission whose fingerprint matches a
//! queued case is reported as a duplicate of that case.

use dhruva_core::DuplicateCheck;
use once_cell::sync::Lazy;
use regex::Regex;

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s.,!?;:।]+$").expect("valid regex"));

/// Normalize grievance text for comparison
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let collapsed = MULTI_SPACE.replace_all(&lowered, " ");
    TRAILING_PUNCT.replace(&collapsed, "").into_owned()
}

/// Stable fingerprint of the normalized text
pub fn fingerprint(text: &str) -> String {
    format!("blake3:{}", blake3::hash(normalize(text).as_bytes()))
}

/// Compare `text` against existing `(case_id, text)` pairs.
pub fn check<'a, I>(text: &str, existing: I) -> DuplicateCheck
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let own = fingerprint(text);
    for (case_id, other) in existing {
        if fingerprint(other) == own {
            return DuplicateCheck {
                is_duplicate: true,
                existing_case_id: Some(case_id.to_string()),
                similarity: 1.0,
            };
        }
    }
    DuplicateCheck::default()
}
