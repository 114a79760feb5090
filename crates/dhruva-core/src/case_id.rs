//! Case identifiers: `PGRS-YYYYMMDD-XXXX`
use chrono::{DateTime, Utc};
use rand::Rng;

pub const CASE_ID_PREFIX: &str = "PGRS";

const SUFFIX_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 4;

/// Random uppercase alphanumeric suffix.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect()
}

/// Generate a case id for a submission made at `at`.
///
/// Collisions are possible and are not retried.
pub fn generate_case_id<R: Rng + ?Sized>(rng: &mut R, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        CASE_ID_PREFIX,
        at.format("%Y%m%d"),
        random_suffix(rng, SUFFIX_LEN)
    )
}

/// Check that `id` has the `PGRS-YYYYMMDD-XXXX` shape.
pub fn is_valid_case_id(id: &str) -> bool {
    let mut parts = id.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == CASE_ID_PREFIX
        && date.len() == 8
        && date.chars().all(|c| c.is_ascii_digit())
        && chrono::NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
