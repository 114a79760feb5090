//! Similar case matching for the simulation path.
use crate::tables::KeywordTables;
use dhruva_core::case_id::{random_suffix, CASE_ID_PREFIX};
use dhruva_core::SimilarCase;
use rand::Rng;

pub fn find<R: Rng + ?Sized>(tables: &KeywordTables, rng: &mut R) -> Vec<SimilarCase> {
    tables
        .similar_cases
        .iter()
        .map(|seed| SimilarCase {
            id: format!("{}-{}", CASE_ID_PREFIX, random_suffix(rng, 4)),
            similarity: seed.similarity,
            resolution: seed.resolution.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_similar_cases() {
        let tables = KeywordTables::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let cases = find(tables, &mut rng);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].similarity, 0.87);
        assert!(cases[0].id.starts_with("PGRS-"));
        assert_eq!(cases[0].id.len(), 9);
    }
}
