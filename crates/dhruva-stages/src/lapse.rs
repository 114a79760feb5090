//! Lapse risk sampling.
use crate::tables::KeywordTables;
use dhruva_core::{LapseLevel, LapseRisk};
use rand::Rng;

pub fn predict<R: Rng + ?Sized>(tables: &KeywordTables, rng: &mut R) -> LapseRisk {
    let table = &tables.lapse;
    let score = rng.gen_range(table.min_score..table.max_score);
    let likely_lapses = if score > table.likely_lapses_above {
        table.likely_lapses.clone()
    } else {
        Vec::new()
    };

    LapseRisk {
        score,
        level: LapseLevel::from_score(score),
        likely_lapses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_score_in_range_and_consistent() {
        let tables = KeywordTables::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let risk = predict(tables, &mut rng);
            assert!(risk.score >= 0.2 && risk.score < 0.8);
            assert_eq!(risk.level, LapseLevel::from_score(risk.score));
            assert_eq!(risk.likely_lapses.is_empty(), risk.score <= 0.5);
        }
    }
}
