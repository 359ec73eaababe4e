//! Weighted overlap scoring.
//!
//! Ranks conditions by the summed weight of query tokens found in their
//! symptom set.

use tracing::debug;

use crate::catalog::Catalog;
use crate::models::{RankedResult, ScoreEntry, SymptomQuery};

/// Number of candidates kept in a ranking.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Scores queries against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    max_results: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl Scorer {
    /// Create a scorer keeping at most `max_results` candidates (at least 1).
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Rank every condition sharing at least one symptom with `query`.
    ///
    /// Ties keep catalog order.
    pub fn score(&self, query: &SymptomQuery, catalog: &Catalog) -> RankedResult {
        let mut entries: Vec<ScoreEntry> = catalog
            .entries()
            .iter()
            .filter_map(|entry| {
                let score = query
                    .tokens()
                    .iter()
                    .filter(|token| entry.has_symptom(token))
                    .fold(0u32, |acc, token| {
                        acc.saturating_add(catalog.weights().get(&entry.key, token))
                    });
                (score > 0).then(|| ScoreEntry {
                    condition: entry.condition.clone(),
                    score,
                })
            })
            .collect();

        // sort_by is stable
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        let candidates = entries.len();
        entries.truncate(self.max_results);

        debug!(
            tokens = query.len(),
            candidates,
            returned = entries.len(),
            "Scored query"
        );

        RankedResult::from_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeightTable;

    fn flu_covid() -> Catalog {
        let weights = WeightTable::from_json_str(
            r#"{ "flu": { "fever": 3, "cough": 3, "fatigue": 2 }, "covid": { "fever": 3, "cough": 2 } }"#,
        )
        .unwrap();

        Catalog::builder()
            .condition("Flu", ["fever", "cough", "fatigue"])
            .condition("Covid", ["fever", "cough"])
            .build()
            .with_weights(weights)
    }

    fn entry(condition: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            condition: condition.into(),
            score,
        }
    }

    #[test]
    fn test_weighted_ranking() {
        let result = Scorer::default().score(
            &SymptomQuery::from_tokens(["fever", "cough"]),
            &flu_covid(),
        );
        assert_eq!(
            result,
            RankedResult::Ranked(vec![entry("Flu", 6), entry("Covid", 5)])
        );
    }

    #[test]
    fn test_deserialized_duplicates_count_once() {
        let catalog = Catalog::builder().condition("Flu", ["fever", "cough"]).build();
        let query: SymptomQuery = serde_json::from_str(r#"["fever","fever",""]"#).unwrap();

        let result = Scorer::default().score(&query, &catalog);
        assert_eq!(result.entries(), [entry("Flu", 1)]);
    }

    #[test]
    fn test_unweighted_pairs_count_one() {
        let catalog = Catalog::builder()
            .condition("Cold", ["cough", "runny_nose", "sore_throat"])
            .condition("Asthma", ["cough", "difficulty_breathing"])
            .build();

        let result = Scorer::default().score(
            &SymptomQuery::from_tokens(["cough", "runny_nose"]),
            &catalog,
        );
        assert_eq!(result.entries(), [entry("Cold", 2), entry("Asthma", 1)]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = Catalog::builder()
            .condition("B", ["fever"])
            .condition("A", ["fever"])
            .condition("C", ["fever", "cough"])
            .build();

        let result = Scorer::default().score(&SymptomQuery::from_tokens(["fever"]), &catalog);
        assert_eq!(
            result.entries(),
            [entry("B", 1), entry("A", 1), entry("C", 1)]
        );
    }

    #[test]
    fn test_truncates_to_max_results() {
        let catalog = Catalog::builder()
            .condition("One", ["fever"])
            .condition("Two", ["fever"])
            .condition("Three", ["fever"])
            .condition("Four", ["fever", "cough"])
            .build();
        let query = SymptomQuery::from_tokens(["fever", "cough"]);

        let result = Scorer::default().score(&query, &catalog);
        assert_eq!(result.entries().len(), 3);
        assert_eq!(result.top(), Some(&entry("Four", 2)));

        let result = Scorer::new(1).score(&query, &catalog);
        assert_eq!(result.entries(), [entry("Four", 2)]);
    }

    #[test]
    fn test_zero_max_results_is_clamped() {
        assert_eq!(Scorer::new(0).max_results(), 1);
    }

    #[test]
    fn test_no_overlap_is_no_match() {
        let result = Scorer::default().score(&SymptomQuery::from_tokens(["rash"]), &flu_covid());
        assert_eq!(result, RankedResult::NoMatch);

        let result = Scorer::default().score(&SymptomQuery::default(), &flu_covid());
        assert!(result.is_no_match());
    }
}
