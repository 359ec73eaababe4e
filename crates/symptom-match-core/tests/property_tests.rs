//! Property tests for normalization and ranking invariants.

use std::sync::Arc;

use proptest::prelude::*;
use symptom_match_core::resolver::{canonicalize, Normalizer, DEFAULT_MAX_RESULTS};
use symptom_match_core::{Catalog, Matcher, WeightTable};

const SYMPTOMS: &[&str] = &[
    "fever",
    "cough",
    "fatigue",
    "headache",
    "nausea",
    "dizziness",
    "sore_throat",
    "runny_nose",
];

/// Up to eight conditions, each with a non-empty subset of `SYMPTOMS` and
/// optional weights.
fn arb_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(
        (
            prop::sample::subsequence(SYMPTOMS, 1..=SYMPTOMS.len()),
            prop::collection::vec(1u32..=5, SYMPTOMS.len()),
            any::<bool>(),
        ),
        1..8,
    )
    .prop_map(|conditions| {
        let mut builder = Catalog::builder();
        let mut weights = WeightTable::new();
        for (idx, (symptoms, weight_values, weighted)) in conditions.into_iter().enumerate() {
            let name = format!("condition {}", idx);
            if weighted {
                for (symptom, weight) in symptoms.iter().zip(weight_values) {
                    weights.insert(&name, symptom, weight).unwrap();
                }
            }
            builder = builder.condition(&name, symptoms);
        }
        builder.build().with_weights(weights)
    })
}

fn arb_query() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            prop::sample::select(SYMPTOMS).prop_map(str::to_string),
            "[a-z ]{1,12}",
        ],
        1..10,
    )
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in "[A-Za-z0-9 _\\-\t]{0,40}") {
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&s);
        prop_assert_eq!(normalizer.normalize(&once), once.clone());
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn scores_are_positive_sorted_and_bounded(catalog in arb_catalog(), query in arb_query()) {
        let matcher = Matcher::new(Arc::new(catalog));
        let result = matcher.match_by_symptom_list(&query).unwrap();
        let entries = result.entries();

        prop_assert!(entries.len() <= DEFAULT_MAX_RESULTS);
        prop_assert!(entries.iter().all(|e| e.score > 0));
        prop_assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn ties_follow_catalog_order(catalog in arb_catalog(), query in arb_query()) {
        let position = |name: &str| {
            catalog.entries().iter().position(|e| e.condition == name)
        };
        let matcher = Matcher::new(Arc::new(catalog.clone())).with_max_results(usize::MAX);
        let result = matcher.match_by_symptom_list(&query).unwrap();

        for pair in result.entries().windows(2) {
            if pair[0].score == pair[1].score {
                prop_assert!(position(&pair[0].condition) < position(&pair[1].condition));
            }
        }
    }

    #[test]
    fn duplicate_tokens_count_once(catalog in arb_catalog(), query in arb_query()) {
        let matcher = Matcher::new(Arc::new(catalog));
        let doubled: Vec<String> = query.iter().chain(query.iter()).cloned().collect();

        prop_assert_eq!(
            matcher.match_by_symptom_list(&doubled).unwrap(),
            matcher.match_by_symptom_list(&query).unwrap()
        );
    }

    #[test]
    fn unweighted_score_is_overlap_count(
        symptoms in prop::sample::subsequence(SYMPTOMS, 1..=SYMPTOMS.len()),
        query in arb_query(),
    ) {
        let catalog = Catalog::builder().condition("Only", symptoms.iter()).build();
        let normalizer = Normalizer::new();
        let expected = query
            .iter()
            .map(|q| normalizer.normalize(q))
            .filter(|q| symptoms.contains(&q.as_str()))
            .collect::<std::collections::HashSet<_>>()
            .len() as u32;

        let matcher = Matcher::new(Arc::new(catalog));
        let result = matcher.match_by_symptom_list(&query).unwrap();
        prop_assert_eq!(result.top().map(|e| e.score).unwrap_or(0), expected);
        prop_assert_eq!(result.is_no_match(), expected == 0);
    }
}
