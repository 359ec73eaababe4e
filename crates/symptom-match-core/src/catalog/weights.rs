//! Per-(condition, symptom) importance weights.

use std::collections::{BTreeMap, HashMap};

use super::CatalogError;
use crate::resolver::{canonicalize, Normalizer};

/// Weight used for any pair missing from the table.
pub const DEFAULT_WEIGHT: u32 = 1;

/// Immutable once attached to a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    /// condition key → symptom token → weight
    weights: HashMap<String, HashMap<String, u32>>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight for a pair. Names are canonicalized; zero is rejected.
    pub fn insert(&mut self, condition: &str, symptom: &str, weight: u32) -> Result<(), CatalogError> {
        if weight == 0 {
            return Err(CatalogError::InvalidWeight {
                condition: condition.to_string(),
                symptom: symptom.to_string(),
            });
        }
        self.weights
            .entry(canonicalize(condition))
            .or_default()
            .insert(canonicalize(symptom), weight);
        Ok(())
    }

    /// Parse `{ "<condition>": { "<symptom>": <weight>, ... }, ... }`.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, BTreeMap<String, u32>> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (condition, symptoms) in &raw {
            for (symptom, &weight) in symptoms {
                table.insert(condition, symptom, weight)?;
            }
        }
        Ok(table)
    }

    /// Weight for a canonical (condition key, symptom token) pair, or
    /// [`DEFAULT_WEIGHT`].
    pub fn get(&self, condition_key: &str, symptom: &str) -> u32 {
        self.weights
            .get(condition_key)
            .and_then(|symptoms| symptoms.get(symptom))
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// Re-key symptom tokens through `normalizer` so synonyms land on the
    /// catalog's canonical tokens. Colliding synonyms keep the larger weight.
    pub fn normalized_with(&self, normalizer: &Normalizer) -> Self {
        let mut weights: HashMap<String, HashMap<String, u32>> = HashMap::new();
        for (condition, symptoms) in &self.weights {
            let target = weights.entry(condition.clone()).or_default();
            for (symptom, &weight) in symptoms {
                let slot = target.entry(normalizer.normalize(symptom)).or_insert(weight);
                *slot = (*slot).max(weight);
            }
        }
        Self { weights }
    }

    /// Condition keys that carry explicit weights.
    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// Number of explicit (condition, symptom) weights.
    pub fn len(&self) -> usize {
        self.weights.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
