//! In-memory reference catalog.
//!
//! Built once at startup from source rows, then shared read-only (usually
//! behind an `Arc`) by every request.

mod list_parser;
mod weights;

pub use list_parser::*;
pub use weights::*;

use std::collections::{BTreeSet, HashMap, HashSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{CatalogEntry, CatalogRow};
use crate::resolver::{canonicalize, Normalizer};

/// Catalog construction errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Malformed row {row} ({condition}): {reason}")]
    MalformedRow {
        row: usize,
        condition: String,
        reason: String,
    },

    #[error("Row {row} has no condition name")]
    MissingCondition { row: usize },

    #[error("Invalid weight for {condition}/{symptom}: weights must be positive")]
    InvalidWeight { condition: String, symptom: String },

    #[error("Weight table format error: {0}")]
    WeightFormat(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Condition → symptom associations plus their weights.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Entries in first-seen order (the ranking tie-break order)
    entries: Vec<CatalogEntry>,
    /// Condition key → position in `entries`
    index: HashMap<String, usize>,
    /// Every symptom token used by any entry
    vocabulary: HashSet<String>,
    weights: WeightTable,
    normalizer: Normalizer,
}

impl Catalog {
    /// Start a catalog with the default normalizer.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new(Normalizer::new())
    }

    /// Build a catalog from source rows using the default normalizer.
    pub fn load<I>(rows: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = CatalogRow>,
    {
        Self::load_with(rows, Normalizer::new())
    }

    /// Build a catalog from source rows.
    ///
    /// Rows naming the same condition are merged (union of symptoms). Rows
    /// without any present symptom are skipped. The first malformed row
    /// aborts the load.
    pub fn load_with<I>(rows: I, normalizer: Normalizer) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = CatalogRow>,
    {
        let mut builder = CatalogBuilder::new(normalizer);
        let mut row_count = 0usize;

        for (idx, row) in rows.into_iter().enumerate() {
            let row_number = idx + 1;
            row_count += 1;

            let condition = row.condition().trim().to_string();
            if condition.is_empty() {
                return Err(CatalogError::MissingCondition { row: row_number });
            }

            let symptoms = match row {
                CatalogRow::Flags { columns, .. } => columns
                    .into_iter()
                    .filter(|(_, value)| value.trim().eq_ignore_ascii_case("yes"))
                    .map(|(name, _)| name)
                    .collect::<Vec<_>>(),
                CatalogRow::Listed { symptoms, .. } => {
                    parse_symptom_list(&symptoms).map_err(|e| CatalogError::MalformedRow {
                        row: row_number,
                        condition: condition.clone(),
                        reason: e.to_string(),
                    })?
                }
            };

            if !builder.add(&condition, symptoms) {
                debug!(row = row_number, condition = %condition, "Skipping row without symptoms");
            }
        }

        let catalog = builder.build();
        info!(
            rows = row_count,
            conditions = catalog.len(),
            symptoms = catalog.vocabulary.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Attach a weight table. Symptom names in the table are normalized the
    /// same way as catalog tokens.
    pub fn with_weights(mut self, weights: WeightTable) -> Self {
        let weights = weights.normalized_with(&self.normalizer);
        for condition in weights.conditions() {
            if !self.index.contains_key(condition) {
                warn!(condition = %condition, "Weight table names a condition missing from the catalog");
            }
        }
        self.weights = weights;
        self
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up an entry by condition name (any casing/spacing).
    pub fn entry(&self, condition: &str) -> Option<&CatalogEntry> {
        self.index
            .get(&canonicalize(condition))
            .map(|&idx| &self.entries[idx])
    }

    /// Keys of all conditions associated with `symptom`, in catalog order.
    pub fn entries_for(&self, symptom: &str) -> Vec<&str> {
        let token = self.normalizer.normalize(symptom);
        self.entries
            .iter()
            .filter(|entry| entry.has_symptom(&token))
            .map(|entry| entry.key.as_str())
            .collect()
    }

    /// Weight of a (condition, symptom) pair; 1 when not listed.
    pub fn weight_of(&self, condition: &str, symptom: &str) -> u32 {
        self.weights
            .get(&canonicalize(condition), &self.normalizer.normalize(symptom))
    }

    /// The attached weight table.
    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// The normalizer shared by catalog tokens and queries.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Whether a canonical token appears in any entry.
    pub fn is_known_symptom(&self, token: &str) -> bool {
        self.vocabulary.contains(token)
    }

    /// All symptom tokens, sorted.
    pub fn known_symptoms(&self) -> Vec<&str> {
        self.vocabulary
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incremental catalog construction.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    normalizer: Normalizer,
}

impl CatalogBuilder {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            normalizer,
        }
    }

    /// Chaining form of [`add`](Self::add).
    pub fn condition<I, S>(mut self, condition: &str, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add(condition, symptoms);
        self
    }

    /// Merge `symptoms` into `condition`, creating it on first sight.
    ///
    /// Returns false (and adds nothing) if the condition name is blank or no
    /// symptom survives normalization.
    pub fn add<I, S>(&mut self, condition: &str, symptoms: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = canonicalize(condition);
        if key.is_empty() {
            return false;
        }

        let tokens: Vec<String> = symptoms
            .into_iter()
            .map(|s| self.normalizer.normalize(s.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return false;
        }

        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                self.entries
                    .push(CatalogEntry::new(condition.trim().to_string(), key.clone()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];
        for token in tokens {
            entry.add_symptom(token);
        }
        true
    }

    pub fn build(self) -> Catalog {
        let vocabulary = self
            .entries
            .iter()
            .flat_map(|entry| entry.symptoms.iter().cloned())
            .collect();

        Catalog {
            entries: self.entries,
            index: self.index,
            vocabulary,
            weights: WeightTable::new(),
            normalizer: self.normalizer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(condition: &str, columns: &[(&str, &str)]) -> CatalogRow {
        CatalogRow::Flags {
            condition: condition.into(),
            columns: columns
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn listed(condition: &str, symptoms: &str) -> CatalogRow {
        CatalogRow::Listed {
            condition: condition.into(),
            symptoms: symptoms.into(),
        }
    }

    #[test]
    fn test_load_flag_rows() {
        let catalog = Catalog::load(vec![
            flags(
                "Influenza",
                &[("Fever", "Yes"), ("Cough", "No"), ("Fatigue", "Yes"), ("Gender", "Female")],
            ),
            flags("Asthma", &[("Difficulty Breathing", "yes"), ("Cough", "Yes")]),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let flu = catalog.entry("influenza").unwrap();
        assert_eq!(flu.condition, "Influenza");
        assert_eq!(flu.symptoms, vec!["fever", "fatigue"]);
        assert_eq!(
            catalog.entry("ASTHMA").unwrap().symptoms,
            vec!["difficulty_breathing", "cough"]
        );
    }

    #[test]
    fn test_load_listed_rows() {
        let catalog = Catalog::load(vec![
            listed("Common Cold", "['runny nose', 'Sore Throat', 'cough']"),
            listed("Migraine", r#"["headache", "nausea"]"#),
        ])
        .unwrap();

        assert_eq!(
            catalog.entry("common cold").unwrap().symptoms,
            vec!["runny_nose", "sore_throat", "cough"]
        );
        assert_eq!(catalog.entries()[1].key, "migraine");
    }

    #[test]
    fn test_duplicate_conditions_merge() {
        let catalog = Catalog::load(vec![
            flags("Influenza", &[("Fever", "Yes")]),
            flags("Asthma", &[("Cough", "Yes")]),
            flags("influenza ", &[("Cough", "Yes"), ("Fever", "Yes")]),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        // First-seen position and display name are kept
        assert_eq!(catalog.entries()[0].condition, "Influenza");
        assert_eq!(catalog.entries()[0].symptoms, vec!["fever", "cough"]);
    }

    #[test]
    fn test_rows_without_symptoms_are_skipped() {
        let catalog = Catalog::load(vec![
            flags("Healthy", &[("Fever", "No"), ("Cough", "No")]),
            listed("Unknown", "[]"),
            flags("Influenza", &[("Fever", "Yes")]),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.entry("healthy").is_none());
        assert!(catalog.entries().iter().all(|e| !e.symptoms.is_empty()));
    }

    #[test]
    fn test_malformed_row_names_row() {
        let result = Catalog::load(vec![
            listed("Flu", "['fever']"),
            listed("Cold", "['cough'"),
        ]);

        match result {
            Err(CatalogError::MalformedRow { row, condition, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(condition, "Cold");
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_condition() {
        let result = Catalog::load(vec![flags("  ", &[("Fever", "Yes")])]);
        assert!(matches!(result, Err(CatalogError::MissingCondition { row: 1 })));
    }

    #[test]
    fn test_entries_for() {
        let catalog = Catalog::builder()
            .condition("Flu", ["fever", "cough"])
            .condition("Covid", ["fever"])
            .condition("Asthma", ["cough"])
            .build();

        assert_eq!(catalog.entries_for("Fever"), vec!["flu", "covid"]);
        assert_eq!(catalog.entries_for("cough"), vec!["flu", "asthma"]);
        assert!(catalog.entries_for("rash").is_empty());
        assert!(catalog.entries_for("").is_empty());
    }

    #[test]
    fn test_weight_of_default_and_explicit() {
        let mut weights = WeightTable::new();
        weights.insert("Flu", "Fever", 3).unwrap();

        let catalog = Catalog::builder()
            .condition("Flu", ["fever", "cough"])
            .build()
            .with_weights(weights);

        assert_eq!(catalog.weight_of("flu", "fever"), 3);
        assert_eq!(catalog.weight_of("FLU", "cough"), DEFAULT_WEIGHT);
        assert_eq!(catalog.weight_of("flu", "rash"), DEFAULT_WEIGHT);
    }

    #[test]
    fn test_aliases_apply_to_catalog_tokens() {
        let catalog = Catalog::builder()
            .condition("Flu", ["Tiredness", "High Temperature"])
            .build();

        assert_eq!(catalog.entry("flu").unwrap().symptoms, vec!["fatigue", "fever"]);
        assert_eq!(catalog.entries_for("tired"), vec!["flu"]);
    }

    #[test]
    fn test_known_symptoms() {
        let catalog = Catalog::builder()
            .condition("Flu", ["fever", "cough"])
            .condition("Covid", ["fever", "anosmia"])
            .build();

        assert_eq!(catalog.known_symptoms(), vec!["anosmia", "cough", "fever"]);
        assert!(catalog.is_known_symptom("cough"));
        assert!(!catalog.is_known_symptom("rash"));
    }
}
