//! Reference catalog models.

use serde::{Deserialize, Serialize};

/// A condition and the symptoms associated with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display name as first seen in the source data (e.g., "Common Cold")
    pub condition: String,
    /// Canonical lookup key (e.g., "common_cold")
    pub key: String,
    /// Canonical symptom tokens, unique, in first-seen order
    pub symptoms: Vec<String>,
}

impl CatalogEntry {
    /// Create an entry with no symptoms yet.
    pub fn new(condition: String, key: String) -> Self {
        Self {
            condition,
            key,
            symptoms: Vec::new(),
        }
    }

    /// Check whether a canonical token belongs to this condition.
    pub fn has_symptom(&self, token: &str) -> bool {
        self.symptoms.iter().any(|s| s == token)
    }

    /// Add a canonical token. Returns false if it was already present or empty.
    pub fn add_symptom(&mut self, token: String) -> bool {
        if token.is_empty() || self.has_symptom(&token) {
            return false;
        }
        self.symptoms.push(token);
        true
    }
}

/// One row handed over by a catalog source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CatalogRow {
    /// Condition plus `symptom → "yes"/"no"` columns. Values other than
    /// "yes" (including non-boolean profile columns) are ignored.
    Flags {
        condition: String,
        columns: Vec<(String, String)>,
    },
    /// Condition plus one field holding a serialized list of symptoms,
    /// e.g. `['fever', 'cough']`.
    Listed { condition: String, symptoms: String },
}

impl CatalogRow {
    /// Condition name as supplied by the source.
    pub fn condition(&self) -> &str {
        match self {
            CatalogRow::Flags { condition, .. } => condition,
            CatalogRow::Listed { condition, .. } => condition,
        }
    }
}
