//! Symptom token normalizer.
//!
//! Handles:
//! - Canonical form (lowercase, `_` separator): "Difficulty Breathing" → "difficulty_breathing"
//! - Synonym expansion (tiredness → fatigue, dizzy → dizziness)
//!
//! The catalog owns one `Normalizer` and applies it to its own tokens and to
//! every query, so both sides always agree on the encoding.

use std::collections::HashMap;

/// Separator between words of a canonical token.
pub const SEPARATOR: char = '_';

/// Canonical form of a raw token: lowercase, trimmed, with every run of
/// whitespace, `-` or `_` collapsed to a single `_`.
///
/// Idempotent; blank input yields an empty token.
pub fn canonicalize(token: &str) -> String {
    let lower = token.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == '-' || c == SEPARATOR)
        .filter(|w| !w.is_empty())
        .collect();
    words.join("_")
}

/// Normalizer for symptom tokens.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Alias map: canonical synonym → canonical symptom
    aliases: HashMap<String, String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a normalizer with the default synonym table.
    pub fn new() -> Self {
        let mut normalizer = Self::without_aliases();
        for (alias, canonical) in DEFAULT_ALIASES {
            normalizer.add_alias(alias, canonical);
        }
        normalizer
    }

    /// Create a normalizer that only canonicalizes.
    pub fn without_aliases() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Normalize a raw token to its canonical symptom.
    pub fn normalize(&self, token: &str) -> String {
        let canonical = canonicalize(token);
        self.aliases.get(&canonical).cloned().unwrap_or(canonical)
    }

    /// Add a synonym mapping.
    ///
    /// Chains are resolved on insert so no alias ever points at another alias,
    /// which keeps [`normalize`](Self::normalize) idempotent. A self-mapping
    /// or a mapping that would create a cycle is ignored.
    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        let alias = canonicalize(alias);
        let target = self.normalize(canonical);
        if alias.is_empty() || target.is_empty() || alias == target {
            return;
        }

        // Existing aliases that pointed at the new alias now point at its target.
        for existing in self.aliases.values_mut() {
            if *existing == alias {
                *existing = target.clone();
            }
        }
        self.aliases.insert(alias, target);
    }

    /// Number of registered synonyms.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

/// Default synonym table (alias, canonical).
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Fever
    ("high temperature", "fever"),
    ("pyrexia", "fever"),
    ("feverish", "fever"),
    // Fatigue
    ("tiredness", "fatigue"),
    ("tired", "fatigue"),
    ("exhaustion", "fatigue"),
    ("lethargy", "fatigue"),
    // Dizziness
    ("dizzy", "dizziness"),
    ("lightheadedness", "dizziness"),
    ("vertigo", "dizziness"),
    // Breathing
    ("shortness of breath", "difficulty_breathing"),
    ("breathlessness", "difficulty_breathing"),
    ("dyspnea", "difficulty_breathing"),
    ("trouble breathing", "difficulty_breathing"),
    // Head / throat / nose
    ("head ache", "headache"),
    ("migraine", "headache"),
    ("throat pain", "sore_throat"),
    ("pharyngitis", "sore_throat"),
    ("rhinorrhea", "runny_nose"),
    ("stuffy nose", "runny_nose"),
    // GI
    ("nauseous", "nausea"),
    ("queasiness", "nausea"),
    // Cough
    ("coughing", "cough"),
];
