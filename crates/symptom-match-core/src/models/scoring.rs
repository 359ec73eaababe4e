//! Query and ranking models for the scoring engine.

use serde::{Deserialize, Serialize};

/// Canonical symptom tokens for one request: unique, non-empty, in the order
/// they were supplied.
///
/// Serialized as a plain list. Deserializing goes through
/// [`from_tokens`](Self::from_tokens), so the same rules hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymptomQuery {
    tokens: Vec<String>,
}

impl SymptomQuery {
    /// Build from already-canonical tokens, dropping empties and duplicates.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = Self::default();
        for token in tokens {
            query.insert(token.into());
        }
        query
    }

    fn insert(&mut self, token: String) {
        if !token.is_empty() && !self.contains(&token) {
            self.tokens.push(token);
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<String>> for SymptomQuery {
    fn from(tokens: Vec<String>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<SymptomQuery> for Vec<String> {
    fn from(query: SymptomQuery) -> Self {
        query.tokens
    }
}

/// A condition with its accumulated weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Condition display name
    pub condition: String,
    /// Sum of matched symptom weights (always > 0 in a ranking)
    pub score: u32,
}

/// Outcome of scoring a query.
///
/// `NoMatch` is a normal result, kept apart from `Ranked` so callers never
/// infer "nothing matched" from a list length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RankedResult {
    /// Best-first candidates; never empty
    Ranked(Vec<ScoreEntry>),
    /// No condition scored above zero
    NoMatch,
}

impl RankedResult {
    /// Wrap ranked entries, mapping an empty ranking to `NoMatch`.
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        if entries.is_empty() {
            RankedResult::NoMatch
        } else {
            RankedResult::Ranked(entries)
        }
    }

    /// Ranked entries, or an empty slice for `NoMatch`.
    pub fn entries(&self) -> &[ScoreEntry] {
        match self {
            RankedResult::Ranked(entries) => entries,
            RankedResult::NoMatch => &[],
        }
    }

    /// Best candidate, if any.
    pub fn top(&self) -> Option<&ScoreEntry> {
        self.entries().first()
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, RankedResult::NoMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_dedupes_and_keeps_order() {
        let query = SymptomQuery::from_tokens(["fever", "cough", "fever", "", "fatigue"]);
        assert_eq!(query.tokens(), ["fever", "cough", "fatigue"]);
        assert_eq!(query.len(), 3);
        assert!(query.contains("cough"));
    }

    #[test]
    fn test_empty_query() {
        let query = SymptomQuery::from_tokens(Vec::<String>::new());
        assert!(query.is_empty());
    }

    #[test]
    fn test_query_serializes_as_list() {
        let query = SymptomQuery::from_tokens(["headache", "fever"]);
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"["headache","fever"]"#);
    }

    #[test]
    fn test_deserialized_query_is_deduped() {
        let query: SymptomQuery = serde_json::from_str(r#"["fever","fever",""]"#).unwrap();
        assert_eq!(query.tokens(), ["fever"]);

        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"["fever"]"#);
        assert_eq!(serde_json::from_str::<SymptomQuery>(&json).unwrap(), query);
    }

    #[test]
    fn test_empty_ranking_is_no_match() {
        let result = RankedResult::from_entries(vec![]);
        assert!(result.is_no_match());
        assert!(result.entries().is_empty());
        assert!(result.top().is_none());
    }

    #[test]
    fn test_single_entry_is_not_no_match() {
        let result = RankedResult::from_entries(vec![ScoreEntry {
            condition: "Flu".into(),
            score: 1,
        }]);
        assert!(!result.is_no_match());
        assert_eq!(result.top().map(|e| e.score), Some(1));
        assert_ne!(result, RankedResult::NoMatch);
    }
}
