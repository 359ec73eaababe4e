//! Symptom matcher.
//!
//! Pipeline: Extraction (text only) → Normalization → Scoring

mod normalizer;
mod scorer;

pub use normalizer::*;
pub use scorer::*;

use std::sync::Arc;

use symptom_match_nlp::{ExtractionError, SymptomExtractor};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::models::{RankedResult, SymptomQuery};

/// Matcher errors.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Symptom model not ready: {0}")]
    ModelNotReady(String),
}

pub type MatchResult<T> = Result<T, MatchError>;

impl From<ExtractionError> for MatchError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::ModelNotReady(reason) => MatchError::ModelNotReady(reason),
        }
    }
}

/// Entry point shared by every request.
///
/// Cheap to clone: the catalog is behind an `Arc` and the extractor is a
/// watch receiver.
#[derive(Debug, Clone)]
pub struct Matcher {
    catalog: Arc<Catalog>,
    scorer: Scorer,
    extractor: Option<SymptomExtractor>,
}

impl Matcher {
    /// Create a list-only matcher.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            scorer: Scorer::default(),
            extractor: None,
        }
    }

    /// Enable free-text matching.
    pub fn with_extractor(mut self, extractor: SymptomExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.scorer = Scorer::new(max_results);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn extractor(&self) -> Option<&SymptomExtractor> {
        self.extractor.as_ref()
    }

    /// Whether text queries can be answered without waiting.
    pub fn is_text_ready(&self) -> bool {
        self.extractor.as_ref().is_some_and(SymptomExtractor::is_ready)
    }

    /// Normalize raw tokens into a query using the catalog's normalizer.
    pub fn build_query<I, S>(&self, symptoms: I) -> SymptomQuery
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalizer = self.catalog.normalizer();
        let query = SymptomQuery::from_tokens(
            symptoms
                .into_iter()
                .map(|s| normalizer.normalize(s.as_ref())),
        );

        for token in query.tokens() {
            if !self.catalog.is_known_symptom(token) {
                debug!(symptom = %token, "Unknown symptom in query");
            }
        }
        query
    }

    /// Score an already normalized query.
    pub fn score(&self, query: &SymptomQuery) -> RankedResult {
        self.scorer.score(query, &self.catalog)
    }

    /// Rank conditions for an explicit symptom list.
    ///
    /// An empty list is rejected; a list of only unknown symptoms yields
    /// [`RankedResult::NoMatch`].
    pub fn match_by_symptom_list<S: AsRef<str>>(&self, symptoms: &[S]) -> MatchResult<RankedResult> {
        if symptoms.is_empty() {
            return Err(MatchError::InvalidQuery("symptom list is empty".into()));
        }
        let query = self.build_query(symptoms);
        Ok(self.score(&query))
    }

    /// Recognise symptoms in free text without scoring them.
    ///
    /// Waits for the model if it is still training.
    pub async fn extract_symptoms(&self, text: &str) -> MatchResult<SymptomQuery> {
        if text.trim().is_empty() {
            return Err(MatchError::InvalidQuery("text is empty".into()));
        }
        let extractor = self
            .extractor
            .as_ref()
            .ok_or_else(|| MatchError::ModelNotReady("text extraction is not configured".into()))?;

        let labels = extractor.extract_symptoms(text).await?;
        debug!(labels = ?labels, "Extracted symptoms");
        Ok(self.build_query(labels))
    }

    /// Rank conditions for a free-text description.
    pub async fn match_by_text(&self, text: &str) -> MatchResult<RankedResult> {
        let query = self.extract_symptoms(text).await?;
        Ok(self.score(&query))
    }
}
