//! Multinomial naive Bayes symptom classifier.
//!
//! Pipeline: tokenize → stop-word removal → plural stemming → per-label log
//! posterior → softmax, scaled by the share of input tokens the model knows.
//! Labels whose confidence exceeds the threshold fire, so one sentence can
//! yield several symptoms.
//!
//! A corpus may carry [`BACKGROUND_LABEL`] phrases. That label takes part in
//! the softmax so everyday text has somewhere to go, but it is never reported.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strsim::damerau_levenshtein;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::corpus::{TrainingExample, BACKGROUND_LABEL, STOP_WORDS};

/// Confidence a label must exceed to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Bumped whenever tokenization or scoring changes so cached models retrain.
pub const MODEL_VERSION: u32 = 2;

/// Additive (Lidstone) smoothing for token likelihoods.
const SMOOTHING: f64 = 0.05;

/// Shortest unknown token that may be matched to a vocabulary entry by similarity.
const FUZZY_MIN_LEN: usize = 5;

/// Largest edit distance (insert, delete, substitute, transpose) the typo
/// fallback accepts.
const FUZZY_MAX_EDITS: usize = 1;

/// Classifier errors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Training phrase {phrase:?} has no label")]
    EmptyLabel { phrase: String },

    #[error("Training phrase {phrase:?} for label {label:?} contains only stop words")]
    NoTokens { phrase: String, label: String },

    #[error("Model file error: {0}")]
    Io(#[from] io::Error),

    #[error("Model serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model file is inconsistent: {reason}")]
    CorruptModel { reason: String },
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// A label scored against one input text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// Symptom label
    pub label: String,
    /// Posterior confidence (0.0 - 1.0)
    pub confidence: f64,
}

/// Trained classifier state. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomClassifier {
    version: u32,
    /// Labels in first-seen corpus order
    labels: Vec<String>,
    /// Index of the background label, if the corpus had one
    #[serde(default)]
    background: Option<usize>,
    /// Token → column index
    vocab: BTreeMap<String, usize>,
    /// log P(label)
    log_prior: Vec<f64>,
    /// log P(token | label), flattened [labels.len() * vocab.len()]
    log_likelihood: Vec<f64>,
    /// SHA-256 of the training corpus
    corpus_digest: String,
    /// RFC 3339 training timestamp
    trained_at: String,
}

impl SymptomClassifier {
    /// Train a model from labelled phrases.
    pub fn train(examples: &[TrainingExample]) -> ClassifierResult<Self> {
        if examples.is_empty() {
            return Err(ClassifierError::EmptyCorpus);
        }

        let mut labels: Vec<String> = Vec::new();
        let mut vocab: BTreeMap<String, usize> = BTreeMap::new();
        let mut documents: Vec<(usize, Vec<String>)> = Vec::with_capacity(examples.len());

        for example in examples {
            let label = example.label.trim();
            if label.is_empty() {
                return Err(ClassifierError::EmptyLabel {
                    phrase: example.phrase.clone(),
                });
            }

            let tokens = tokenize(&example.phrase);
            if tokens.is_empty() {
                return Err(ClassifierError::NoTokens {
                    phrase: example.phrase.clone(),
                    label: label.to_string(),
                });
            }

            let label_idx = match labels.iter().position(|l| l == label) {
                Some(idx) => idx,
                None => {
                    labels.push(label.to_string());
                    labels.len() - 1
                }
            };

            for tok in &tokens {
                let next = vocab.len();
                vocab.entry(tok.clone()).or_insert(next);
            }
            documents.push((label_idx, tokens));
        }

        let num_labels = labels.len();
        let vocab_size = vocab.len();

        let mut doc_counts = vec![0u32; num_labels];
        let mut token_counts = vec![0u32; num_labels * vocab_size];
        let mut token_totals = vec![0u32; num_labels];

        for (label_idx, tokens) in &documents {
            doc_counts[*label_idx] += 1;
            for tok in tokens {
                if let Some(&col) = vocab.get(tok) {
                    token_counts[label_idx * vocab_size + col] += 1;
                    token_totals[*label_idx] += 1;
                }
            }
        }

        let total_docs = documents.len() as f64;
        let log_prior = doc_counts
            .iter()
            .map(|&count| (count as f64 / total_docs).ln())
            .collect();

        let mut log_likelihood = vec![0f64; num_labels * vocab_size];
        for label_idx in 0..num_labels {
            let denom = token_totals[label_idx] as f64 + SMOOTHING * vocab_size as f64;
            for col in 0..vocab_size {
                let count = token_counts[label_idx * vocab_size + col] as f64;
                log_likelihood[label_idx * vocab_size + col] = ((count + SMOOTHING) / denom).ln();
            }
        }

        debug!(
            labels = num_labels,
            vocabulary = vocab_size,
            phrases = documents.len(),
            "Symptom classifier trained"
        );

        let background = labels.iter().position(|l| l == BACKGROUND_LABEL);

        Ok(Self {
            version: MODEL_VERSION,
            labels,
            background,
            vocab,
            log_prior,
            log_likelihood,
            corpus_digest: corpus_digest(examples),
            trained_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Score `text` against every symptom label.
    ///
    /// Returns all symptom labels ordered by confidence (highest first), or an
    /// empty vector when no token of the input is known to the model. The
    /// posterior is multiplied by the fraction of input tokens that matched
    /// the vocabulary, so confidences sum to at most 1.
    pub fn classify(&self, text: &str) -> Vec<Classification> {
        let tokens = tokenize(text);
        let columns = self.known_columns(&tokens);
        if columns.is_empty() {
            return Vec::new();
        }
        let coverage = columns.len() as f64 / tokens.len() as f64;

        let vocab_size = self.vocab.len();
        let log_scores: Vec<f64> = (0..self.labels.len())
            .map(|label_idx| {
                self.log_prior[label_idx]
                    + columns
                        .iter()
                        .map(|&col| self.log_likelihood[label_idx * vocab_size + col])
                        .sum::<f64>()
            })
            .collect();

        // Softmax with max subtraction.
        let max = log_scores
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = log_scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();

        let mut scored: Vec<Classification> = self
            .labels
            .iter()
            .zip(exp)
            .enumerate()
            .filter(|(label_idx, _)| Some(*label_idx) != self.background)
            .map(|(_, (label, e))| Classification {
                label: label.clone(),
                confidence: e / sum * coverage,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    /// Labels whose confidence is strictly greater than `threshold`.
    pub fn classify_above(&self, text: &str, threshold: f64) -> Vec<Classification> {
        self.classify(text)
            .into_iter()
            .filter(|c| c.confidence > threshold)
            .collect()
    }

    /// Map tokens to vocabulary columns, with an edit-distance fallback for typos.
    fn known_columns(&self, tokens: &[String]) -> Vec<usize> {
        tokens
            .iter()
            .filter_map(|tok| {
                if let Some(&col) = self.vocab.get(tok) {
                    return Some(col);
                }
                if tok.chars().count() < FUZZY_MIN_LEN {
                    return None;
                }
                self.closest_token(tok).map(|(known, col)| {
                    debug!(token = %tok, matched = %known, "Fuzzy vocabulary match");
                    col
                })
            })
            .collect()
    }

    /// Nearest vocabulary token within [`FUZZY_MAX_EDITS`]. Ties go to the
    /// alphabetically first token.
    fn closest_token(&self, token: &str) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize, usize)> = None;
        for (known, &col) in &self.vocab {
            let distance = damerau_levenshtein(token, known);
            if distance > FUZZY_MAX_EDITS {
                continue;
            }
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((known.as_str(), col, distance));
            }
        }
        best.map(|(known, col, _)| (known, col))
    }

    /// Reportable labels in corpus order. The background label is left out.
    pub fn labels(&self) -> Vec<&str> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != self.background)
            .map(|(_, label)| label.as_str())
            .collect()
    }

    /// Number of distinct vocabulary tokens.
    pub fn vocabulary_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn corpus_digest(&self) -> &str {
        &self.corpus_digest
    }

    pub fn trained_at(&self) -> &str {
        &self.trained_at
    }

    /// Whether this model was produced from `examples` by the current algorithm.
    pub fn is_trained_on(&self, examples: &[TrainingExample]) -> bool {
        self.version == MODEL_VERSION && self.corpus_digest == corpus_digest(examples)
    }

    /// Write the model as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> ClassifierResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a model previously written by [`save`](Self::save).
    ///
    /// Table shapes are checked so a damaged file is rejected here instead of
    /// failing at classification time.
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        let json = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> ClassifierResult<()> {
        let corrupt = |reason: String| Err(ClassifierError::CorruptModel { reason });

        let num_labels = self.labels.len();
        let vocab_size = self.vocab.len();
        if num_labels == 0 {
            return corrupt("no labels".into());
        }
        if self.log_prior.len() != num_labels {
            return corrupt(format!(
                "{} priors for {} labels",
                self.log_prior.len(),
                num_labels
            ));
        }
        if self.log_likelihood.len() != num_labels * vocab_size {
            return corrupt(format!(
                "{} likelihoods for {} labels x {} tokens",
                self.log_likelihood.len(),
                num_labels,
                vocab_size
            ));
        }
        if let Some((token, col)) = self.vocab.iter().find(|&(_, &col)| col >= vocab_size) {
            return corrupt(format!("token {:?} has column {} of {}", token, col, vocab_size));
        }
        if let Some(idx) = self.background.filter(|&idx| idx >= num_labels) {
            return corrupt(format!("background index {} of {} labels", idx, num_labels));
        }
        Ok(())
    }

    /// Reuse the cached model at `cache` if it matches `examples`, otherwise
    /// train and refresh the cache. Cache write failures only warn.
    pub fn load_or_train(cache: &Path, examples: &[TrainingExample]) -> ClassifierResult<Self> {
        match Self::load(cache) {
            Ok(model) if model.is_trained_on(examples) => {
                info!(path = %cache.display(), trained_at = %model.trained_at, "Loaded cached symptom model");
                return Ok(model);
            }
            Ok(_) => info!(path = %cache.display(), "Cached symptom model is stale, retraining"),
            Err(ClassifierError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %cache.display(), "No cached symptom model")
            }
            Err(e) => warn!(path = %cache.display(), error = %e, "Ignoring unreadable symptom model cache"),
        }

        let model = Self::train(examples)?;
        if let Err(e) = model.save(cache) {
            warn!(path = %cache.display(), error = %e, "Failed to write symptom model cache");
        }
        Ok(model)
    }
}

/// SHA-256 over the corpus in order, hex encoded.
pub fn corpus_digest(examples: &[TrainingExample]) -> String {
    let mut hasher = Sha256::new();
    for example in examples {
        hasher.update(example.phrase.as_bytes());
        hasher.update(b"\t");
        hasher.update(example.label.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Split text into lowercase, stemmed content tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !stop.contains(w))
        .map(stem)
        .collect()
}

/// Strip a plural `-s`.
fn stem(word: &str) -> String {
    let len = word.chars().count();
    if len > 3 && !word.ends_with("ss") && !word.ends_with("us") {
        if let Some(root) = word.strip_suffix('s') {
            return root.to_string();
        }
    }
    word.to_string()
}
