//! Readiness-gated symptom extraction.
//!
//! The classifier is trained once at startup. Until that finishes, callers of
//! [`SymptomExtractor::extract_symptoms`] wait; if training fails every call
//! returns [`ExtractionError::ModelNotReady`].

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

use crate::classifier::{Classification, SymptomClassifier};
use crate::corpus::TrainingExample;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Symptom model not ready: {0}")]
    ModelNotReady(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Lifecycle of the shared model.
#[derive(Debug, Clone)]
pub enum ModelState {
    Training,
    Ready(Arc<SymptomClassifier>),
    Failed(String),
}

impl ModelState {
    fn is_settled(&self) -> bool {
        !matches!(self, ModelState::Training)
    }
}

/// Publishes the outcome of training to every extractor clone.
#[derive(Debug)]
pub struct TrainingHandle {
    tx: watch::Sender<ModelState>,
}

impl TrainingHandle {
    /// Mark the model as ready.
    pub fn complete(self, classifier: SymptomClassifier) {
        self.tx.send_replace(ModelState::Ready(Arc::new(classifier)));
    }

    /// Mark training as failed; text extraction stays unavailable.
    pub fn fail(self, reason: impl Into<String>) {
        self.tx.send_replace(ModelState::Failed(reason.into()));
    }
}

/// Cheaply cloneable front end over the shared classifier.
#[derive(Debug, Clone)]
pub struct SymptomExtractor {
    state: watch::Receiver<ModelState>,
    threshold: f64,
}

impl SymptomExtractor {
    /// Extractor over an already trained model.
    pub fn from_classifier(classifier: SymptomClassifier, threshold: f64) -> Self {
        let (_tx, state) = watch::channel(ModelState::Ready(Arc::new(classifier)));
        Self { state, threshold }
    }

    /// Extractor whose model will be delivered through the returned handle.
    pub fn pending(threshold: f64) -> (TrainingHandle, Self) {
        let (tx, state) = watch::channel(ModelState::Training);
        (TrainingHandle { tx }, Self { state, threshold })
    }

    /// Train on a blocking worker. Must be called inside a Tokio runtime.
    pub fn train_in_background(examples: Vec<TrainingExample>, threshold: f64) -> Self {
        Self::spawn_training(None, examples, threshold)
    }

    /// Like [`train_in_background`](Self::train_in_background), but reuse or
    /// refresh a cached model at `cache`.
    pub fn load_or_train_in_background(
        cache: PathBuf,
        examples: Vec<TrainingExample>,
        threshold: f64,
    ) -> Self {
        Self::spawn_training(Some(cache), examples, threshold)
    }

    fn spawn_training(
        cache: Option<PathBuf>,
        examples: Vec<TrainingExample>,
        threshold: f64,
    ) -> Self {
        let (handle, extractor) = Self::pending(threshold);

        tokio::task::spawn_blocking(move || {
            let result = match &cache {
                Some(path) => SymptomClassifier::load_or_train(path, &examples),
                None => SymptomClassifier::train(&examples),
            };
            match result {
                Ok(classifier) => {
                    info!(
                        labels = classifier.labels().len(),
                        vocabulary = classifier.vocabulary_size(),
                        "Symptom model ready"
                    );
                    handle.complete(classifier);
                }
                Err(e) => {
                    error!(error = %e, "Symptom model training failed");
                    handle.fail(e.to_string());
                }
            }
        });

        extractor
    }

    /// Confidence threshold applied by this extractor.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Non-blocking readiness poll.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ModelState::Ready(_))
    }

    /// Wait until training has settled and return the model.
    pub async fn wait_ready(&self) -> ExtractionResult<Arc<SymptomClassifier>> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(ModelState::is_settled)
            .await
            .map_err(|_| {
                ExtractionError::ModelNotReady("training ended without producing a model".into())
            })?;

        match &*settled {
            ModelState::Ready(classifier) => Ok(Arc::clone(classifier)),
            ModelState::Failed(reason) => Err(ExtractionError::ModelNotReady(reason.clone())),
            ModelState::Training => Err(ExtractionError::ModelNotReady("still training".into())),
        }
    }

    /// Labels above the threshold, highest confidence first.
    pub async fn classify(&self, text: &str) -> ExtractionResult<Vec<Classification>> {
        let classifier = self.wait_ready().await?;
        Ok(classifier.classify_above(text, self.threshold))
    }

    /// Distinct symptom labels recognised in `text`. Empty when nothing fires.
    pub async fn extract_symptoms(&self, text: &str) -> ExtractionResult<Vec<String>> {
        let mut labels: Vec<String> = Vec::new();
        for classification in self.classify(text).await? {
            if !labels.contains(&classification.label) {
                labels.push(classification.label);
            }
        }
        Ok(labels)
    }
}
