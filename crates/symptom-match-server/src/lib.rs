//! Symptom-Match HTTP service.
//!
//! Wires a CSV catalog, an optional weight table and the background-trained
//! text extractor into a [`Matcher`](symptom_match_core::Matcher), and serves
//! it over axum.
//!
//! # Modules
//!
//! - [`config`]: JSON configuration file with defaults
//! - [`csv_source`]: CSV catalog reader
//! - [`routes`]: axum router and handlers
//! - [`error`]: API error responses

pub mod config;
pub mod csv_source;
pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use symptom_match_core::{Catalog, Matcher, WeightTable};
use symptom_match_nlp::{default_corpus, SymptomExtractor};
use tracing::info;

pub use config::{CatalogFormat, Config};
pub use routes::{router, AppState};

/// Load the catalog and weights described by `config`.
pub fn load_catalog(config: &Config) -> Result<Catalog> {
    let rows = csv_source::read_catalog_rows(&config.catalog_path, &config.catalog_layout())
        .with_context(|| format!("Failed to read catalog {}", config.catalog_path.display()))?;
    let mut catalog = Catalog::load(rows)
        .with_context(|| format!("Invalid catalog {}", config.catalog_path.display()))?;

    if let Some(path) = &config.weights_path {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read weight table {}", path.display()))?;
        let weights = WeightTable::from_json_str(&json)
            .with_context(|| format!("Invalid weight table {}", path.display()))?;
        info!(weights = weights.len(), "Weight table loaded");
        catalog = catalog.with_weights(weights);
    }

    Ok(catalog)
}

/// Build the matcher and start model training in the background.
///
/// Must be called inside a Tokio runtime.
pub fn build_matcher(config: &Config, catalog: Catalog) -> Matcher {
    let extractor = match &config.model_cache_path {
        Some(cache) => SymptomExtractor::load_or_train_in_background(
            cache.clone(),
            default_corpus(),
            config.confidence_threshold,
        ),
        None => SymptomExtractor::train_in_background(default_corpus(), config.confidence_threshold),
    };

    Matcher::new(Arc::new(catalog))
        .with_max_results(config.max_results)
        .with_extractor(extractor)
}
