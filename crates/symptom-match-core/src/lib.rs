//! Symptom-Match Core Library
//!
//! Ranks candidate conditions from reported symptoms using a weighted
//! reference catalog.
//!
//! # Architecture
//!
//! ```text
//!   symptom list                    free text
//!        │                              │
//!        │                   Intent extraction (nlp)
//!        │                              │
//!        └──────────────┬───────────────┘
//!                       ▼
//!                 Normalization
//!          (canonical form + synonyms)
//!                       │
//!         ┌─────────────▼─────────────┐
//!         │      Weighted scoring     │
//!         │  Σ weight(cond, symptom)  │
//!         │  stable sort, top three   │
//!         └─────────────┬─────────────┘
//!                       │
//!              Ranked  or  NoMatch
//! ```
//!
//! The [`Catalog`] is built once from source rows and shared immutably; the
//! [`Matcher`] borrows it through an `Arc` for every request.
//!
//! # Modules
//!
//! - [`catalog`]: catalog construction, list-field parsing and weight tables
//! - [`models`]: domain types (CatalogEntry, SymptomQuery, RankedResult, etc.)
//! - [`resolver`]: normalizer, scorer and the [`Matcher`] facade

pub mod catalog;
pub mod models;
pub mod resolver;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogBuilder, CatalogError, WeightTable};
pub use models::{CatalogEntry, CatalogRow, RankedResult, ScoreEntry, SymptomQuery};
pub use resolver::{canonicalize, MatchError, Matcher, Normalizer, Scorer};
