//! Free-text symptom extraction.
//!
//! This crate turns sentences such as "my head is pounding" into symptom
//! labels (`headache`) using a small multinomial naive Bayes classifier
//! trained on a hand-authored phrase corpus.
//!
//! # Modules
//!
//! - [`corpus`]: the built-in training phrases and tokenizer stop words
//! - [`classifier`]: training, inference and on-disk persistence of the model
//! - [`extraction`]: async, readiness-gated extractor used by request handlers

pub mod classifier;
pub mod corpus;
pub mod extraction;

pub use classifier::*;
pub use corpus::*;
pub use extraction::*;
