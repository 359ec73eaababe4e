//! Domain models for the symptom-match system.

mod catalog;
mod scoring;

pub use catalog::*;
pub use scoring::*;
