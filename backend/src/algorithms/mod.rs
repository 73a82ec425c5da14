//! Period detection.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. [`extractor`] turns a sample history into one numeric series per indicator.
//! 2. [`scorer`] rates how well a candidate period explains a series.
//! 3. [`search`] sweeps the configured candidate range and keeps the best fit.
//! 4. [`analyzer`] runs the above for every indicator and assembles a result.

pub mod analyzer;
pub mod extractor;
pub mod scorer;
pub mod search;


pub use analyzer::RhythmAnalyzer;
pub use extractor::extract;
pub use scorer::{score, score_breakdown};
pub use search::{best_candidate, search, PeriodFit, SearchParams};
