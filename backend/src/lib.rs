//! # Rhythm Engine
//!
//! Detects personal cycles in self-reported daily wellness data.
//!
//! Given a user's history of daily samples, the engine estimates for each
//! indicator (physical, mental, emotional, sleep, appetite) the period after
//! which the pattern repeats, together with a confidence in `[0, 1]`.
//! Indicators without a convincing cycle are reported as absent.
//!
//! ## Architecture
//!
//! - [`models`]: samples, indicators, estimates and results
//! - [`algorithms`]: extraction, scoring, candidate sweep and the analyzer
//! - [`services`]: recompute policy, per-user orchestration, change debouncing
//! - [`db`]: repository traits and the in-memory store
//! - [`config`]: engine options from TOML and the environment
//! - [`http`]: Axum-based HTTP server (feature `http-server`)
//!
//! ## Example
//!
//! ```
//! use rhythm_engine::algorithms::RhythmAnalyzer;
//! use rhythm_engine::models::{DailySample, Indicator};
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let samples: Vec<_> = (0..40)
//!     .map(|d| {
//!         let value = if d % 10 < 5 { 80 } else { 30 };
//!         DailySample::new(start + Duration::days(d)).with_value(Indicator::Sleep, value)
//!     })
//!     .collect();
//!
//! let result = RhythmAnalyzer::default().analyze(&samples);
//! let sleep = result.estimate(Indicator::Sleep).unwrap();
//! assert!((sleep.period_days.value() - 10.0).abs() <= 0.5);
//! ```

// RepositoryError carries its ErrorContext inline.
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
