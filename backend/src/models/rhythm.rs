use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::indicator::Indicator;

/// The three sub-scores behind a composite confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub autocorrelation: f64,
    pub consistency: f64,
    pub amplitude_stability: f64,
}

/// Detected period for one indicator.
///
/// Created fresh by every analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEstimate {
    pub indicator: Indicator,
    /// Cycle length. With gaps in the history this counts available samples,
    /// not strictly calendar days.
    pub period_days: qtty::Days,
    /// Composite score in [0, 1].
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
    pub sample_count_used: usize,
    pub computed_at: DateTime<Utc>,
}

/// Outcome of one analysis across all indicators.
///
/// Indicators without a detectable period have no entry in `estimates`; they
/// are never filled with a default period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmResult {
    #[serde(default)]
    pub estimates: BTreeMap<Indicator, PeriodEstimate>,
    pub total_data_points: usize,
    pub analysis_date: DateTime<Utc>,
    /// SHA-256 of the analyzed samples, see [`crate::models::fingerprint_samples`].
    pub source_fingerprint: String,
}

impl RhythmResult {
    /// A result carrying no estimates.
    pub fn empty(
        total_data_points: usize,
        analysis_date: DateTime<Utc>,
        source_fingerprint: String,
    ) -> Self {
        Self {
            estimates: BTreeMap::new(),
            total_data_points,
            analysis_date,
            source_fingerprint,
        }
    }

    pub fn estimate(&self, indicator: Indicator) -> Option<&PeriodEstimate> {
        self.estimates.get(&indicator)
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Estimate with the highest confidence; the first indicator wins ties.
    pub fn strongest(&self) -> Option<&PeriodEstimate> {
        self.estimates.values().fold(None, |best, e| match best {
            Some(b) if b.confidence >= e.confidence => Some(b),
            _ => Some(e),
        })
    }
}
