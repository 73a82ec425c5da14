//! Sweep of candidate periods.

use serde::{Deserialize, Serialize};

use super::scorer;
use crate::config::RhythmConfig;
use crate::models::ScoreBreakdown;

/// Sweep bounds and acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub min_period: f64,
    pub max_period: f64,
    pub step: f64,
    pub confidence_floor: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from(&RhythmConfig::default())
    }
}

impl From<&RhythmConfig> for SearchParams {
    fn from(config: &RhythmConfig) -> Self {
        Self {
            min_period: config.min_period,
            max_period: config.max_period,
            step: config.step,
            confidence_floor: config.confidence_floor,
        }
    }
}

impl SearchParams {
    /// Number of candidates in `[min_period, max_period]` at `step` resolution.
    /// Zero when the range is empty or the step is unusable.
    pub fn candidate_count(&self) -> usize {
        if !(self.step.is_finite() && self.step > 0.0)
            || !self.min_period.is_finite()
            || !self.max_period.is_finite()
            || self.min_period > self.max_period
        {
            return 0;
        }
        // The small slack keeps `max_period` itself in range when
        // (max - min) / step lands a hair below an integer.
        ((self.max_period - self.min_period) / self.step + 1e-9).floor() as usize + 1
    }

    /// Candidate periods in ascending order, `min_period + k * step`.
    pub fn candidates(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.candidate_count()).map(move |k| self.min_period + k as f64 * self.step)
    }
}

/// Winning candidate of a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFit {
    pub period: f64,
    pub confidence: f64,
    pub breakdown: ScoreBreakdown,
}

/// Best-scoring candidate regardless of the confidence floor.
///
/// Ties keep the earliest, i.e. smallest, candidate. `None` only when the
/// parameters describe no candidates at all.
pub fn best_candidate(series: &[f64], params: &SearchParams) -> Option<PeriodFit> {
    let mut best: Option<PeriodFit> = None;
    for period in params.candidates() {
        let breakdown = scorer::score_breakdown(series, period);
        let confidence = scorer::composite(&breakdown);
        if best.map_or(true, |b| confidence > b.confidence) {
            best = Some(PeriodFit {
                period,
                confidence,
                breakdown,
            });
        }
    }
    best
}

/// Best candidate if it clears the confidence floor.
///
/// A best score strictly below the floor means "undetermined": no fallback
/// period is ever substituted. A zero score carries no evidence of a cycle
/// and is rejected even with a zero floor.
pub fn search(series: &[f64], params: &SearchParams) -> Option<PeriodFit> {
    best_candidate(series, params)
        .filter(|fit| fit.confidence > 0.0 && fit.confidence >= params.confidence_floor)
}
