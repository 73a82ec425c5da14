//! Cadence-based recompute decisions.

use serde::{Deserialize, Serialize};

/// Why a recomputation is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeReason {
    /// Explicit user request; cadence is ignored.
    Forced,
    /// Nothing has been computed for this user yet.
    NoResult,
    /// At least one cadence worth of new samples arrived.
    CadenceReached,
    /// The history lost samples since the last computation.
    HistoryShrank,
}

/// Decides when a stored result should be refreshed.
///
/// A result is recomputed once the history has grown by `cadence` samples
/// since it was produced, so with a cadence of 5 a result computed at 10
/// samples is refreshed at 15, not at 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputePolicy {
    cadence: usize,
}

impl Default for RecomputePolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

impl RecomputePolicy {
    /// A zero cadence is treated as one (recompute on every new sample).
    pub fn new(cadence: usize) -> Self {
        Self {
            cadence: cadence.max(1),
        }
    }

    pub fn cadence(&self) -> usize {
        self.cadence
    }

    /// The reason a recomputation is due, or `None` to keep the current result.
    pub fn decide(
        &self,
        current_sample_count: usize,
        last_computed_sample_count: usize,
        has_existing_result: bool,
        forced: bool,
    ) -> Option<RecomputeReason> {
        if forced {
            Some(RecomputeReason::Forced)
        } else if !has_existing_result {
            Some(RecomputeReason::NoResult)
        } else if current_sample_count < last_computed_sample_count {
            Some(RecomputeReason::HistoryShrank)
        } else if current_sample_count - last_computed_sample_count >= self.cadence {
            Some(RecomputeReason::CadenceReached)
        } else {
            None
        }
    }

    pub fn should_recompute(
        &self,
        current_sample_count: usize,
        last_computed_sample_count: usize,
        has_existing_result: bool,
        forced: bool,
    ) -> bool {
        self.decide(
            current_sample_count,
            last_computed_sample_count,
            has_existing_result,
            forced,
        )
        .is_some()
    }
}
