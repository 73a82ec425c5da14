//! Data Transfer Objects for the HTTP API.
//!
//! Samples and results already derive Serialize/Deserialize and are embedded
//! as-is; these types only add the envelope around them.

use serde::{Deserialize, Serialize};

use crate::models::{DailySample, Indicator, RhythmResult, UserId};
use crate::services::{RecomputeReason, RefreshOutcome, RhythmStatus};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Sample store status
    pub database: String,
}

/// Request body for recording samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSamplesRequest {
    /// Days to insert; a day already on record has its values replaced
    /// indicator by indicator.
    pub samples: Vec<DailySample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSamplesResponse {
    pub user_id: UserId,
    /// Number of samples written
    pub accepted: usize,
    /// Days on record after the write
    pub total_samples: usize,
}

/// A user's recorded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleListResponse {
    pub user_id: UserId,
    pub samples: Vec<DailySample>,
    pub total: usize,
}

/// Stored rhythm result and how it relates to the current history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmResponse {
    pub user_id: UserId,
    /// Absent until a first analysis has run
    pub result: Option<RhythmResult>,
    /// Indicator with the most confident estimate, if any
    pub strongest: Option<Indicator>,
    pub sample_count: usize,
    pub last_computed_sample_count: usize,
    /// The result was computed from a different set of samples
    pub stale: bool,
}

impl RhythmResponse {
    pub fn from_status(user_id: UserId, status: RhythmStatus) -> Self {
        Self {
            user_id,
            strongest: status
                .result
                .as_ref()
                .and_then(|r| r.strongest())
                .map(|e| e.indicator),
            result: status.result.map(|r| r.as_ref().clone()),
            sample_count: status.sample_count,
            last_computed_sample_count: status.last_computed_sample_count,
            stale: status.stale,
        }
    }
}

/// Result of an explicit recalculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalculateResponse {
    pub user_id: UserId,
    /// `computed`, `skipped` or `discarded`
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RecomputeReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RhythmResult>,
}

impl RecalculateResponse {
    pub fn from_outcome(user_id: UserId, outcome: RefreshOutcome) -> Self {
        let (label, reason, result) = match outcome {
            RefreshOutcome::Computed { reason, result } => {
                ("computed", Some(reason), Some(result.as_ref().clone()))
            }
            RefreshOutcome::Skipped { .. } => ("skipped", None, None),
            RefreshOutcome::Discarded => ("discarded", None, None),
        };
        Self {
            user_id,
            outcome: label.to_string(),
            reason,
            result,
        }
    }
}

/// Response for deleting a user's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub user_id: UserId,
    pub samples_removed: usize,
}
