//! Repository traits for sample histories and stored rhythm results.
//!
//! The engine reads samples through [`SampleSource`] and writes results
//! through [`ResultSink`]. Writers of samples additionally implement
//! [`SampleStore`], which announces every change on a broadcast channel so a
//! debouncer can schedule recomputation.

pub mod error;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::models::{DailySample, RhythmResult, UserId};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// What happened to a user's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A day was added or its values replaced.
    Upserted,
    /// The whole history was removed.
    Cleared,
}

/// Notification emitted after a sample write commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChange {
    pub user_id: UserId,
    /// Day touched by an upsert; `None` for a clear.
    pub date: Option<NaiveDate>,
    pub kind: ChangeKind,
}

/// Read access to per-user sample histories.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Load the full history for a user, ordered by date.
    ///
    /// An unknown user has an empty history; this is not an error.
    async fn load_samples(&self, user_id: UserId) -> RepositoryResult<Vec<DailySample>>;

    /// Number of days recorded for a user.
    async fn sample_count(&self, user_id: UserId) -> RepositoryResult<usize>;
}

/// Write access to sample histories.
#[async_trait]
pub trait SampleStore: SampleSource {
    /// Insert a day or merge its values into the existing record for that date.
    ///
    /// # Returns
    /// * `Ok(SampleChange)` - The change that was broadcast to subscribers
    /// * `Err(RepositoryError)` - If the sample carries no values
    async fn upsert_sample(
        &self,
        user_id: UserId,
        sample: DailySample,
    ) -> RepositoryResult<SampleChange>;

    /// Remove a user's whole history.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of days removed
    async fn clear_samples(&self, user_id: UserId) -> RepositoryResult<usize>;

    /// Subscribe to change notifications for every user.
    fn subscribe_changes(&self) -> broadcast::Receiver<SampleChange>;
}

/// Destination for computed results.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist the latest result for a user, replacing any previous one.
    async fn store_result(&self, user_id: UserId, result: &RhythmResult) -> RepositoryResult<()>;

    /// Load the last persisted result, if any.
    async fn load_result(&self, user_id: UserId) -> RepositoryResult<Option<RhythmResult>>;

    /// Forget the persisted result. Returns whether one existed.
    async fn clear_result(&self, user_id: UserId) -> RepositoryResult<bool>;
}

/// A store providing both sample histories and result persistence.
pub trait FullRepository: SampleStore + ResultSink {}

impl<T> FullRepository for T where T: SampleStore + ResultSink {}
