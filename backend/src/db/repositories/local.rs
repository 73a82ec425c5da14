//! In-memory repository for local development and tests.
//!
//! Samples live in a per-user `BTreeMap` keyed by date, so a history is
//! always returned in chronological order and a second write for the same
//! day merges into the first. Results are kept as JSON text, which exercises
//! the same serialization path a durable store would use.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::db::repository::{
    ChangeKind, ErrorContext, RepositoryError, RepositoryResult, ResultSink, SampleChange,
    SampleSource, SampleStore,
};
use crate::models::{DailySample, RhythmResult, UserId};

const CHANGE_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct LocalData {
    samples: HashMap<UserId, BTreeMap<NaiveDate, DailySample>>,
    results: HashMap<UserId, String>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            samples: HashMap::new(),
            results: HashMap::new(),
            is_healthy: true,
        }
    }
}

/// Thread-safe in-memory store implementing every repository trait.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    changes: broadcast::Sender<SampleChange>,
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            changes,
        }
    }

    /// Simulate an outage. While unhealthy every operation except
    /// `health_check` fails with a retryable connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is unhealthy",
                ErrorContext::new(operation).with_details("health flag cleared"),
            ))
        }
    }

    fn notify(&self, change: SampleChange) {
        // No subscribers is fine; the send error only reports that.
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl SampleSource for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn load_samples(&self, user_id: UserId) -> RepositoryResult<Vec<DailySample>> {
        self.check_health("load_samples")?;
        let data = self.data.read();
        Ok(data
            .samples
            .get(&user_id)
            .map(|days| days.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn sample_count(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.check_health("sample_count")?;
        Ok(self
            .data
            .read()
            .samples
            .get(&user_id)
            .map_or(0, BTreeMap::len))
    }
}

#[async_trait]
impl SampleStore for LocalRepository {
    async fn upsert_sample(
        &self,
        user_id: UserId,
        sample: DailySample,
    ) -> RepositoryResult<SampleChange> {
        self.check_health("upsert_sample")?;
        if sample.is_empty() {
            return Err(RepositoryError::validation_with_context(
                format!("Sample for {} carries no indicator values", sample.date),
                ErrorContext::new("upsert_sample")
                    .with_entity("sample")
                    .with_entity_id(user_id),
            ));
        }

        let date = sample.date;
        {
            let mut data = self.data.write();
            let days = data.samples.entry(user_id).or_default();
            match days.get_mut(&date) {
                Some(existing) => existing.merge(sample),
                None => {
                    days.insert(date, sample);
                }
            }
        }

        let change = SampleChange {
            user_id,
            date: Some(date),
            kind: ChangeKind::Upserted,
        };
        self.notify(change.clone());
        Ok(change)
    }

    async fn clear_samples(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.check_health("clear_samples")?;
        let removed = self
            .data
            .write()
            .samples
            .remove(&user_id)
            .map_or(0, |days| days.len());

        if removed > 0 {
            self.notify(SampleChange {
                user_id,
                date: None,
                kind: ChangeKind::Cleared,
            });
        }
        Ok(removed)
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<SampleChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl ResultSink for LocalRepository {
    async fn store_result(&self, user_id: UserId, result: &RhythmResult) -> RepositoryResult<()> {
        self.check_health("store_result")?;
        let json = serde_json::to_string(result)
            .map_err(|e| RepositoryError::from(e).with_operation("store_result"))?;
        self.data.write().results.insert(user_id, json);
        Ok(())
    }

    async fn load_result(&self, user_id: UserId) -> RepositoryResult<Option<RhythmResult>> {
        self.check_health("load_result")?;
        let data = self.data.read();
        match data.results.get(&user_id) {
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| RepositoryError::from(e).with_operation("load_result")),
            None => Ok(None),
        }
    }

    async fn clear_result(&self, user_id: UserId) -> RepositoryResult<bool> {
        self.check_health("clear_result")?;
        Ok(self.data.write().results.remove(&user_id).is_some())
    }
}
