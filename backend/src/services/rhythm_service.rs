//! Per-user orchestration of rhythm analysis.
//!
//! Each user gets a slot holding the latest result, the sample count it was
//! computed from, a generation counter and a `watch` channel that observers
//! subscribe to. Refreshes for the same user are serialized by the slot's
//! async mutex; the sweep itself runs on the blocking pool.
//!
//! Read-only lookups never create a slot. A slot with no result, no
//! subscribers and no task holding it is dropped after a refresh or reset,
//! and swept when the table grows.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::ServiceResult;
use super::recompute::{RecomputePolicy, RecomputeReason};
use crate::algorithms::RhythmAnalyzer;
use crate::config::RhythmConfig;
use crate::db::{ResultSink, SampleSource};
use crate::models::{
    fingerprint_samples, Clock, DailySample, RhythmResult, SystemClock, UserId,
};

/// What a refresh did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The policy kept the current result.
    Skipped { sample_count: usize },
    /// A new result was computed, persisted and published.
    Computed {
        reason: RecomputeReason,
        result: Arc<RhythmResult>,
    },
    /// The user was reset while the analysis ran; its output was dropped.
    Discarded,
}

/// Snapshot of a user's stored result against their current history.
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmStatus {
    pub result: Option<Arc<RhythmResult>>,
    pub sample_count: usize,
    pub last_computed_sample_count: usize,
    /// The stored result was computed from a different set of samples.
    pub stale: bool,
}

#[derive(Debug, Default)]
struct SlotState {
    result: Option<Arc<RhythmResult>>,
    last_computed_count: usize,
    hydrated: bool,
}

struct UserSlot {
    state: tokio::sync::Mutex<SlotState>,
    generation: AtomicU64,
    updates: watch::Sender<Option<Arc<RhythmResult>>>,
}

impl UserSlot {
    fn new() -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            state: tokio::sync::Mutex::new(SlotState::default()),
            generation: AtomicU64::new(0),
            updates,
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Nothing published, nobody listening, nobody else holding the slot.
    fn is_idle(self: &Arc<Self>) -> bool {
        Arc::strong_count(self) == 1
            && self.updates.receiver_count() == 0
            && self.updates.borrow().is_none()
    }
}

/// Tables smaller than this are never swept.
const MIN_SWEEP_LEN: usize = 64;

#[derive(Default)]
struct SlotTable {
    slots: HashMap<UserId, Arc<UserSlot>>,
    sweep_at: usize,
}

/// Runs the recompute policy and the analyzer for each user.
pub struct RhythmService {
    source: Arc<dyn SampleSource>,
    sink: Arc<dyn ResultSink>,
    analyzer: Arc<RhythmAnalyzer>,
    policy: RecomputePolicy,
    slots: Mutex<SlotTable>,
}

impl RhythmService {
    pub fn new(
        source: Arc<dyn SampleSource>,
        sink: Arc<dyn ResultSink>,
        analyzer: RhythmAnalyzer,
        policy: RecomputePolicy,
    ) -> Self {
        Self {
            source,
            sink,
            analyzer: Arc::new(analyzer),
            policy,
            slots: Mutex::new(SlotTable::default()),
        }
    }

    /// Build the analyzer and policy from configuration, reading the wall clock.
    pub fn from_config(
        source: Arc<dyn SampleSource>,
        sink: Arc<dyn ResultSink>,
        config: &RhythmConfig,
    ) -> Self {
        Self::with_clock(source, sink, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn SampleSource>,
        sink: Arc<dyn ResultSink>,
        config: &RhythmConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            source,
            sink,
            RhythmAnalyzer::new(config, clock),
            RecomputePolicy::new(config.recompute_cadence),
        )
    }

    fn slot(&self, user_id: UserId) -> Arc<UserSlot> {
        let mut table = self.slots.lock();
        if let Some(slot) = table.slots.get(&user_id) {
            return Arc::clone(slot);
        }
        if table.slots.len() >= table.sweep_at {
            let before = table.slots.len();
            table.slots.retain(|_, slot| !slot.is_idle());
            table.sweep_at = (table.slots.len() * 2).max(MIN_SWEEP_LEN);
            log::trace!("Swept {} idle slots", before - table.slots.len());
        }
        let slot = Arc::new(UserSlot::new());
        table.slots.insert(user_id, Arc::clone(&slot));
        slot
    }

    fn existing_slot(&self, user_id: UserId) -> Option<Arc<UserSlot>> {
        self.slots.lock().slots.get(&user_id).cloned()
    }

    /// Drop the user's slot if it has become idle.
    fn prune(&self, user_id: UserId) {
        let mut table = self.slots.lock();
        if table.slots.get(&user_id).is_some_and(|slot| slot.is_idle()) {
            table.slots.remove(&user_id);
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().slots.len()
    }

    /// Recompute if the policy says a refresh is due.
    pub async fn refresh(&self, user_id: UserId) -> ServiceResult<RefreshOutcome> {
        self.run(user_id, false).await
    }

    /// Recompute regardless of cadence.
    pub async fn force_recalculation(&self, user_id: UserId) -> ServiceResult<RefreshOutcome> {
        self.run(user_id, true).await
    }

    /// Run a refresh on the runtime without waiting for it.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        user_id: UserId,
        forced: bool,
    ) -> JoinHandle<ServiceResult<RefreshOutcome>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.run(user_id, forced).await })
    }

    async fn run(&self, user_id: UserId, forced: bool) -> ServiceResult<RefreshOutcome> {
        let outcome = self.refresh_locked(user_id, forced).await;
        match &outcome {
            Ok(RefreshOutcome::Skipped { sample_count }) => {
                log::debug!("User {}: refresh skipped at {} samples", user_id, sample_count)
            }
            Ok(RefreshOutcome::Computed { reason, result }) => log::info!(
                "User {}: rhythm recomputed ({:?}), {} estimates from {} samples",
                user_id,
                reason,
                result.estimates.len(),
                result.total_data_points
            ),
            Ok(RefreshOutcome::Discarded) => {
                log::info!("User {}: discarded result of a cancelled analysis", user_id)
            }
            Err(e) => log::warn!("User {}: rhythm refresh failed: {}", user_id, e),
        }
        self.prune(user_id);
        outcome
    }

    async fn refresh_locked(
        &self,
        user_id: UserId,
        forced: bool,
    ) -> ServiceResult<RefreshOutcome> {
        let slot = self.slot(user_id);
        let mut state = slot.state.lock().await;
        let generation = slot.generation();

        self.hydrate(user_id, &slot, &mut state).await?;

        let samples = self.source.load_samples(user_id).await?;
        let sample_count = samples.len();
        // Nothing recorded and nothing to replace.
        if sample_count == 0 && state.result.is_none() {
            return Ok(RefreshOutcome::Skipped { sample_count });
        }
        let Some(reason) = self.policy.decide(
            sample_count,
            state.last_computed_count,
            state.result.is_some(),
            forced,
        ) else {
            return Ok(RefreshOutcome::Skipped { sample_count });
        };

        let analyzer = Arc::clone(&self.analyzer);
        let result = tokio::task::spawn_blocking(move || analyzer.analyze(&samples)).await?;

        if slot.generation() != generation {
            return Ok(RefreshOutcome::Discarded);
        }

        self.sink.store_result(user_id, &result).await?;

        let result = Arc::new(result);
        state.result = Some(Arc::clone(&result));
        state.last_computed_count = sample_count;
        slot.updates.send_replace(Some(Arc::clone(&result)));

        Ok(RefreshOutcome::Computed { reason, result })
    }

    /// Load a previously persisted result the first time a user is touched.
    async fn hydrate(
        &self,
        user_id: UserId,
        slot: &UserSlot,
        state: &mut SlotState,
    ) -> ServiceResult<()> {
        if state.hydrated {
            return Ok(());
        }
        if let Some(stored) = self.sink.load_result(user_id).await? {
            log::debug!(
                "User {}: restored result computed from {} samples",
                user_id,
                stored.total_data_points
            );
            let stored = Arc::new(stored);
            state.last_computed_count = stored.total_data_points;
            state.result = Some(Arc::clone(&stored));
            slot.updates.send_replace(Some(stored));
        }
        state.hydrated = true;
        Ok(())
    }

    /// Latest published result, without touching storage.
    pub fn current_result(&self, user_id: UserId) -> Option<Arc<RhythmResult>> {
        self.existing_slot(user_id)?.updates.borrow().clone()
    }

    /// Observe every result published for a user. `None` means no result
    /// (never computed, or reset).
    pub fn subscribe(&self, user_id: UserId) -> watch::Receiver<Option<Arc<RhythmResult>>> {
        self.slot(user_id).updates.subscribe()
    }

    /// Compare the stored result with the current history.
    ///
    /// Waits for an in-flight refresh of the same user to finish.
    pub async fn status(&self, user_id: UserId) -> ServiceResult<RhythmStatus> {
        let Some(slot) = self.existing_slot(user_id) else {
            let stored = self.sink.load_result(user_id).await?.map(Arc::new);
            let last_computed = stored.as_ref().map_or(0, |r| r.total_data_points);
            let samples = self.source.load_samples(user_id).await?;
            return Ok(Self::describe(stored, last_computed, &samples));
        };

        let mut state = slot.state.lock().await;
        self.hydrate(user_id, &slot, &mut state).await?;
        let samples = self.source.load_samples(user_id).await?;
        Ok(Self::describe(
            state.result.clone(),
            state.last_computed_count,
            &samples,
        ))
    }

    fn describe(
        result: Option<Arc<RhythmResult>>,
        last_computed_sample_count: usize,
        samples: &[DailySample],
    ) -> RhythmStatus {
        let stale = match &result {
            Some(result) => result.source_fingerprint != fingerprint_samples(samples),
            None => !samples.is_empty(),
        };
        RhythmStatus {
            result,
            sample_count: samples.len(),
            last_computed_sample_count,
            stale,
        }
    }

    /// Invalidate any analysis currently running for a user.
    ///
    /// Returns immediately; the running analysis finishes but its result is
    /// dropped instead of being stored.
    pub fn cancel_in_flight(&self, user_id: UserId) {
        if let Some(slot) = self.existing_slot(user_id) {
            let previous = slot.generation.fetch_add(1, Ordering::AcqRel);
            log::debug!("User {}: generation {} -> {}", user_id, previous, previous + 1);
        }
    }

    /// Forget everything known about a user: cancel in-flight work, clear the
    /// cached and persisted result and notify subscribers.
    pub async fn reset(&self, user_id: UserId) -> ServiceResult<()> {
        self.cancel_in_flight(user_id);

        match self.existing_slot(user_id) {
            Some(slot) => {
                let mut state = slot.state.lock().await;
                *state = SlotState {
                    hydrated: true,
                    ..SlotState::default()
                };
                slot.updates.send_replace(None);
                self.sink.clear_result(user_id).await?;
            }
            None => {
                self.sink.clear_result(user_id).await?;
            }
        }
        self.prune(user_id);

        log::info!("User {}: rhythm state reset", user_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "rhythm_service_tests.rs"]
mod rhythm_service_tests;
