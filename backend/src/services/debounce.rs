//! Coalesces sample-change notifications into refreshes.
//!
//! Clients often record several indicators for a day in quick succession.
//! The debouncer collects the affected users and, once no new change has
//! arrived for the configured delay, schedules one refresh per user. A
//! cleared history cancels the user's pending work instead.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::rhythm_service::RhythmService;
use crate::db::{ChangeKind, SampleChange};
use crate::models::UserId;

pub struct ChangeDebouncer {
    service: Arc<RhythmService>,
    delay: Duration,
}

impl ChangeDebouncer {
    pub fn new(service: Arc<RhythmService>, delay: Duration) -> Self {
        Self { service, delay }
    }

    /// Consume `changes` on a background task until the channel closes.
    pub fn spawn(self, changes: broadcast::Receiver<SampleChange>) -> JoinHandle<()> {
        tokio::spawn(self.run(changes))
    }

    pub async fn run(self, mut changes: broadcast::Receiver<SampleChange>) {
        let mut pending: BTreeSet<UserId> = BTreeSet::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                received = changes.recv() => match received {
                    Ok(SampleChange { user_id, kind: ChangeKind::Cleared, .. }) => {
                        // Nothing left to analyze; stop any analysis of the old history.
                        pending.remove(&user_id);
                        self.service.cancel_in_flight(user_id);
                    }
                    Ok(change) => {
                        pending.insert(change.user_id);
                        deadline = Some(Instant::now() + self.delay);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Lost events may belong to any user; refresh whoever
                        // we already know about and carry on.
                        log::warn!("Change debouncer lagged, {} notifications dropped", skipped);
                        deadline = Some(Instant::now());
                    }
                    Err(RecvError::Closed) => {
                        self.flush(&mut pending);
                        log::debug!("Change feed closed, debouncer stopping");
                        return;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    self.flush(&mut pending);
                }
            }
        }
    }

    fn flush(&self, pending: &mut BTreeSet<UserId>) {
        for user_id in std::mem::take(pending) {
            log::debug!("Scheduling rhythm refresh for user {}", user_id);
            // The refresh logs its own outcome.
            drop(self.service.spawn_refresh(user_id, false));
        }
    }
}
