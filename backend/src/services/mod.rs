//! Service layer: when to analyze, and where results go.
//!
//! - [`recompute`]: cadence policy deciding whether a refresh is due
//! - [`rhythm_service`]: per-user serialization, cancellation and publication
//! - [`debounce`]: turns bursts of sample changes into single refreshes

pub mod debounce;
pub mod error;
pub mod recompute;
pub mod rhythm_service;

pub use debounce::ChangeDebouncer;
pub use error::{RhythmError, ServiceResult};
pub use recompute::{RecomputePolicy, RecomputeReason};
pub use rhythm_service::{RefreshOutcome, RhythmService, RhythmStatus};
