//! Data model shared by the engine, the service layer and the HTTP surface.

pub mod checksum;
pub mod indicator;
pub mod macros;
pub mod rhythm;
pub mod sample;
pub mod time;

pub use checksum::fingerprint_samples;
pub use indicator::Indicator;
pub use macros::UserId;
pub use rhythm::{PeriodEstimate, RhythmResult, ScoreBreakdown};
pub use sample::{sort_by_date, DailySample};
pub use time::{Clock, FixedClock, SystemClock};
