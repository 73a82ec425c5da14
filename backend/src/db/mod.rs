//! Storage abstractions for sample histories and rhythm results.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / ChangeDebouncer                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  RhythmService - recompute policy, cancellation         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (SampleSource, SampleStore,          │
//! │  ResultSink)                                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod repositories;
pub mod repository;

pub use repositories::LocalRepository;
pub use repository::{
    ChangeKind, ErrorContext, FullRepository, RepositoryError, RepositoryResult, ResultSink,
    SampleChange, SampleSource, SampleStore,
};
