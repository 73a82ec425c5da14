//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::RhythmConfig;
use crate::db::repository::FullRepository;
use crate::services::RhythmService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sample and result storage
    pub repository: Arc<dyn FullRepository>,
    /// Analysis orchestration over the same repository
    pub service: Arc<RhythmService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, service: Arc<RhythmService>) -> Self {
        Self {
            repository,
            service,
        }
    }

    /// Build the service on top of `repository`, which serves as both the
    /// sample source and the result sink.
    pub fn from_repository<R>(repository: Arc<R>, config: &RhythmConfig) -> Self
    where
        R: FullRepository + 'static,
    {
        let service = Arc::new(RhythmService::from_config(
            repository.clone(),
            repository.clone(),
            config,
        ));
        Self::new(repository, service)
    }
}
