use crate::config::Config;
use crate::error::{Result, ServiceError};
use slidepress::ExportPipeline;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ExportPipeline>,

    /// Bounds concurrent browser sessions; every export holds one permit
    /// from launch to release.
    pub sessions: Arc<Semaphore>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pipeline: ExportPipeline, config: Config) -> Self {
        let sessions = Arc::new(Semaphore::new(config.concurrency.max_sessions.max(1)));
        Self { pipeline: Arc::new(pipeline), sessions, config: Arc::new(config) }
    }

    /// Waits for a free session slot.
    pub async fn session_permit(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.sessions)
            .acquire_owned()
            .await
            .map_err(|_| ServiceError::ServiceUnavailable)
    }
}
