use crate::renderer::SlideStage;
use thiserror::Error;

/// Failures reported by a browser driver.
#[derive(Error, Debug, Clone)]
pub enum DriverError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    /// The browser process or its connection is gone. Nothing on this
    /// session can succeed anymore.
    #[error("Browser session lost: {0}")]
    SessionLost(String),
}

impl DriverError {
    pub fn is_session_lost(&self) -> bool {
        matches!(self, DriverError::SessionLost(_))
    }
}

/// Session-level failures. These abort the whole job.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Could not launch render session: {0}")]
    Launch(String),

    #[error("Render session lost: {0}")]
    Lost(String),

    #[error("Render session already released")]
    Released,
}

/// Failures contained at a single slide and replaced by a fallback capture.
#[derive(Error, Debug, Clone)]
pub enum SlideError {
    #[error("Timed out while {stage}")]
    Timeout { stage: SlideStage },

    #[error("Failed while {stage}: {message}")]
    Failed { stage: SlideStage, message: String },

    #[error("Capture failed: {0}")]
    Capture(String),
}

impl SlideError {
    pub fn stage(&self) -> SlideStage {
        match self {
            SlideError::Timeout { stage } | SlideError::Failed { stage, .. } => *stage,
            SlideError::Capture(_) => SlideStage::Capturing,
        }
    }
}

/// Failures of the standalone chart capture.
#[derive(Error, Debug, Clone)]
pub enum ChartError {
    #[error("Chart {index} not found on slide ({found} charts rendered)")]
    NotFound { index: usize, found: usize },

    #[error(transparent)]
    Slide(#[from] SlideError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
