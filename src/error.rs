// src/error.rs
use slidepress_pdf_composer::ComposerError;
use slidepress_pptx::PptxError;
use slidepress_render::{ChartError, SessionError};
use std::time::Duration;
use thiserror::Error;

/// Job-level failures. Per-slide problems never show up here; they are
/// absorbed into fallback artifacts by the renderer.
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    /// The request itself is unusable; no browser was started.
    #[error("Invalid export request: {0}")]
    Input(String),

    #[error("Could not start render session: {0}")]
    SessionLaunch(String),

    #[error("Render session lost: {0}")]
    SessionLost(String),

    #[error("Document assembly failed: {0}")]
    Assembly(String),

    #[error("Export did not finish within {limit:?}")]
    Timeout { limit: Duration },

    #[error("Chart {index} not found on slide ({found} charts rendered)")]
    ChartNotFound { index: usize, found: usize },

    /// A slide could not be rendered where no fallback applies.
    #[error("Slide could not be rendered: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SessionError> for ExportError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Launch(msg) => ExportError::SessionLaunch(msg),
            other => ExportError::SessionLost(other.to_string()),
        }
    }
}

impl From<ComposerError> for ExportError {
    fn from(e: ComposerError) -> Self {
        ExportError::Assembly(e.to_string())
    }
}

impl From<PptxError> for ExportError {
    fn from(e: PptxError) -> Self {
        ExportError::Assembly(e.to_string())
    }
}

impl From<ChartError> for ExportError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::NotFound { index, found } => ExportError::ChartNotFound { index, found },
            ChartError::Slide(err) => ExportError::Render(err.to_string()),
            ChartError::Session(err) => err.into(),
        }
    }
}
