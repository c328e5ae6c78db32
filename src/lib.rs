//! Slide deck export: renders each slide of a presentation in a headless
//! browser and assembles the captures into a PDF or a PPTX deck.
//!
//! The workspace crates are re-exported here so applications only need this
//! one dependency.

pub mod assembler;
pub mod error;
pub mod pipeline;

pub use assembler::{assemble, export_filename};
pub use error::ExportError;
pub use pipeline::{BrowserConfig, ExportConfig, ExportPipeline, PipelineBuilder};

pub use slidepress_render::{
    BrowserLauncher, ChartRequest, ChromeLauncher, PollPolicy, RenderOptions, RenderTarget,
    Selectors, SettlePolicy, TargetMode,
};
pub use slidepress_types::{
    ArtifactPayload, ArtifactStatus, CanvasConfig, ExportJob, ExportResult, OutputFormat,
    SlideArtifact, SlideId, SlideSpec,
};

pub mod render {
    pub use slidepress_render::*;
}
