//! Data model for the slide export pipeline.
//!
//! A job flows through the pipeline strictly forward:
//! [`ExportJob`] -> one [`SlideArtifact`] per [`SlideSpec`] -> [`ExportResult`].
//! Nothing in this crate performs I/O.

pub mod artifact;
pub mod canvas;
pub mod ids;
pub mod job;

pub use artifact::{ArtifactPayload, ArtifactStatus, ExportResult, SlideArtifact};
pub use canvas::CanvasConfig;
pub use ids::SlideId;
pub use job::{ExportJob, OutputFormat, SlideSpec};
