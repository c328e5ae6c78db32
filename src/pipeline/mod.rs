//! Export job orchestration.
//!
//! - [`PipelineBuilder`]: fluent construction of an [`ExportPipeline`]
//! - [`ExportConfig`]: canvas, browser, timing and ceiling settings
//!
//! # Example
//!
//! ```ignore
//! use slidepress::{PipelineBuilder, ExportJob, OutputFormat};
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_render_target_url("http://localhost:3000")?
//!     .build()?;
//!
//! let result = pipeline.export(&job).await?;
//! std::fs::write(&result.filename, &result.bytes)?;
//! ```

mod builder;
pub mod config;
mod orchestrator;

pub use builder::{DEFAULT_TARGET_URL, PipelineBuilder};
pub use config::{BrowserConfig, ExportConfig};
pub use orchestrator::{ExportPipeline, validate, validate_canvas};
