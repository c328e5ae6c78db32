//! Browser-driven slide rendering for the export pipeline.
//!
//! - [`RenderSession`] owns one browser and one page for the length of a job.
//! - [`SlideRenderer`] walks each slide through navigation, readiness waits,
//!   export styling, settling and capture, replacing failures with a
//!   fallback capture so every slide yields an artifact.
//! - [`wait_until`] is the single bounded polling primitive all readiness
//!   checks are built on.
//!
//! The browser itself sits behind [`BrowserLauncher`] / [`RenderPage`];
//! [`ChromeLauncher`] drives a real headless Chrome, and the `testing`
//! module (feature `test-utils`) provides a scripted stand-in.

mod chrome;
mod driver;
mod error;
pub mod fallback;
pub mod probe;
mod renderer;
mod session;
mod style;
mod target;
pub mod wait;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chrome::{ChromeLauncher, ChromePage};
pub use driver::{BrowserLauncher, Clip, DEFAULT_USER_AGENT, PdfRequest, RenderPage, SessionOptions};
pub use error::{ChartError, DriverError, SessionError, SlideError};
pub use renderer::{ChartRequest, RenderOptions, SettlePolicy, SlideRenderer, SlideStage};
pub use session::RenderSession;
pub use style::{ExportStyle, Selectors};
pub use target::{RenderTarget, TargetMode};
pub use wait::{PollPolicy, WaitOutcome, wait_until};
