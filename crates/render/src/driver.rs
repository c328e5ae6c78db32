//! The seam between the renderer and a concrete browser.
//!
//! A [`BrowserLauncher`] starts one browser process with one page and hands
//! back a [`RenderPage`]. The renderer only ever talks to that page, so any
//! engine that can navigate, evaluate a [`Probe`], print and screenshot can
//! drive an export.

use crate::error::DriverError;
use crate::probe::Probe;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// Launch parameters for one render session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Browser window size in CSS pixels.
    pub viewport: (u32, u32),
    pub device_scale_factor: f64,
    pub user_agent: String,
    /// Explicit browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    pub sandbox: bool,
    /// Idle time after which the driver considers the browser dead.
    pub idle_timeout: Duration,
    /// Upper bound for the driver's own load-event wait.
    pub navigation_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            viewport: (1920, 1080),
            device_scale_factor: 1.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            executable: None,
            sandbox: true,
            idle_timeout: Duration::from_secs(120),
            navigation_timeout: Duration::from_secs(15),
        }
    }
}

/// Fixed so layout does not depend on the host's browser build.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 SlidepressExport/1.0";

/// Single-page PDF capture parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRequest {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
}

/// Screenshot region in CSS pixels, rendered at `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Starts a browser and opens the page every slide will reuse.
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn RenderPage>, DriverError>;
}

/// One browser page. Calls are made strictly one at a time.
#[async_trait]
pub trait RenderPage: Send + Sync {
    /// Navigates and waits for the load event.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Runs a probe script in the page and returns its JSON result.
    async fn evaluate(&self, probe: &Probe<'_>) -> Result<Value, DriverError>;

    async fn print_pdf(&self, request: &PdfRequest) -> Result<Vec<u8>, DriverError>;

    async fn screenshot(&self, clip: &Clip) -> Result<Vec<u8>, DriverError>;

    /// Closes the page and terminates the browser process. Idempotent.
    async fn close(&self) -> Result<(), DriverError>;
}
