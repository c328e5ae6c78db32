//! Headless Chrome driver built on `headless_chrome`.
//!
//! The underlying client is synchronous, so every call runs on the blocking
//! pool. Dropping a [`ChromePage`] drops the `Browser`, which kills the
//! Chrome process.

use crate::driver::{BrowserLauncher, Clip, PdfRequest, RenderPage, SessionOptions};
use crate::error::DriverError;
use crate::probe::{self, Probe};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Upper bound on each teardown call, so a wedged browser cannot stall release.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches a local Chrome/Chromium for each session.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher;

impl ChromeLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn RenderPage>, DriverError> {
        let options = options.clone();
        let (browser, tab) = tokio::task::spawn_blocking(move || open(&options))
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))??;
        Ok(Box::new(ChromePage {
            browser: Arc::new(browser),
            tab,
            closed: AtomicBool::new(false),
        }))
    }
}

fn open(options: &SessionOptions) -> Result<(Browser, Arc<Tab>), DriverError> {
    let args: Vec<OsString> = vec![
        OsString::from("--hide-scrollbars"),
        OsString::from("--font-render-hinting=none"),
        OsString::from("--disable-dev-shm-usage"),
        OsString::from(format!("--force-device-scale-factor={}", options.device_scale_factor)),
        OsString::from(format!("--user-agent={}", options.user_agent)),
    ];

    let launch_options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(options.sandbox)
        .enable_gpu(false)
        .window_size(Some(options.viewport))
        .path(options.executable.clone())
        .idle_browser_timeout(options.idle_timeout)
        .args(args.iter().map(OsString::as_os_str).collect::<Vec<&OsStr>>())
        .build()
        .map_err(|e| DriverError::Launch(e.to_string()))?;

    let browser = Browser::new(launch_options).map_err(|e| DriverError::Launch(e.to_string()))?;
    let tab = browser.new_tab().map_err(|e| DriverError::Launch(e.to_string()))?;
    tab.set_default_timeout(options.navigation_timeout);
    log::debug!(
        "Launched Chrome (viewport {}x{}, sandbox {})",
        options.viewport.0,
        options.viewport.1,
        options.sandbox
    );
    Ok((browser, tab))
}

pub struct ChromePage {
    browser: Arc<Browser>,
    tab: Arc<Tab>,
    closed: AtomicBool,
}

impl ChromePage {
    async fn on_tab<T, F>(&self, call: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T, String> + Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err("page already closed".to_string());
        }
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || call(&tab))
            .await
            .map_err(|e| e.to_string())?
    }

    async fn is_alive(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let browser = Arc::clone(&self.browser);
        tokio::task::spawn_blocking(move || browser.get_version().is_ok())
            .await
            .unwrap_or(false)
    }

    /// A failed call on a dead browser is a lost session, whatever the call was.
    async fn classify(&self, message: String, kind: fn(String) -> DriverError) -> DriverError {
        if self.is_alive().await {
            kind(message)
        } else {
            DriverError::SessionLost(message)
        }
    }
}

#[async_trait]
impl RenderPage for ChromePage {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let url = url.to_string();
        let result = self
            .on_tab(move |tab| {
                tab.navigate_to(&url)
                    .and_then(|tab| tab.wait_until_navigated())
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(message) => Err(self.classify(message, DriverError::Navigation).await),
        }
    }

    async fn evaluate(&self, probe: &Probe<'_>) -> Result<Value, DriverError> {
        let script = probe.script();
        let result = self
            .on_tab(move |tab| {
                tab.evaluate(&script, false)
                    .map(|object| object.value)
                    .map_err(|e| e.to_string())
            })
            .await;
        match result {
            Ok(raw) => Ok(probe::decode(raw)),
            Err(message) => Err(self.classify(message, DriverError::Script).await),
        }
    }

    async fn print_pdf(&self, request: &PdfRequest) -> Result<Vec<u8>, DriverError> {
        let options = PrintToPdfOptions {
            landscape: Some(false),
            display_header_footer: Some(false),
            print_background: Some(true),
            scale: Some(1.0),
            paper_width: Some(request.paper_width_in),
            paper_height: Some(request.paper_height_in),
            margin_top: Some(0.0),
            margin_bottom: Some(0.0),
            margin_left: Some(0.0),
            margin_right: Some(0.0),
            page_ranges: Some("1".to_string()),
            prefer_css_page_size: Some(false),
            ..Default::default()
        };
        let result = self
            .on_tab(move |tab| tab.print_to_pdf(Some(options)).map_err(|e| e.to_string()))
            .await;
        match result {
            Ok(bytes) => Ok(bytes),
            Err(message) => Err(self.classify(message, DriverError::Capture).await),
        }
    }

    async fn screenshot(&self, clip: &Clip) -> Result<Vec<u8>, DriverError> {
        let viewport = Viewport {
            x: clip.x,
            y: clip.y,
            width: clip.width,
            height: clip.height,
            scale: clip.scale,
        };
        let result = self
            .on_tab(move |tab| {
                tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(viewport), true)
                    .map_err(|e| e.to_string())
            })
            .await;
        match result {
            Ok(bytes) => Ok(bytes),
            Err(message) => Err(self.classify(message, DriverError::Capture).await),
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // The process still goes away when the browser handle is dropped.
        let browser = Arc::clone(&self.browser);
        let alive = within(CLOSE_TIMEOUT, async move {
            tokio::task::spawn_blocking(move || browser.get_version().map(|_| ()).map_err(|e| e.to_string()))
                .await
                .map_err(|e| e.to_string())?
        })
        .await;
        if let Err(e) = alive {
            log::debug!("Chrome is not answering, skipping tab close: {}", e);
            return Ok(());
        }

        let tab = Arc::clone(&self.tab);
        let closed = within(CLOSE_TIMEOUT, async move {
            tokio::task::spawn_blocking(move || tab.close(false).map(|_| ()).map_err(|e| e.to_string()))
                .await
                .map_err(|e| e.to_string())?
        })
        .await;
        if let Err(e) = closed {
            log::warn!("Closing Chrome tab failed: {}", e);
        }
        Ok(())
    }
}

async fn within<T, F>(limit: Duration, call: F) -> Result<T, String>
where
    F: Future<Output = Result<T, String>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(format!("no answer within {:?}", limit)))
}
