//! Render Session Manager: one browser process and one page per export job.

use crate::driver::{BrowserLauncher, RenderPage, SessionOptions};
use crate::error::{DriverError, SessionError};
use std::time::Instant;

/// Exclusive owner of a browser for the duration of one job.
///
/// Call [`RenderSession::release`] on the normal path. If the session is
/// dropped instead (an error bubbled up, or the job future was cancelled by
/// its ceiling), dropping the page terminates the browser process.
pub struct RenderSession {
    page: Option<Box<dyn RenderPage>>,
    started: Instant,
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("active", &self.page.is_some())
            .field("age", &self.started.elapsed())
            .finish()
    }
}

impl RenderSession {
    pub async fn acquire(
        launcher: &dyn BrowserLauncher,
        options: &SessionOptions,
    ) -> Result<Self, SessionError> {
        let started = Instant::now();
        let page = launcher.launch(options).await.map_err(|e| match e {
            DriverError::Launch(msg) => SessionError::Launch(msg),
            other => SessionError::Launch(other.to_string()),
        })?;
        log::debug!(
            "Render session launched in {:?} (viewport {}x{}, scale {})",
            started.elapsed(),
            options.viewport.0,
            options.viewport.1,
            options.device_scale_factor
        );
        Ok(Self { page: Some(page), started })
    }

    pub fn page(&self) -> Result<&dyn RenderPage, SessionError> {
        self.page.as_deref().ok_or(SessionError::Released)
    }

    pub fn is_active(&self) -> bool {
        self.page.is_some()
    }

    /// Closes the page and terminates the browser.
    pub async fn release(mut self) -> Result<(), SessionError> {
        let Some(page) = self.page.take() else {
            return Ok(());
        };
        let result = page.close().await;
        drop(page);
        log::debug!("Render session released after {:?}", self.started.elapsed());
        result.map_err(|e| SessionError::Lost(e.to_string()))
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            log::warn!(
                "Render session dropped without release after {:?}; terminating browser",
                self.started.elapsed()
            );
            drop(page);
        }
    }
}
