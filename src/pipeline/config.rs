use slidepress_render::{DEFAULT_USER_AGENT, RenderOptions, SessionOptions};
use slidepress_types::{CanvasConfig, OutputFormat};
use std::path::PathBuf;
use std::time::Duration;

/// How the browser for each session is started.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserConfig {
    /// Browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    pub sandbox: bool,
    pub user_agent: String,
    /// Extra pixels added to both viewport sides beyond the canvas.
    pub viewport_margin: u32,
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            sandbox: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_margin: 20,
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Everything an [`ExportPipeline`](super::ExportPipeline) needs besides
/// the job itself.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Canvas used by requests that do not bring their own.
    pub canvas: CanvasConfig,
    pub browser: BrowserConfig,
    pub render: RenderOptions,
    /// Hard ceiling for a whole PDF job, session start to assembled bytes.
    pub pdf_job_timeout: Duration,
    pub pptx_job_timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            browser: BrowserConfig::default(),
            render: RenderOptions::default(),
            pdf_job_timeout: Duration::from_secs(300),
            pptx_job_timeout: Duration::from_secs(300),
        }
    }
}

impl ExportConfig {
    pub fn job_timeout(&self, format: OutputFormat) -> Duration {
        match format {
            OutputFormat::Pdf => self.pdf_job_timeout,
            OutputFormat::Pptx => self.pptx_job_timeout,
        }
    }

    /// Session parameters for a job rendered at `canvas`.
    pub fn session_options(&self, canvas: &CanvasConfig) -> SessionOptions {
        let margin = self.browser.viewport_margin;
        SessionOptions {
            viewport: (canvas.width.saturating_add(margin), canvas.height.saturating_add(margin)),
            device_scale_factor: canvas.device_scale_factor,
            user_agent: self.browser.user_agent.clone(),
            executable: self.browser.executable.clone(),
            sandbox: self.browser.sandbox,
            idle_timeout: self.browser.idle_timeout,
            navigation_timeout: self.render.navigation_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_viewport_includes_margin() {
        let config = ExportConfig::default();
        let canvas = CanvasConfig { device_scale_factor: 2.0, ..CanvasConfig::new(1280, 720) };
        let options = config.session_options(&canvas);

        assert_eq!(options.viewport, (1300, 740));
        assert_eq!(options.device_scale_factor, 2.0);
        assert_eq!(options.navigation_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_default_ceilings() {
        let config = ExportConfig::default();
        assert_eq!(config.job_timeout(OutputFormat::Pdf), Duration::from_secs(300));
        assert_eq!(config.job_timeout(OutputFormat::Pptx), Duration::from_secs(300));
    }
}
