// src/pipeline/builder.rs
use super::config::ExportConfig;
use super::orchestrator::ExportPipeline;
use crate::error::ExportError;
use slidepress_render::{BrowserLauncher, ChromeLauncher, RenderTarget, SlideRenderer};
use std::sync::Arc;

/// Local development server of the render target.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:3000";

/// A builder for creating an `ExportPipeline`.
#[derive(Default)]
pub struct PipelineBuilder {
    launcher: Option<Arc<dyn BrowserLauncher>>,
    target: Option<RenderTarget>,
    config: ExportConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Uses `launcher` to start browsers instead of a local headless Chrome.
    pub fn with_launcher<L: BrowserLauncher + 'static>(mut self, launcher: L) -> Self {
        self.launcher = Some(Arc::new(launcher));
        self
    }

    pub fn with_shared_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn with_render_target(mut self, target: RenderTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Renders slides at `base_url` + [`RenderTarget::DEFAULT_PATH`].
    pub fn with_render_target_url(mut self, base_url: &str) -> Result<Self, ExportError> {
        let target = RenderTarget::new(base_url, RenderTarget::DEFAULT_PATH)
            .map_err(|e| ExportError::Config(format!("Invalid render target URL '{}': {}", base_url, e)))?;
        self.target = Some(target);
        Ok(self)
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ExportPipeline, ExportError> {
        if !self.config.canvas.is_valid() {
            return Err(ExportError::Config("Default canvas is invalid".to_string()));
        }

        let target = match self.target {
            Some(target) => target,
            None => RenderTarget::new(DEFAULT_TARGET_URL, RenderTarget::DEFAULT_PATH)
                .map_err(|e| ExportError::Config(e.to_string()))?,
        };
        let launcher = self.launcher.unwrap_or_else(|| {
            log::info!("No browser launcher configured; using local headless Chrome.");
            Arc::new(ChromeLauncher::new())
        });

        log::debug!("Render target: {}", target.base());
        let renderer = SlideRenderer::new(target, self.config.render.clone());
        Ok(ExportPipeline::new(launcher, renderer, self.config))
    }
}
