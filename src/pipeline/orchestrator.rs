use super::config::ExportConfig;
use crate::assembler::assemble;
use crate::error::ExportError;
use slidepress_render::{BrowserLauncher, ChartRequest, RenderSession, SlideRenderer};
use slidepress_types::{CanvasConfig, ExportJob, ExportResult};
use std::sync::Arc;
use std::time::Instant;

/// Runs export jobs end to end: validate, render every slide in one session,
/// release the session, assemble.
///
/// Each call owns its own browser session; nothing is shared between
/// concurrent jobs except the launcher.
pub struct ExportPipeline {
    launcher: Arc<dyn BrowserLauncher>,
    renderer: SlideRenderer,
    config: ExportConfig,
}

impl ExportPipeline {
    pub(crate) fn new(
        launcher: Arc<dyn BrowserLauncher>,
        renderer: SlideRenderer,
        config: ExportConfig,
    ) -> Self {
        Self { launcher, renderer, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports `job`, bounded by the format's job ceiling.
    ///
    /// Input errors are reported before any browser is launched. When the
    /// ceiling is hit the in-flight session is dropped, which terminates the
    /// browser, and nothing is assembled.
    pub async fn export(&self, job: &ExportJob) -> Result<ExportResult, ExportError> {
        validate(job)?;

        let limit = self.config.job_timeout(job.format);
        let started = Instant::now();
        log::info!(
            "Exporting presentation {} ({} slides) as {}",
            job.presentation_id,
            job.slides.len(),
            job.format.extension()
        );

        match tokio::time::timeout(limit, self.run(job)).await {
            Ok(Ok(result)) => {
                log::info!(
                    "Exported {} in {:?} ({} pages, {} fallback)",
                    result.filename,
                    started.elapsed(),
                    result.page_count,
                    result.fallback_count
                );
                Ok(result)
            }
            Ok(Err(e)) => {
                log::error!("Export of presentation {} failed: {}", job.presentation_id, e);
                Err(e)
            }
            Err(_) => {
                log::error!(
                    "Export of presentation {} exceeded {:?}; session torn down",
                    job.presentation_id,
                    limit
                );
                Err(ExportError::Timeout { limit })
            }
        }
    }

    async fn run(&self, job: &ExportJob) -> Result<ExportResult, ExportError> {
        let options = self.config.session_options(&job.canvas);
        let session = RenderSession::acquire(self.launcher.as_ref(), &options).await?;

        let rendered = self.renderer.render_all(&session, job).await;
        if let Err(e) = session.release().await {
            log::warn!("Render session did not close cleanly: {}", e);
        }

        assemble(job, rendered?)
    }

    /// Renders a single slide and returns one chart on it as PNG.
    pub async fn capture_chart(&self, request: &ChartRequest) -> Result<Vec<u8>, ExportError> {
        validate_canvas(&request.canvas)?;

        let limit = self.config.pptx_job_timeout;
        let run = async {
            let options = self.config.session_options(&request.canvas);
            let session = RenderSession::acquire(self.launcher.as_ref(), &options).await?;
            let captured = self.renderer.capture_chart(&session, request).await;
            if let Err(e) = session.release().await {
                log::warn!("Render session did not close cleanly: {}", e);
            }
            Ok::<_, ExportError>(captured?)
        };

        match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => Err(ExportError::Timeout { limit }),
        }
    }
}

/// Rejects jobs that cannot produce a document. Runs before any browser work.
pub fn validate(job: &ExportJob) -> Result<(), ExportError> {
    if job.slides.is_empty() {
        return Err(ExportError::Input("No slides provided".to_string()));
    }
    validate_canvas(&job.canvas)?;
    if let Some(slide) = job.slides.iter().find(|s| s.id.as_str().trim().is_empty()) {
        return Err(ExportError::Input(format!(
            "Slide with layout '{}' has an empty id",
            slide.layout
        )));
    }
    Ok(())
}

/// Rejects canvases the browser cannot be sized to.
pub fn validate_canvas(canvas: &CanvasConfig) -> Result<(), ExportError> {
    if canvas.is_valid() {
        return Ok(());
    }
    Err(ExportError::Input(format!(
        "Invalid canvas {}x{} (design width {}, scale {}); sides must be 1..={} and scale at most {}",
        canvas.width,
        canvas.height,
        canvas.design_width,
        canvas.device_scale_factor,
        CanvasConfig::MAX_DIMENSION,
        CanvasConfig::MAX_DEVICE_SCALE
    )))
}
