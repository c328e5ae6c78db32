//! Slide Renderer and Capture Stage.
//!
//! Each slide goes through
//! `Pending -> Navigating -> WaitingReady -> StylingForExport -> Capturing`
//! and ends in `Done`, or in `FallbackDone` when any step before that failed
//! and a placeholder page was captured instead. Only a lost browser session
//! escapes a slide; everything else degrades to a fallback artifact.

use crate::driver::{Clip, PdfRequest, RenderPage};
use crate::error::{ChartError, DriverError, SessionError, SlideError};
use crate::fallback::fallback_url;
use crate::probe::{Bounds, DocumentState, Probe};
use crate::session::RenderSession;
use crate::style::{ExportStyle, Selectors};
use crate::target::RenderTarget;
use crate::wait::{PollPolicy, WaitOutcome, wait_until};
use serde_json::Value;
use slidepress_types::{
    ArtifactPayload, CanvasConfig, ExportJob, OutputFormat, SlideArtifact, SlideSpec,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Screenshot clips are in CSS pixels; the browser is launched with the canvas device scale already forced.
const CSS_PIXEL_SCALE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideStage {
    Pending,
    Navigating,
    WaitingReady,
    StylingForExport,
    Capturing,
    Done,
    FallbackDone,
}

impl fmt::Display for SlideStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SlideStage::Pending => "pending",
            SlideStage::Navigating => "navigating",
            SlideStage::WaitingReady => "waiting for content",
            SlideStage::StylingForExport => "styling for export",
            SlideStage::Capturing => "capturing",
            SlideStage::Done => "done",
            SlideStage::FallbackDone => "done with fallback",
        };
        f.write_str(text)
    }
}

/// How long to let transitions finish after readiness, by chart count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    /// Delay for slides without charts.
    pub base_settle_delay: Duration,
    /// Delay for a slide with one chart.
    pub chart_settle_delay: Duration,
    /// Added for every chart beyond the first.
    pub per_extra_chart: Duration,
    /// Hard ceiling for any slide.
    pub max_settle_delay: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            base_settle_delay: Duration::from_millis(1000),
            chart_settle_delay: Duration::from_millis(2000),
            per_extra_chart: Duration::from_millis(500),
            max_settle_delay: Duration::from_millis(3500),
        }
    }
}

impl SettlePolicy {
    pub fn delay_for(&self, chart_count: usize) -> Duration {
        let delay = match chart_count {
            0 => self.base_settle_delay,
            n => {
                let extra = u32::try_from(n - 1).unwrap_or(u32::MAX);
                self.chart_settle_delay
                    .saturating_add(self.per_extra_chart.saturating_mul(extra))
            }
        };
        delay.min(self.max_settle_delay)
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Load event plus network idle.
    pub navigation_timeout: Duration,
    /// Root content container mounted and non-empty.
    pub content_timeout: Duration,
    /// Chart surfaces sized. Timing out here does not fail the slide.
    pub chart_timeout: Duration,
    pub capture_timeout: Duration,
    pub settle: SettlePolicy,
    pub poll: PollPolicy,
    pub selectors: Selectors,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(15),
            content_timeout: Duration::from_secs(10),
            chart_timeout: Duration::from_secs(12),
            capture_timeout: Duration::from_secs(30),
            settle: SettlePolicy::default(),
            poll: PollPolicy::default(),
            selectors: Selectors::default(),
        }
    }
}

/// A single chart to capture as a PNG.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub presentation_id: String,
    pub workspace_id: String,
    pub slide_index: usize,
    pub slide: SlideSpec,
    pub chart_index: usize,
    pub canvas: CanvasConfig,
}

/// Why a slide attempt stopped.
enum Interrupt {
    Slide(SlideError),
    Session(SessionError),
}

impl From<SlideError> for Interrupt {
    fn from(err: SlideError) -> Self {
        Interrupt::Slide(err)
    }
}

fn driver_failure(stage: SlideStage, err: DriverError) -> Interrupt {
    match err {
        DriverError::SessionLost(msg) => Interrupt::Session(SessionError::Lost(msg)),
        DriverError::Capture(msg) => Interrupt::Slide(SlideError::Capture(msg)),
        other => Interrupt::Slide(SlideError::Failed { stage, message: other.to_string() }),
    }
}

pub struct SlideRenderer {
    target: RenderTarget,
    options: RenderOptions,
}

impl SlideRenderer {
    pub fn new(target: RenderTarget, options: RenderOptions) -> Self {
        Self { target, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Renders every slide of `job` in order on the session's page.
    ///
    /// Always yields exactly one artifact per slide unless the session is lost.
    pub async fn render_all(
        &self,
        session: &RenderSession,
        job: &ExportJob,
    ) -> Result<Vec<SlideArtifact>, SessionError> {
        let page = session.page()?;
        let started = Instant::now();
        let mut artifacts = Vec::with_capacity(job.slides.len());

        for (index, slide) in job.slides.iter().enumerate() {
            artifacts.push(self.render_slide(page, job, index, slide).await?);
        }

        let fallbacks = artifacts.iter().filter(|a| a.is_fallback()).count();
        log::info!(
            "Rendered {} slides of presentation {} in {:?} ({} fallback)",
            artifacts.len(),
            job.presentation_id,
            started.elapsed(),
            fallbacks
        );
        Ok(artifacts)
    }

    pub async fn render_slide(
        &self,
        page: &dyn RenderPage,
        job: &ExportJob,
        index: usize,
        slide: &SlideSpec,
    ) -> Result<SlideArtifact, SessionError> {
        let ordinal = index + 1;
        let mut stage = SlideStage::Pending;

        match self.attempt(page, job, index, slide, &mut stage).await {
            Ok(payload) => {
                advance(&mut stage, SlideStage::Done, ordinal);
                Ok(SlideArtifact::rendered(slide.id.clone(), ordinal, slide.title.clone(), payload))
            }
            Err(Interrupt::Session(err)) => {
                log::error!("Session lost on slide {} ({}) while {}: {}", ordinal, slide.id, stage, err);
                Err(err)
            }
            Err(Interrupt::Slide(err)) => {
                log::warn!(
                    "Slide {} ({}) failed while {}: {}; capturing fallback",
                    ordinal,
                    slide.id,
                    err.stage(),
                    err
                );
                let payload = self.capture_fallback(page, job, ordinal, slide).await?;
                advance(&mut stage, SlideStage::FallbackDone, ordinal);
                Ok(SlideArtifact::fallback(
                    slide.id.clone(),
                    ordinal,
                    slide.title.clone(),
                    payload,
                    err.to_string(),
                ))
            }
        }
    }

    /// Renders one slide and screenshots a single chart on it.
    ///
    /// Unlike slide export there is no fallback: a slide that never becomes
    /// ready is an error.
    pub async fn capture_chart(
        &self,
        session: &RenderSession,
        request: &ChartRequest,
    ) -> Result<Vec<u8>, ChartError> {
        let page = session.page()?;
        let mut stage = SlideStage::Pending;
        let url = self
            .target
            .slide_url(&request.presentation_id, &request.workspace_id, request.slide_index, &request.slide)
            .map_err(|e| SlideError::Failed { stage: SlideStage::Navigating, message: e.to_string() })?;

        let chart_count = match self.prepare(page, url.as_str(), &request.canvas, &mut stage).await {
            Ok(count) => count,
            Err(Interrupt::Slide(err)) => return Err(err.into()),
            Err(Interrupt::Session(err)) => return Err(err.into()),
        };

        advance(&mut stage, SlideStage::Capturing, request.slide_index + 1);
        let chart = self.options.selectors.chart.as_str();
        let bounds = page
            .evaluate(&Probe::ChartBounds { chart, index: request.chart_index })
            .await
            .map_err(|e| interrupt_to_chart(driver_failure(SlideStage::Capturing, e)))?;
        let bounds: Bounds = match bounds {
            Value::Null => {
                return Err(ChartError::NotFound { index: request.chart_index, found: chart_count });
            }
            value => serde_json::from_value(value).map_err(|e| SlideError::Capture(e.to_string()))?,
        };
        if bounds.is_empty() {
            return Err(SlideError::Capture(format!(
                "chart {} has no size ({}x{})",
                request.chart_index, bounds.width, bounds.height
            ))
            .into());
        }

        let clip = Clip {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            scale: CSS_PIXEL_SCALE,
        };
        let bytes = self
            .bounded_capture(page.screenshot(&clip))
            .await
            .map_err(interrupt_to_chart)?;
        log::info!(
            "Captured chart {} of slide {} ({}): {} bytes",
            request.chart_index,
            request.slide_index,
            request.slide.id,
            bytes.len()
        );
        Ok(bytes)
    }

    async fn attempt(
        &self,
        page: &dyn RenderPage,
        job: &ExportJob,
        index: usize,
        slide: &SlideSpec,
        stage: &mut SlideStage,
    ) -> Result<ArtifactPayload, Interrupt> {
        let url = self
            .target
            .slide_url(&job.presentation_id, &job.workspace_id, index, slide)
            .map_err(|e| SlideError::Failed { stage: SlideStage::Navigating, message: e.to_string() })?;

        self.prepare(page, url.as_str(), &job.canvas, stage).await?;
        advance(stage, SlideStage::Capturing, index + 1);
        self.capture(page, job.format, &job.canvas).await
    }

    /// Steps up to (not including) capture. Returns the chart count.
    async fn prepare(
        &self,
        page: &dyn RenderPage,
        url: &str,
        canvas: &CanvasConfig,
        stage: &mut SlideStage,
    ) -> Result<usize, Interrupt> {
        let ordinal = slide_ordinal(url);

        advance(stage, SlideStage::Navigating, ordinal);
        self.load(page, url).await?;

        advance(stage, SlideStage::WaitingReady, ordinal);
        let root = self.options.selectors.root.as_str();
        let outcome = wait_until(self.options.content_timeout, &self.options.poll, move || async move {
            flag(page, &Probe::ContentReady { root }).await
        })
        .await?;
        if !outcome.is_ready() {
            return Err(SlideError::Timeout { stage: SlideStage::WaitingReady }.into());
        }

        let charts = self.wait_for_charts(page, ordinal).await?;

        advance(stage, SlideStage::StylingForExport, ordinal);
        let style = ExportStyle::new(canvas, &self.options.selectors);
        match page.evaluate(&Probe::ApplyExportStyle(&style)).await {
            Ok(found) => {
                if found.as_bool() != Some(true) {
                    log::debug!("Export style applied but root {} not found", style.root_selector());
                }
            }
            Err(e) => return Err(driver_failure(SlideStage::StylingForExport, e)),
        }

        let delay = self.options.settle.delay_for(charts);
        log::trace!("Settling {:?} ({} charts)", delay, charts);
        tokio::time::sleep(delay).await;
        Ok(charts)
    }

    /// Navigates, then waits for the network to go quiet, all within the
    /// navigation timeout.
    async fn load(&self, page: &dyn RenderPage, url: &str) -> Result<(), Interrupt> {
        let budget = self.options.navigation_timeout;
        let started = Instant::now();

        match tokio::time::timeout(budget, page.navigate(url)).await {
            Err(_) => return Err(SlideError::Timeout { stage: SlideStage::Navigating }.into()),
            Ok(Err(e)) => return Err(driver_failure(SlideStage::Navigating, e)),
            Ok(Ok(())) => {}
        }

        let remaining = budget.saturating_sub(started.elapsed());
        let last_count = AtomicU64::new(u64::MAX);
        let last_count = &last_count;
        let outcome = wait_until(remaining, &self.options.poll, move || async move {
            let state = match evaluate(page, &Probe::DocumentState).await? {
                Some(value) => serde_json::from_value::<DocumentState>(value).ok(),
                None => None,
            };
            let idle = match state {
                Some(state) => {
                    let previous = last_count.swap(state.resources, Ordering::Relaxed);
                    state.ready && previous == state.resources
                }
                None => false,
            };
            Ok::<bool, Interrupt>(idle)
        })
        .await?;

        match outcome {
            WaitOutcome::Ready => Ok(()),
            WaitOutcome::TimedOut { .. } => {
                Err(SlideError::Timeout { stage: SlideStage::Navigating }.into())
            }
        }
    }

    async fn wait_for_charts(&self, page: &dyn RenderPage, ordinal: usize) -> Result<usize, Interrupt> {
        let chart = self.options.selectors.chart.as_str();
        let container = self.options.selectors.responsive_container.as_str();

        let count = match evaluate(page, &Probe::ChartCount { chart, container }).await? {
            Some(value) => value.as_u64().unwrap_or(0) as usize,
            None => 0,
        };
        if count == 0 {
            return Ok(0);
        }

        let outcome = wait_until(self.options.chart_timeout, &self.options.poll, move || async move {
            flag(page, &Probe::ChartsSized { chart, container }).await
        })
        .await?;
        if let WaitOutcome::TimedOut { elapsed } = outcome {
            log::warn!(
                "Slide {}: {} charts not sized after {:?}; capturing anyway, chart may appear incomplete",
                ordinal,
                count,
                elapsed
            );
        }
        Ok(count)
    }

    async fn capture(
        &self,
        page: &dyn RenderPage,
        format: OutputFormat,
        canvas: &CanvasConfig,
    ) -> Result<ArtifactPayload, Interrupt> {
        match format {
            OutputFormat::Pdf => {
                let request = PdfRequest {
                    paper_width_in: canvas.width_inches(),
                    paper_height_in: canvas.height_inches(),
                };
                self.bounded_capture(page.print_pdf(&request)).await.map(ArtifactPayload::Pdf)
            }
            OutputFormat::Pptx => {
                let clip = Clip {
                    x: 0.0,
                    y: 0.0,
                    width: canvas.width as f64,
                    height: canvas.height as f64,
                    scale: CSS_PIXEL_SCALE,
                };
                self.bounded_capture(page.screenshot(&clip)).await.map(ArtifactPayload::Image)
            }
        }
    }

    async fn bounded_capture<F>(&self, capture: F) -> Result<Vec<u8>, Interrupt>
    where
        F: Future<Output = Result<Vec<u8>, DriverError>>,
    {
        match tokio::time::timeout(self.options.capture_timeout, capture).await {
            Err(_) => Err(SlideError::Timeout { stage: SlideStage::Capturing }.into()),
            Ok(Err(e)) => Err(driver_failure(SlideStage::Capturing, e)),
            Ok(Ok(bytes)) if bytes.is_empty() => {
                Err(SlideError::Capture("browser returned an empty capture".to_string()).into())
            }
            Ok(Ok(bytes)) => Ok(bytes),
        }
    }

    /// Loads the placeholder page for a failed slide and captures it.
    ///
    /// If that fails too the payload is `Unavailable` and the assembler
    /// synthesises the page.
    async fn capture_fallback(
        &self,
        page: &dyn RenderPage,
        job: &ExportJob,
        ordinal: usize,
        slide: &SlideSpec,
    ) -> Result<ArtifactPayload, SessionError> {
        let url = fallback_url(ordinal, &slide.id, &job.canvas);

        let navigated = match tokio::time::timeout(self.options.navigation_timeout, page.navigate(&url)).await {
            Err(_) => Err(SlideError::Timeout { stage: SlideStage::Navigating }.into()),
            Ok(Err(e)) => Err(driver_failure(SlideStage::Navigating, e)),
            Ok(Ok(())) => Ok(()),
        };
        let result = match navigated {
            Ok(()) => self.capture(page, job.format, &job.canvas).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(payload) => Ok(payload),
            Err(Interrupt::Session(err)) => Err(err),
            Err(Interrupt::Slide(err)) => {
                log::warn!(
                    "Fallback capture for slide {} ({}) failed: {}; emitting synthetic placeholder",
                    ordinal,
                    slide.id,
                    err
                );
                Ok(ArtifactPayload::Unavailable)
            }
        }
    }
}

fn advance(stage: &mut SlideStage, next: SlideStage, ordinal: usize) {
    log::trace!("Slide {}: {} -> {}", ordinal, stage, next);
    *stage = next;
}

fn slide_ordinal(url: &str) -> usize {
    crate::target::slide_index_of(url).map_or(0, |index| index + 1)
}

fn interrupt_to_chart(interrupt: Interrupt) -> ChartError {
    match interrupt {
        Interrupt::Slide(err) => err.into(),
        Interrupt::Session(err) => err.into(),
    }
}

/// Evaluates a probe during a wait. Script failures (e.g. the execution
/// context was replaced mid-navigation) read as "not yet"; a lost session
/// aborts the wait.
async fn evaluate(page: &dyn RenderPage, probe: &Probe<'_>) -> Result<Option<Value>, Interrupt> {
    match page.evaluate(probe).await {
        Ok(value) => Ok(Some(value)),
        Err(DriverError::SessionLost(msg)) => Err(Interrupt::Session(SessionError::Lost(msg))),
        Err(e) => {
            log::trace!("Probe {} failed: {}", probe.name(), e);
            Ok(None)
        }
    }
}

async fn flag(page: &dyn RenderPage, probe: &Probe<'_>) -> Result<bool, Interrupt> {
    Ok(evaluate(page, probe).await?.and_then(|v| v.as_bool()).unwrap_or(false))
}
