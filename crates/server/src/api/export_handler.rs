use crate::error::{Result, ServiceError};
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use slidepress::{CanvasConfig, ChartRequest, ExportJob, ExportResult, OutputFormat, SlideSpec};
use std::time::Instant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub workspace: String,
    pub title: Option<String>,
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
    /// Falls back to the configured canvas.
    pub canvas: Option<CanvasConfig>,
}

impl ExportRequest {
    fn into_job(self, format: OutputFormat, default_canvas: CanvasConfig) -> Result<ExportJob> {
        if self.presentation_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("presentationId is required".to_string()));
        }
        let mut job = ExportJob::new(self.presentation_id, self.workspace, format, self.slides)
            .with_canvas(self.canvas.unwrap_or(default_canvas));
        job.title = self.title;
        Ok(job)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartExportRequest {
    #[serde(default)]
    pub presentation_id: String,
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub slide_index: usize,
    pub slide: Option<SlideSpec>,
    #[serde(default)]
    pub chart_index: usize,
    pub canvas: Option<CanvasConfig>,
}

pub async fn export_pdf(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    export(state, payload, OutputFormat::Pdf).await
}

pub async fn export_pptx(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    export(state, payload, OutputFormat::Pptx).await
}

async fn export(
    state: AppState,
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
    format: OutputFormat,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    let job = request.into_job(format, state.pipeline.config().canvas)?;

    // 400s must not queue behind running sessions.
    slidepress::pipeline::validate(&job)?;

    tracing::info!(
        "{} export requested for presentation {} ({} slides)",
        format.extension(),
        job.presentation_id,
        job.slides.len()
    );
    let started = Instant::now();

    let _permit = state.session_permit().await?;
    let result = state.pipeline.export(&job).await?;

    tracing::info!(
        "{} export of presentation {} completed in {:?} ({} bytes, {} fallback slides)",
        format.extension(),
        job.presentation_id,
        started.elapsed(),
        result.bytes.len(),
        result.fallback_count
    );
    Ok(attachment(result))
}

fn attachment(result: ExportResult) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(result.content_type()));
    match HeaderValue::from_str(&format!("attachment; filename=\"{}\"", result.filename)) {
        Ok(value) => {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(_) => {
            headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
        }
    }
    if result.format == OutputFormat::Pptx {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(result.bytes.len()));
    }

    (StatusCode::OK, headers, result.bytes).into_response()
}

pub async fn export_chart(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChartExportRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
    if request.presentation_id.trim().is_empty() {
        return Err(ServiceError::InvalidRequest("presentationId is required".to_string()));
    }
    let slide = request
        .slide
        .ok_or_else(|| ServiceError::InvalidRequest("slide is required".to_string()))?;

    let chart = ChartRequest {
        presentation_id: request.presentation_id,
        workspace_id: request.workspace,
        slide_index: request.slide_index,
        slide,
        chart_index: request.chart_index,
        canvas: request.canvas.unwrap_or(state.pipeline.config().canvas),
    };
    tracing::info!(
        "Chart {} requested from slide {} of presentation {}",
        chart.chart_index,
        chart.slide_index,
        chart.presentation_id
    );

    slidepress::pipeline::validate_canvas(&chart.canvas)?;

    let _permit = state.session_permit().await?;
    let png = state.pipeline.capture_chart(&chart).await?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], png).into_response())
}
