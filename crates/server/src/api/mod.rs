pub mod export_handler;
pub mod health;

pub use export_handler::{export_chart, export_pdf, export_pptx};
pub use health::health_check;

use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_mb.saturating_mul(1024 * 1024);

    let export_routes = Router::new()
        .route("/api/export/pdf", post(export_pdf))
        .route("/api/export/pptx", post(export_pptx))
        .route("/api/export/chart", post(export_chart))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(health_check))
        .merge(export_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
