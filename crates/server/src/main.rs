use mimalloc::MiMalloc;
use slidepress::PipelineBuilder;
use slidepress_server::{api, config::Config, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting slide export service...");

    let config = Config::load()?;
    tracing::info!("Configuration loaded");

    let target = config.render_target.target()?;
    tracing::info!(
        "Rendering slides at {} ({:?} mode)",
        target.base(),
        config.render_target.mode
    );

    let pipeline = PipelineBuilder::new()
        .with_render_target(target)
        .with_config(config.export_config())
        .build()?;
    tracing::info!(
        "Export pipeline ready (max {} concurrent browser sessions)",
        config.concurrency.max_sessions
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = api::router(AppState::new(pipeline, config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Slide export service listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - POST /api/export/pdf");
    tracing::info!("  - POST /api/export/pptx");
    tracing::info!("  - POST /api/export/chart");
    tracing::info!("  - GET  /health");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slidepress=debug,slidepress_render=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
