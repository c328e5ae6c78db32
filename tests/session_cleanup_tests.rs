mod common;

use common::{TestResult, fast_config, job, pdf_launcher, pipeline, pipeline_with};
use slidepress::{ExportError, ExportJob, OutputFormat};
use slidepress_render::testing::{SlideBehavior, StubLauncher};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_empty_job_is_rejected_before_launch() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let empty = ExportJob::new("pres-1", "acme", OutputFormat::Pdf, Vec::new());
    let err = pipeline.export(&empty).await.err();

    assert!(matches!(err, Some(ExportError::Input(_))));
    assert_eq!(stats.launch_attempts(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_invalid_canvas_is_rejected_before_launch() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let mut bad = job(OutputFormat::Pptx, 2);
    bad.canvas.width = 0;
    let err = pipeline.export(&bad).await.err();

    assert!(matches!(err, Some(ExportError::Input(_))));
    assert_eq!(stats.launch_attempts(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_oversized_canvas_is_rejected_before_launch() -> TestResult {
    let launcher = pdf_launcher();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let mut huge = job(OutputFormat::Pdf, 1);
    huge.canvas.width = 100_000;
    huge.canvas.height = 100_000;
    match pipeline.export(&huge).await.err() {
        Some(ExportError::Input(message)) => assert!(message.contains("100000x100000")),
        other => panic!("expected input error, got {:?}", other),
    }
    assert_eq!(stats.launch_attempts(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_is_reported() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher().failing_launch();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let err = pipeline.export(&job(OutputFormat::Pdf, 2)).await.err();
    assert!(matches!(err, Some(ExportError::SessionLaunch(_))));
    assert_eq!(stats.launch_attempts(), 1);
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_one_session_per_job_released_after_success() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    pipeline.export(&job(OutputFormat::Pdf, 3)).await?;
    pipeline.export(&job(OutputFormat::Pdf, 2)).await?;

    assert_eq!(stats.launches(), 2);
    assert_eq!(stats.closes(), 2);
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_crash_during_navigation_releases_session() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher().slide(1, SlideBehavior::Crash);
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let err = pipeline.export(&job(OutputFormat::Pdf, 3)).await.err();
    assert!(matches!(err, Some(ExportError::SessionLost(_))));
    assert_eq!(stats.launches(), 1);
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_crash_during_readiness_wait_releases_session() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher().slide(0, SlideBehavior::CrashWhileWaiting);
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let err = pipeline.export(&job(OutputFormat::Pptx, 2)).await.err();
    assert!(matches!(err, Some(ExportError::SessionLost(_))));
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_assembly_failure_releases_session() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    // The default stub PDF bytes are not a parseable document, so merging fails.
    let launcher = StubLauncher::new();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let err = pipeline.export(&job(OutputFormat::Pdf, 2)).await.err();
    assert!(matches!(err, Some(ExportError::Assembly(_))));
    assert_eq!(stats.launches(), 1);
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_job_ceiling_tears_down_session() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = fast_config();
    config.pdf_job_timeout = Duration::from_secs(1);
    let launcher = pdf_launcher().slide(0, SlideBehavior::NavigationHangs);
    let stats = launcher.stats();
    let pipeline = pipeline_with(launcher, config);

    let err = pipeline.export(&job(OutputFormat::Pdf, 2)).await.err();
    assert!(matches!(err, Some(ExportError::Timeout { limit }) if limit == Duration::from_secs(1)));
    assert_eq!(stats.launches(), 1);
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_hung_navigation_falls_back_without_losing_session() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = pdf_launcher().slide(0, SlideBehavior::NavigationHangs);
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let result = pipeline.export(&job(OutputFormat::Pdf, 2)).await?;
    assert_eq!(result.page_count, 2);
    assert_eq!(result.fallback_count, 1);
    assert_eq!(stats.launches(), 1);
    assert_eq!(stats.live(), 0);
    Ok(())
}
