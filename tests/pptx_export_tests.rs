mod common;

use common::{GeneratedDeck, TestResult, job, pipeline};
use slidepress_render::testing::{CaptureKind, SlideBehavior, StubLauncher};
use slidepress::{CanvasConfig, ChartRequest, ExportError, OutputFormat, SlideSpec};
use slidepress_pptx::units::SlideSize;

#[tokio::test(start_paused = true)]
async fn test_deck_has_one_full_bleed_slide_per_input() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = StubLauncher::new();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);
    let result = pipeline.export(&job(OutputFormat::Pptx, 4)).await?;

    assert_eq!(result.page_count, 4);
    assert_eq!(result.filename, "quarterly-review.pptx");
    assert_eq!(
        result.content_type(),
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    );
    assert!(stats.captures().iter().all(|c| matches!(c.kind, CaptureKind::Screenshot(_))));

    let mut deck = GeneratedDeck::from_bytes(result.bytes)?;
    assert_eq!(deck.slide_count(), 4);
    assert_eq!(deck.media_count(), 4);

    let size = SlideSize::for_canvas(1920, 1080);
    assert_eq!(size, SlideSize::widescreen());
    let presentation = deck.part("ppt/presentation.xml")?;
    assert!(presentation.contains(&format!(r#"<p:sldSz cx="{}" cy="{}""#, size.cx, size.cy)));

    for n in 1..=4 {
        let slide = deck.part(&format!("ppt/slides/slide{}.xml", n))?;
        assert!(slide.contains(r#"<a:off x="0" y="0"/>"#));
        assert!(slide.contains(&format!(r#"<a:ext cx="{}" cy="{}"/>"#, size.cx, size.cy)));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_screenshots_cover_the_canvas() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = StubLauncher::new();
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);
    pipeline.export(&job(OutputFormat::Pptx, 1)).await?;

    let captures = stats.captures();
    assert_eq!(captures.len(), 1);
    match captures[0].kind {
        CaptureKind::Screenshot(clip) => {
            assert_eq!((clip.x, clip.y), (0.0, 0.0));
            assert_eq!((clip.width, clip.height), (1920.0, 1080.0));
        }
        other => panic!("expected a screenshot, got {:?}", other),
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_failed_slide_keeps_its_position() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let pipeline = pipeline(StubLauncher::new().slide(1, SlideBehavior::FallbackFails));
    let result = pipeline.export(&job(OutputFormat::Pptx, 3)).await?;

    assert_eq!(result.fallback_count, 1);
    let mut deck = GeneratedDeck::from_bytes(result.bytes)?;
    assert_eq!(deck.slide_count(), 3);
    assert_eq!(deck.media_count(), 2);

    let text_slide = deck.part("ppt/slides/slide2.xml")?;
    assert!(text_slide.contains("Slide title 2"));
    assert!(text_slide.contains("could not be rendered"));
    assert!(!deck.part("ppt/slides/_rels/slide2.xml.rels")?.contains("../media/"));
    Ok(())
}

fn chart_request(chart_index: usize) -> ChartRequest {
    ChartRequest {
        presentation_id: "pres-1".to_string(),
        workspace_id: "acme".to_string(),
        slide_index: 2,
        slide: SlideSpec::new("slide-3", "chart"),
        chart_index,
        canvas: CanvasConfig::default(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_chart_capture_clips_to_chart_bounds() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = StubLauncher::new().slide(2, SlideBehavior::Charts { count: 2, sized: true });
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let png = pipeline.capture_chart(&chart_request(1)).await?;
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

    let captures = stats.captures();
    assert_eq!(captures.len(), 1);
    match captures[0].kind {
        CaptureKind::Screenshot(clip) => {
            assert_eq!((clip.x, clip.y, clip.width, clip.height), (100.0, 50.0, 400.0, 300.0));
        }
        other => panic!("expected a screenshot, got {:?}", other),
    }
    assert_eq!(stats.live(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_missing_chart_is_reported() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let launcher = StubLauncher::new().slide(2, SlideBehavior::Charts { count: 2, sized: true });
    let stats = launcher.stats();
    let pipeline = pipeline(launcher);

    let err = pipeline.capture_chart(&chart_request(5)).await.err();
    assert!(matches!(err, Some(ExportError::ChartNotFound { index: 5, found: 2 })));
    assert_eq!(stats.live(), 0);
    Ok(())
}
