#![allow(dead_code)]

use lopdf::Document as LopdfDocument;
use slidepress_render::testing::{StubCapture, StubLauncher};
use slidepress::{
    CanvasConfig, ExportConfig, ExportJob, ExportPipeline, OutputFormat, PipelineBuilder, SlideSpec,
};
use std::io::{Cursor, Read};
use std::time::Duration;
use zip::ZipArchive;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Marker printed on every page the stub browser "captures".
pub fn page_marker(capture: &StubCapture) -> String {
    match (capture.fallback, capture.slide_index) {
        (true, Some(i)) => format!("Fallback {}", i + 1),
        (true, None) => "Fallback".to_string(),
        (false, Some(i)) => format!("Slide {}", i + 1),
        (false, None) => "Blank".to_string(),
    }
}

/// A stub launcher whose PDF captures are real single-page documents at the
/// default canvas size, labelled with [`page_marker`].
pub fn pdf_launcher() -> StubLauncher {
    StubLauncher::new().with_pdf(|capture| {
        let (w, h) = CanvasConfig::default().size_points();
        slidepress_pdf_composer::placeholder_page(w as f32, h as f32, &page_marker(capture), None)
            .unwrap_or_default()
    })
}

/// Short timeouts so failure paths finish quickly under paused time.
pub fn fast_config() -> ExportConfig {
    let mut config = ExportConfig::default();
    config.render.navigation_timeout = Duration::from_secs(2);
    config.render.content_timeout = Duration::from_secs(3);
    config.render.chart_timeout = Duration::from_secs(2);
    config.render.capture_timeout = Duration::from_secs(5);
    config.pdf_job_timeout = Duration::from_secs(120);
    config.pptx_job_timeout = Duration::from_secs(120);
    config
}

pub fn pipeline(launcher: StubLauncher) -> ExportPipeline {
    pipeline_with(launcher, fast_config())
}

pub fn pipeline_with(launcher: StubLauncher, config: ExportConfig) -> ExportPipeline {
    match PipelineBuilder::new().with_launcher(launcher).with_config(config).build() {
        Ok(pipeline) => pipeline,
        Err(e) => panic!("failed to build test pipeline: {}", e),
    }
}

pub fn slides(n: usize) -> Vec<SlideSpec> {
    (1..=n)
        .map(|i| SlideSpec::new(format!("slide-{}", i), "title-content").with_title(format!("Slide title {}", i)))
        .collect()
}

pub fn job(format: OutputFormat, n: usize) -> ExportJob {
    ExportJob::new("pres-1", "acme", format, slides(n)).with_title("Quarterly Review")
}

/// Wrapper around an exported PDF with helper methods.
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Decoded content stream of each page, in page order.
    pub fn page_contents(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let mut contents = Vec::new();
        for (_, page_id) in self.doc.get_pages() {
            let content = self.doc.get_page_content(page_id)?;
            contents.push(String::from_utf8_lossy(&content).into_owned());
        }
        Ok(contents)
    }
}

/// Reads parts of an exported PPTX archive.
pub struct GeneratedDeck {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl GeneratedDeck {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self { archive: ZipArchive::new(Cursor::new(bytes))? })
    }

    pub fn part(&mut self, name: &str) -> Result<String, Box<dyn std::error::Error>> {
        let mut file = self.archive.by_name(name)?;
        let mut out = String::new();
        file.read_to_string(&mut out)?;
        Ok(out)
    }

    pub fn slide_count(&self) -> usize {
        self.archive
            .file_names()
            .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
            .count()
    }

    pub fn media_count(&self) -> usize {
        self.archive.file_names().filter(|n| n.starts_with("ppt/media/")).count()
    }
}
