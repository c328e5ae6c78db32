//! Document Assembler: ordered slide artifacts in, one deliverable out.

use crate::error::ExportError;
use slidepress_pdf_composer::{merge_pages, placeholder_page};
use slidepress_pptx::{DeckBuilder, SlideSize};
use slidepress_types::{
    ArtifactPayload, CanvasConfig, ExportJob, ExportResult, OutputFormat, SlideArtifact,
};

pub const DEFAULT_FILENAME_STEM: &str = "presentation";

/// Combines `artifacts` into the job's output format.
///
/// There must be exactly one artifact per slide, in slide order. A single
/// PDF artifact is returned byte-for-byte without going through the merger.
pub fn assemble(job: &ExportJob, artifacts: Vec<SlideArtifact>) -> Result<ExportResult, ExportError> {
    if artifacts.is_empty() {
        return Err(ExportError::Assembly("No slide artifacts to assemble".to_string()));
    }
    if artifacts.len() != job.slides.len() {
        return Err(ExportError::Assembly(format!(
            "Expected {} slide artifacts, got {}",
            job.slides.len(),
            artifacts.len()
        )));
    }
    if let Some((index, artifact)) = artifacts
        .iter()
        .enumerate()
        .find(|(i, a)| a.ordinal != i + 1 || a.slide_id != job.slides[*i].id)
    {
        return Err(ExportError::Assembly(format!(
            "Artifact at position {} belongs to slide {} ({})",
            index + 1,
            artifact.ordinal,
            artifact.slide_id
        )));
    }

    let page_count = artifacts.len();
    let fallback_count = artifacts.iter().filter(|a| a.is_fallback()).count();
    let bytes = match job.format {
        OutputFormat::Pdf => assemble_pdf(&job.canvas, artifacts)?,
        OutputFormat::Pptx => assemble_pptx(job, artifacts)?,
    };

    log::info!(
        "Assembled {} ({} pages, {} fallback, {} bytes)",
        job.format.extension(),
        page_count,
        fallback_count,
        bytes.len()
    );
    Ok(ExportResult {
        bytes,
        format: job.format,
        filename: export_filename(job.title.as_deref(), job.format),
        page_count,
        fallback_count,
    })
}

fn assemble_pdf(canvas: &CanvasConfig, artifacts: Vec<SlideArtifact>) -> Result<Vec<u8>, ExportError> {
    let (width, height) = canvas.size_points();
    let mut pages = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let page = match artifact.payload {
            ArtifactPayload::Pdf(bytes) => bytes,
            ArtifactPayload::Unavailable => {
                log::debug!("Synthesising placeholder page for slide {}", artifact.ordinal);
                placeholder_page(
                    width as f32,
                    height as f32,
                    &format!("Slide {}", artifact.ordinal),
                    Some(artifact.slide_id.as_str()),
                )?
            }
            ArtifactPayload::Image(_) => {
                return Err(ExportError::Assembly(format!(
                    "Slide {} was captured as an image, expected a PDF page",
                    artifact.ordinal
                )));
            }
        };
        pages.push(page);
    }

    if pages.len() == 1 {
        return Ok(pages.remove(0));
    }
    Ok(merge_pages(&pages)?)
}

fn assemble_pptx(job: &ExportJob, artifacts: Vec<SlideArtifact>) -> Result<Vec<u8>, ExportError> {
    let mut deck = DeckBuilder::new(SlideSize::for_canvas(job.canvas.width, job.canvas.height));
    if let Some(title) = &job.title {
        deck = deck.with_title(title.clone());
    }

    for artifact in artifacts {
        match artifact.payload {
            ArtifactPayload::Image(bytes) => {
                deck.add_image_slide(bytes)?;
            }
            ArtifactPayload::Unavailable => {
                let detail = format!(
                    "Slide {} could not be rendered ({})",
                    artifact.ordinal, artifact.slide_id
                );
                deck.add_text_slide(artifact.display_title(), Some(&detail));
            }
            ArtifactPayload::Pdf(_) => {
                return Err(ExportError::Assembly(format!(
                    "Slide {} was captured as a PDF page, expected an image",
                    artifact.ordinal
                )));
            }
        }
    }

    Ok(deck.build()?)
}

/// `<slug of title>.<ext>`, or `presentation.<ext>` when the title is
/// missing or slugs to nothing.
pub fn export_filename(title: Option<&str>, format: OutputFormat) -> String {
    let stem = title
        .map(slug::slugify)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_FILENAME_STEM.to_string());
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidepress_types::{SlideId, SlideSpec};

    fn job(format: OutputFormat, n: usize) -> ExportJob {
        let slides = (1..=n).map(|i| SlideSpec::new(format!("s{}", i), "content")).collect();
        ExportJob::new("p", "w", format, slides)
    }

    #[test]
    fn test_filename_from_title() {
        assert_eq!(export_filename(Some("Q3 Board Review!"), OutputFormat::Pdf), "q3-board-review.pdf");
        assert_eq!(export_filename(None, OutputFormat::Pptx), "presentation.pptx");
        assert_eq!(export_filename(Some("  ***  "), OutputFormat::Pdf), "presentation.pdf");
    }

    #[test]
    fn test_single_pdf_page_is_returned_unmodified() {
        let page = placeholder_page(1440.0, 810.0, "only", None).unwrap();
        let artifact = SlideArtifact::rendered(SlideId::new("s1"), 1, None, ArtifactPayload::Pdf(page.clone()));

        let result = assemble(&job(OutputFormat::Pdf, 1), vec![artifact]).unwrap();
        assert_eq!(result.bytes, page);
        assert_eq!(result.page_count, 1);
        assert_eq!(result.content_type(), "application/pdf");
    }

    #[test]
    fn test_missing_artifact_is_assembly_error() {
        let artifact = SlideArtifact::rendered(SlideId::new("s1"), 1, None, ArtifactPayload::Unavailable);
        let err = assemble(&job(OutputFormat::Pdf, 2), vec![artifact]).unwrap_err();
        assert!(matches!(err, ExportError::Assembly(_)));

        let err = assemble(&job(OutputFormat::Pdf, 2), Vec::new()).unwrap_err();
        assert!(matches!(err, ExportError::Assembly(_)));
    }

    #[test]
    fn test_out_of_order_artifacts_rejected() {
        let a = SlideArtifact::rendered(SlideId::new("s2"), 2, None, ArtifactPayload::Unavailable);
        let b = SlideArtifact::rendered(SlideId::new("s1"), 1, None, ArtifactPayload::Unavailable);
        assert!(assemble(&job(OutputFormat::Pdf, 2), vec![a, b]).is_err());
    }

    #[test]
    fn test_unavailable_pptx_slide_becomes_text_slide() {
        let artifact = SlideArtifact::fallback(
            SlideId::new("s1"),
            1,
            Some("Revenue".into()),
            ArtifactPayload::Unavailable,
            "timed out",
        );
        let result = assemble(&job(OutputFormat::Pptx, 1), vec![artifact]).unwrap();
        assert_eq!(result.fallback_count, 1);
        assert_eq!(result.filename, "presentation.pptx");
        assert!(result.bytes.starts_with(b"PK"));
    }
}
