use crate::ids::SlideId;
use crate::job::OutputFormat;

/// The captured bytes for one slide.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactPayload {
    /// A PNG screenshot of the canvas (PPTX jobs).
    Image(Vec<u8>),
    /// A single-page PDF sized to the canvas (PDF jobs).
    Pdf(Vec<u8>),
    /// Neither the slide nor its placeholder could be captured. The assembler
    /// synthesises a placeholder page or text slide instead.
    Unavailable,
}

impl ArtifactPayload {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ArtifactPayload::Unavailable)
    }

    pub fn len(&self) -> usize {
        match self {
            ArtifactPayload::Image(bytes) | ArtifactPayload::Pdf(bytes) => bytes.len(),
            ArtifactPayload::Unavailable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether the artifact shows the real slide or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Rendered,
    Fallback { reason: String },
}

/// The visual result for one slide, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideArtifact {
    pub slide_id: SlideId,
    /// 1-based position of the slide in the job.
    pub ordinal: usize,
    pub title: Option<String>,
    pub payload: ArtifactPayload,
    pub status: ArtifactStatus,
}

impl SlideArtifact {
    pub fn rendered(
        slide_id: SlideId,
        ordinal: usize,
        title: Option<String>,
        payload: ArtifactPayload,
    ) -> Self {
        Self {
            slide_id,
            ordinal,
            title,
            payload,
            status: ArtifactStatus::Rendered,
        }
    }

    pub fn fallback(
        slide_id: SlideId,
        ordinal: usize,
        title: Option<String>,
        payload: ArtifactPayload,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            slide_id,
            ordinal,
            title,
            payload,
            status: ArtifactStatus::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.status, ArtifactStatus::Fallback { .. })
    }

    /// Text shown on a synthesised placeholder: the slide title, or "Slide N".
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Slide {}", self.ordinal),
        }
    }
}

/// The final binary payload and how to serve it.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub filename: String,
    pub page_count: usize,
    pub fallback_count: usize,
}

impl ExportResult {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
