use crate::canvas::CanvasConfig;
use crate::ids::SlideId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The document format an export job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Pptx,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Pptx => "pptx",
        }
    }
}

/// One slide's serializable description.
///
/// `blocks` are opaque to the export pipeline: they are forwarded to the render
/// target untouched and never inspected or mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    pub id: SlideId,
    pub layout: String,
    #[serde(default)]
    pub blocks: Vec<Value>,
    /// Optional human title, used for text-only fallback slides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SlideSpec {
    pub fn new(id: impl Into<SlideId>, layout: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layout: layout.into(),
            blocks: Vec::new(),
            title: None,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Value>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The unit of work: one presentation exported to one format.
///
/// Created per request and dropped once the response is written.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub presentation_id: String,
    pub workspace_id: String,
    pub title: Option<String>,
    pub slides: Vec<SlideSpec>,
    pub format: OutputFormat,
    pub canvas: CanvasConfig,
}

impl ExportJob {
    pub fn new(
        presentation_id: impl Into<String>,
        workspace_id: impl Into<String>,
        format: OutputFormat,
        slides: Vec<SlideSpec>,
    ) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            workspace_id: workspace_id.into(),
            title: None,
            slides,
            format,
            canvas: CanvasConfig::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slide_spec_from_request_json() {
        let slide: SlideSpec = serde_json::from_value(json!({
            "id": "a1",
            "layout": "title-and-chart",
            "blocks": [{ "type": "chart", "series": [1, 2, 3] }]
        }))
        .unwrap();

        assert_eq!(slide.id.as_str(), "a1");
        assert_eq!(slide.blocks.len(), 1);
        assert!(slide.title.is_none());
    }

    #[test]
    fn test_slide_spec_blocks_default_to_empty() {
        let slide: SlideSpec =
            serde_json::from_value(json!({ "id": "a1", "layout": "blank" })).unwrap();
        assert!(slide.blocks.is_empty());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Pdf.content_type(), "application/pdf");
        assert!(OutputFormat::Pptx.content_type().ends_with("presentationml.presentation"));
    }
}
