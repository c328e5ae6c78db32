//! The stylesheet that turns the live editor page into a fixed export frame.
//!
//! The page is reused across slides, so the stylesheet is installed again
//! after every navigation instead of once per session.

use serde::{Deserialize, Serialize};
use slidepress_types::CanvasConfig;

/// DOM markers the render target exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Root content container of a rendered slide.
    pub root: String,
    /// Chart surface element.
    pub chart: String,
    /// Wrapper that sizes a chart from its parent.
    pub responsive_container: String,
    /// Editor-only UI to hide during export.
    pub editor_chrome: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            root: "[data-export-root]".to_string(),
            chart: ".recharts-surface".to_string(),
            responsive_container: ".recharts-responsive-container".to_string(),
            editor_chrome: [
                "[data-editor-chrome]",
                ".slide-toolbar",
                ".selection-handle",
                ".slide-navigation",
                "nav",
                "header",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportStyle {
    css: String,
    root_selector: String,
    scale: f64,
}

impl ExportStyle {
    pub const ELEMENT_ID: &'static str = "slidepress-export-style";

    /// Builds the stylesheet for `canvas`.
    ///
    /// The root element is laid out at the editor's design width and scaled
    /// by `canvas.width / canvas.design_width` from its top-left corner, so it
    /// fills the canvas exactly.
    pub fn new(canvas: &CanvasConfig, selectors: &Selectors) -> Self {
        let scale = canvas.scale_factor();
        let mut css = String::new();

        if !selectors.editor_chrome.is_empty() {
            css.push_str(&selectors.editor_chrome.join(", "));
            css.push_str(" { display: none !important; }\n");
        }
        css.push_str(&format!(
            "html, body {{ margin: 0 !important; padding: 0 !important; \
             width: {w}px !important; height: {h}px !important; \
             overflow: hidden !important; background: #ffffff; }}\n",
            w = canvas.width,
            h = canvas.height,
        ));
        css.push_str(&format!(
            "{root} {{ position: absolute !important; top: 0 !important; left: 0 !important; \
             margin: 0 !important; width: {dw}px !important; height: {dh}px !important; \
             transform: scale({scale}) !important; transform-origin: top left !important; }}\n",
            root = selectors.root,
            dw = canvas.design_width,
            dh = format_px(canvas.design_height()),
            scale = format_px(scale),
        ));
        css.push_str("@page { size: ");
        css.push_str(&format!("{}px {}px; margin: 0; }}\n", canvas.width, canvas.height));

        Self { css, root_selector: selectors.root.clone(), scale }
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn root_selector(&self) -> &str {
        &self.root_selector
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Trims float noise so the stylesheet stays stable across runs.
fn format_px(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_derived_from_design_width() {
        let canvas = CanvasConfig::default();
        let style = ExportStyle::new(&canvas, &Selectors::default());

        assert_eq!(style.scale(), 1.5);
        assert!(style.css().contains("transform: scale(1.5)"));
        assert!(style.css().contains("width: 1280px"));
        assert!(style.css().contains("height: 720px"));
        assert!(style.css().contains("width: 1920px !important; height: 1080px"));
        assert!(style.css().contains("transform-origin: top left"));
    }

    #[test]
    fn test_editor_chrome_is_hidden() {
        let selectors = Selectors {
            editor_chrome: vec![".toolbar".into(), ".handles".into()],
            ..Selectors::default()
        };
        let style = ExportStyle::new(&CanvasConfig::default(), &selectors);
        assert!(style.css().starts_with(".toolbar, .handles { display: none !important; }"));
    }

    #[test]
    fn test_non_integral_scale() {
        let canvas = CanvasConfig { design_width: 1366, ..CanvasConfig::new(1920, 1080) };
        let style = ExportStyle::new(&canvas, &Selectors::default());
        assert!(style.css().contains("transform: scale(1.4056)"));
    }
}
