//! In-page scripts the renderer evaluates, with typed results.
//!
//! Every script returns `JSON.stringify(...)` of its result so drivers only
//! need to hand back a string; [`decode`] turns that into a `Value`.

use crate::style::ExportStyle;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub enum Probe<'a> {
    /// `{ ready, resources }`: document load state and the number of
    /// resource timing entries seen so far.
    DocumentState,
    /// `true` once `root` exists and has at least one child element.
    ContentReady { root: &'a str },
    /// Number of charts on the slide: the larger of the `chart` surface count
    /// and the `container` count, so charts whose surface has not mounted yet
    /// still register.
    ChartCount { chart: &'a str, container: &'a str },
    /// `true` once every chart surface has a non-zero bounding box and every
    /// responsive container a non-zero offset size.
    ChartsSized { chart: &'a str, container: &'a str },
    /// Installs the export stylesheet; `true` if the root element was found.
    ApplyExportStyle(&'a ExportStyle),
    /// `{ x, y, width, height }` of the `index`-th chart surface, or `null`.
    ChartBounds { chart: &'a str, index: usize },
}

impl Probe<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Probe::DocumentState => "document-state",
            Probe::ContentReady { .. } => "content-ready",
            Probe::ChartCount { .. } => "chart-count",
            Probe::ChartsSized { .. } => "charts-sized",
            Probe::ApplyExportStyle(_) => "apply-export-style",
            Probe::ChartBounds { .. } => "chart-bounds",
        }
    }

    /// The expression to evaluate in the page.
    pub fn script(&self) -> String {
        let body = match self {
            Probe::DocumentState => "return { \
                    ready: document.readyState === 'complete', \
                    resources: performance.getEntriesByType('resource').length \
                };"
            .to_string(),
            Probe::ContentReady { root } => format!(
                "const root = document.querySelector({}); \
                 return !!root && root.childElementCount > 0;",
                js_string(root)
            ),
            Probe::ChartCount { chart, container } => format!(
                "return Math.max(document.querySelectorAll({}).length, document.querySelectorAll({}).length);",
                js_string(chart),
                js_string(container)
            ),
            Probe::ChartsSized { chart, container } => format!(
                "const charts = Array.from(document.querySelectorAll({})); \
                 const containers = Array.from(document.querySelectorAll({})); \
                 return charts.every(c => {{ const r = c.getBoundingClientRect(); return r.width > 0 && r.height > 0; }}) \
                     && containers.every(c => c.offsetWidth > 0 && c.offsetHeight > 0);",
                js_string(chart),
                js_string(container)
            ),
            Probe::ApplyExportStyle(style) => format!(
                "const previous = document.getElementById({id}); \
                 if (previous) previous.remove(); \
                 const el = document.createElement('style'); \
                 el.id = {id}; \
                 el.textContent = {css}; \
                 (document.head || document.documentElement).appendChild(el); \
                 return !!document.querySelector({root});",
                id = js_string(ExportStyle::ELEMENT_ID),
                css = js_string(style.css()),
                root = js_string(style.root_selector()),
            ),
            Probe::ChartBounds { chart, index } => format!(
                "const el = document.querySelectorAll({})[{}]; \
                 if (!el) return null; \
                 const r = el.getBoundingClientRect(); \
                 return {{ x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height }};",
                js_string(chart),
                index
            ),
        };
        format!("JSON.stringify((() => {{ {} }})())", body)
    }
}

/// Decodes what a driver got back from evaluating [`Probe::script`].
///
/// A JSON string is parsed; anything else (including an already-structured
/// value) is passed through.
pub fn decode(raw: Option<Value>) -> Value {
    match raw {
        Some(Value::String(text)) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Some(value) => value,
        None => Value::Null,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DocumentState {
    pub ready: bool,
    pub resources: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

fn js_string(text: &str) -> String {
    // A JSON string literal is a valid JavaScript string literal.
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
