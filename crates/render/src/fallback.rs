//! Inert stand-in page captured when a slide cannot be rendered.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use slidepress_types::{CanvasConfig, SlideId};

/// Self-contained HTML naming the slide by ordinal and id.
///
/// The page carries `data-slide-ordinal` / `data-slide-id` markers so the
/// position of a placeholder in the final document can be verified.
pub fn fallback_document(ordinal: usize, slide_id: &SlideId, canvas: &CanvasConfig) -> String {
    let id = escape_html(slide_id.as_str());
    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Slide {ordinal}</title>
<style>
html, body {{ margin: 0; padding: 0; width: {w}px; height: {h}px; overflow: hidden; }}
body {{ display: flex; flex-direction: column; align-items: center; justify-content: center;
  background: #f2f2f2; color: #333333; font-family: Helvetica, Arial, sans-serif; }}
h1 {{ font-size: 72px; margin: 0 0 24px 0; }}
p {{ font-size: 28px; margin: 0; color: #777777; }}
@page {{ size: {w}px {h}px; margin: 0; }}
</style></head>
<body data-slide-ordinal="{ordinal}" data-slide-id="{id}">
<h1>Slide {ordinal}</h1>
<p>This slide could not be rendered ({id})</p>
</body></html>"#,
        ordinal = ordinal,
        id = id,
        w = canvas.width,
        h = canvas.height,
    )
}

/// [`fallback_document`] as a `data:` URL, so loading it needs no network.
pub fn fallback_url(ordinal: usize, slide_id: &SlideId, canvas: &CanvasConfig) -> String {
    let html = fallback_document(ordinal, slide_id, canvas);
    format!("data:text/html;base64,{}", STANDARD.encode(html))
}

pub fn is_fallback_url(url: &str) -> bool {
    url.starts_with("data:text/html")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
