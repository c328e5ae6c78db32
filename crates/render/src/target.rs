//! Where slides are rendered: the editor application in export mode.

use serde::{Deserialize, Serialize};
use slidepress_types::SlideSpec;
use url::Url;

/// Deployment mode, used only to pick the render target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    Production,
    #[default]
    Development,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    base: Url,
}

impl RenderTarget {
    pub const DEFAULT_PATH: &'static str = "/export/slide";

    /// `path` appended below `base_url`, e.g. `https://host/app` + `/export/slide`
    /// gives `https://host/app/export/slide`. Any path prefix on the base is kept.
    pub fn new(base_url: &str, path: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let base = base.join(path.trim_start_matches('/'))?;
        Ok(Self { base })
    }

    pub fn for_mode(
        mode: TargetMode,
        production_url: &str,
        development_url: &str,
        path: &str,
    ) -> Result<Self, url::ParseError> {
        match mode {
            TargetMode::Production => Self::new(production_url, path),
            TargetMode::Development => Self::new(development_url, path),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL rendering one slide in export mode, with the slide inlined as JSON.
    pub fn slide_url(
        &self,
        presentation_id: &str,
        workspace: &str,
        slide_index: usize,
        slide: &SlideSpec,
    ) -> Result<Url, serde_json::Error> {
        let slide_data = serde_json::to_string(slide)?;
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("presentationId", presentation_id)
            .append_pair("workspace", workspace)
            .append_pair("slideIndex", &slide_index.to_string())
            .append_pair("export", "true")
            .append_pair("slideData", &slide_data);
        Ok(url)
    }
}

/// Reads `slideIndex` back out of a slide URL.
pub fn slide_index_of(url: &str) -> Option<usize> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "slideIndex")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slide_url_parameters() {
        let target = RenderTarget::new("http://localhost:3000", RenderTarget::DEFAULT_PATH).unwrap();
        let slide = SlideSpec::new("s-1", "title").with_blocks(vec![json!({"type": "text", "text": "a&b"})]);
        let url = target.slide_url("p-9", "ws 1", 2, &slide).unwrap();

        assert_eq!(url.path(), "/export/slide");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("presentationId".into(), "p-9".into())));
        assert!(pairs.contains(&("workspace".into(), "ws 1".into())));
        assert!(pairs.contains(&("slideIndex".into(), "2".into())));
        assert!(pairs.contains(&("export".into(), "true".into())));

        let data = &pairs.iter().find(|(k, _)| k == "slideData").unwrap().1;
        let decoded: SlideSpec = serde_json::from_str(data).unwrap();
        assert_eq!(decoded, slide);
        assert_eq!(slide_index_of(url.as_str()), Some(2));
    }

    #[test]
    fn test_mode_picks_host() {
        let target = RenderTarget::for_mode(
            TargetMode::Production,
            "https://app.example.com",
            "http://localhost:3000",
            RenderTarget::DEFAULT_PATH,
        )
        .unwrap();
        assert_eq!(target.base().as_str(), "https://app.example.com/export/slide");
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        for base in ["https://host/app", "https://host/app/"] {
            let target = RenderTarget::new(base, RenderTarget::DEFAULT_PATH).unwrap();
            assert_eq!(target.base().as_str(), "https://host/app/export/slide");
        }

        let relative = RenderTarget::new("https://host/tenant/app", "export/slide").unwrap();
        assert_eq!(relative.base().path(), "/tenant/app/export/slide");

        let local = RenderTarget::new("http://localhost:3000", RenderTarget::DEFAULT_PATH).unwrap();
        assert_eq!(local.base().as_str(), "http://localhost:3000/export/slide");
    }
}
