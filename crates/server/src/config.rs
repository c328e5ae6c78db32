use serde::Deserialize;
use slidepress::{
    BrowserConfig, CanvasConfig, ExportConfig, ExportError, PollPolicy, RenderOptions, RenderTarget, Selectors,
    SettlePolicy, TargetMode,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub render_target: RenderTargetConfig,
    pub browser: BrowserSection,
    pub canvas: CanvasSection,
    pub timing: TimingConfig,
    pub selectors: Selectors,
    pub concurrency: ConcurrencyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3001, max_request_size_mb: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderTargetConfig {
    pub mode: TargetMode,
    pub production_url: String,
    pub development_url: String,
    /// Overrides the mode-selected URL when set.
    pub base_url: Option<String>,
    pub path: String,
}

impl Default for RenderTargetConfig {
    fn default() -> Self {
        Self {
            mode: TargetMode::Development,
            production_url: "https://app.slidepress.io".to_string(),
            development_url: slidepress::pipeline::DEFAULT_TARGET_URL.to_string(),
            base_url: None,
            path: RenderTarget::DEFAULT_PATH.to_string(),
        }
    }
}

impl RenderTargetConfig {
    pub fn target(&self) -> Result<RenderTarget, ExportError> {
        let target = match &self.base_url {
            Some(base) if !base.trim().is_empty() => RenderTarget::new(base, &self.path),
            _ => RenderTarget::for_mode(self.mode, &self.production_url, &self.development_url, &self.path),
        };
        target.map_err(|e| ExportError::Config(format!("Invalid render target URL: {}", e)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasSection {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    /// Width the editor lays slides out at.
    pub design_width: u32,
}

impl Default for CanvasSection {
    fn default() -> Self {
        let canvas = CanvasConfig::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            device_scale_factor: canvas.device_scale_factor,
            design_width: canvas.design_width,
        }
    }
}

impl From<&CanvasSection> for CanvasConfig {
    fn from(section: &CanvasSection) -> Self {
        CanvasConfig {
            width: section.width,
            height: section.height,
            device_scale_factor: section.device_scale_factor,
            design_width: section.design_width,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    pub chrome_path: Option<PathBuf>,
    pub sandbox: bool,
    pub user_agent: Option<String>,
    pub viewport_margin: u32,
    pub idle_timeout_secs: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        let defaults = BrowserConfig::default();
        Self {
            chrome_path: None,
            sandbox: defaults.sandbox,
            user_agent: None,
            viewport_margin: defaults.viewport_margin,
            idle_timeout_secs: defaults.idle_timeout.as_secs(),
        }
    }
}

/// Every timing knob, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub navigation_timeout_ms: u64,
    pub content_timeout_ms: u64,
    pub chart_timeout_ms: u64,
    pub capture_timeout_ms: u64,
    pub base_settle_delay_ms: u64,
    pub chart_settle_delay_ms: u64,
    pub per_extra_chart_ms: u64,
    pub max_settle_delay_ms: u64,
    pub poll_initial_ms: u64,
    pub poll_max_ms: u64,
    pub pdf_job_timeout_ms: u64,
    pub pptx_job_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 15_000,
            content_timeout_ms: 10_000,
            chart_timeout_ms: 12_000,
            capture_timeout_ms: 30_000,
            base_settle_delay_ms: 1_000,
            chart_settle_delay_ms: 2_000,
            per_extra_chart_ms: 500,
            max_settle_delay_ms: 3_500,
            poll_initial_ms: 100,
            poll_max_ms: 500,
            pdf_job_timeout_ms: 300_000,
            pptx_job_timeout_ms: 300_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Browser sessions allowed to run at once across all routes.
    pub max_sessions: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_sessions: 4 }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Explicit file first, then the conventional location.
        let explicit = std::env::var("SLIDEPRESS_CONFIG").ok().filter(|p| !p.is_empty());
        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::with_name(&path));
            }
            None => {
                builder = builder.add_source(config::File::with_name("config/default").required(false));
            }
        }

        // Environment wins, e.g. SLIDEPRESS__RENDER_TARGET__MODE=production
        builder = builder.add_source(config::Environment::with_prefix("SLIDEPRESS").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Library-level settings for the export pipeline.
    pub fn export_config(&self) -> ExportConfig {
        let t = &self.timing;
        let ms = Duration::from_millis;
        let browser_defaults = BrowserConfig::default();

        ExportConfig {
            canvas: CanvasConfig::from(&self.canvas),
            browser: BrowserConfig {
                executable: self.browser.chrome_path.clone(),
                sandbox: self.browser.sandbox,
                user_agent: self.browser.user_agent.clone().unwrap_or(browser_defaults.user_agent),
                viewport_margin: self.browser.viewport_margin,
                idle_timeout: Duration::from_secs(self.browser.idle_timeout_secs),
            },
            render: RenderOptions {
                navigation_timeout: ms(t.navigation_timeout_ms),
                content_timeout: ms(t.content_timeout_ms),
                chart_timeout: ms(t.chart_timeout_ms),
                capture_timeout: ms(t.capture_timeout_ms),
                settle: SettlePolicy {
                    base_settle_delay: ms(t.base_settle_delay_ms),
                    chart_settle_delay: ms(t.chart_settle_delay_ms),
                    per_extra_chart: ms(t.per_extra_chart_ms),
                    max_settle_delay: ms(t.max_settle_delay_ms),
                },
                poll: PollPolicy {
                    initial_interval: ms(t.poll_initial_ms),
                    max_interval: ms(t.poll_max_ms.max(t.poll_initial_ms)),
                    ..PollPolicy::default()
                },
                selectors: self.selectors.clone(),
            },
            pdf_job_timeout: ms(t.pdf_job_timeout_ms),
            pptx_job_timeout: ms(t.pptx_job_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = Config::default().export_config();
        let library = ExportConfig::default();

        assert_eq!(config.canvas, library.canvas);
        assert_eq!(config.browser, library.browser);
        assert_eq!(config.render.navigation_timeout, library.render.navigation_timeout);
        assert_eq!(config.render.content_timeout, library.render.content_timeout);
        assert_eq!(config.render.chart_timeout, library.render.chart_timeout);
        assert_eq!(config.render.settle.max_settle_delay, Duration::from_millis(3_500));
        assert_eq!(config.pdf_job_timeout, library.pdf_job_timeout);
    }

    #[test]
    fn test_target_follows_mode_unless_overridden() {
        let mut section = RenderTargetConfig { mode: TargetMode::Production, ..Default::default() };
        let target = section.target().map_err(|e| e.to_string());
        assert_eq!(
            target.map(|t| t.base().as_str().to_string()),
            Ok("https://app.slidepress.io/export/slide".to_string())
        );

        section.base_url = Some("http://render.internal:8080".to_string());
        let target = section.target().map_err(|e| e.to_string());
        assert_eq!(
            target.map(|t| t.base().as_str().to_string()),
            Ok("http://render.internal:8080/export/slide".to_string())
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[timing]\ncontent_timeout_ms = 2500\n[concurrency]\nmax_sessions = 2\n",
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();

        assert_eq!(parsed.concurrency.max_sessions, 2);
        assert_eq!(parsed.timing.content_timeout_ms, 2500);
        assert_eq!(parsed.timing.navigation_timeout_ms, 15_000);
        assert_eq!(parsed.export_config().render.content_timeout, Duration::from_millis(2500));
    }
}
