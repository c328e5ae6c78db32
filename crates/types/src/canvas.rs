use serde::{Deserialize, Serialize};

/// CSS pixels per inch, used when sizing printed pages.
pub const CSS_PIXELS_PER_INCH: f64 = 96.0;

/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

fn default_scale() -> f64 {
    1.0
}

/// The fixed pixel frame every slide is captured at.
///
/// `design_width` is the width the render target lays slides out at while
/// editing; the export scale transform maps that onto `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale")]
    pub device_scale_factor: f64,
    pub design_width: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            design_width: 1280,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Ratio of export width to the editor's design width.
    pub fn scale_factor(&self) -> f64 {
        if self.design_width == 0 {
            return 1.0;
        }
        self.width as f64 / self.design_width as f64
    }

    /// Height of the editor layout that, once scaled, fills the canvas exactly.
    pub fn design_height(&self) -> f64 {
        self.height as f64 / self.scale_factor()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn width_inches(&self) -> f64 {
        self.width as f64 / CSS_PIXELS_PER_INCH
    }

    pub fn height_inches(&self) -> f64 {
        self.height as f64 / CSS_PIXELS_PER_INCH
    }

    /// Canvas size in PDF points, as `(width, height)`.
    pub fn size_points(&self) -> (f64, f64) {
        (
            self.width_inches() * POINTS_PER_INCH,
            self.height_inches() * POINTS_PER_INCH,
        )
    }

    /// Largest accepted width, height or design width, in CSS pixels.
    pub const MAX_DIMENSION: u32 = 8192;

    /// Largest accepted device scale factor.
    pub const MAX_DEVICE_SCALE: f64 = 4.0;

    /// A canvas is usable when both sides and the scale are strictly positive
    /// and within [`Self::MAX_DIMENSION`] / [`Self::MAX_DEVICE_SCALE`].
    pub fn is_valid(&self) -> bool {
        let dimension = 1..=Self::MAX_DIMENSION;
        dimension.contains(&self.width)
            && dimension.contains(&self.height)
            && dimension.contains(&self.design_width)
            && self.device_scale_factor.is_finite()
            && self.device_scale_factor > 0.0
            && self.device_scale_factor <= Self::MAX_DEVICE_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_derived_from_design_width() {
        let canvas = CanvasConfig::default();
        assert!((canvas.scale_factor() - 1.5).abs() < f64::EPSILON);
        assert!((canvas.design_height() - 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_size_points_for_full_hd() {
        let (w, h) = CanvasConfig::default().size_points();
        assert!((w - 1440.0).abs() < 1e-9);
        assert!((h - 810.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_canvas() {
        assert!(!CanvasConfig::new(0, 1080).is_valid());
        let mut canvas = CanvasConfig::default();
        canvas.device_scale_factor = 0.0;
        assert!(!canvas.is_valid());
    }

    #[test]
    fn test_oversized_canvas_is_invalid() {
        assert!(CanvasConfig::new(CanvasConfig::MAX_DIMENSION, CanvasConfig::MAX_DIMENSION).is_valid());
        assert!(!CanvasConfig::new(100_000, 1080).is_valid());
        assert!(!CanvasConfig::new(1920, u32::MAX).is_valid());

        let mut canvas = CanvasConfig::default();
        canvas.device_scale_factor = 50.0;
        assert!(!canvas.is_valid());
    }
}
