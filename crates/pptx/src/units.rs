//! DrawingML geometry in English Metric Units.

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Width of PowerPoint's widescreen (13.333in) slide.
pub const WIDESCREEN_WIDTH_EMU: i64 = 12_192_000;

/// Height of PowerPoint's widescreen (7.5in) slide.
pub const WIDESCREEN_HEIGHT_EMU: i64 = 6_858_000;

/// Slide dimensions of a presentation, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub cx: i64,
    pub cy: i64,
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::widescreen()
    }
}

impl SlideSize {
    pub fn new(cx: i64, cy: i64) -> Self {
        Self { cx, cy }
    }

    /// The 16:9 widescreen size PowerPoint uses by default.
    pub fn widescreen() -> Self {
        Self { cx: WIDESCREEN_WIDTH_EMU, cy: WIDESCREEN_HEIGHT_EMU }
    }

    /// Keeps the widescreen width and derives the height from a pixel canvas,
    /// so the slide has exactly the canvas aspect ratio.
    pub fn for_canvas(width_px: u32, height_px: u32) -> Self {
        if width_px == 0 || height_px == 0 {
            return Self::widescreen();
        }
        let cy = (WIDESCREEN_WIDTH_EMU as i128 * height_px as i128 + width_px as i128 / 2)
            / width_px as i128;
        Self { cx: WIDESCREEN_WIDTH_EMU, cy: cy as i64 }
    }

    pub fn is_valid(&self) -> bool {
        self.cx > 0 && self.cy > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_hd_canvas_is_widescreen() {
        assert_eq!(SlideSize::for_canvas(1920, 1080), SlideSize::widescreen());
    }

    #[test]
    fn test_four_by_three_canvas() {
        let size = SlideSize::for_canvas(1024, 768);
        assert_eq!(size.cx, WIDESCREEN_WIDTH_EMU);
        assert_eq!(size.cy, 9_144_000);
    }
}
