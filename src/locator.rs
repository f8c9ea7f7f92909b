//! Overlay variant selection and footprint placement.
//!
//! The generator stamps its logo at one of two fixed sizes, anchored to the
//! bottom-right corner. Nothing here inspects pixels: the variant and the
//! footprint are pure functions of the image dimensions.

/// Images must exceed this on both axes to carry the large overlay.
const LARGE_MIN_EXCLUSIVE: u32 = 1024;

/// Watermark size classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatermarkSize {
    /// 48x48 logo, 32px margins (images where either dimension <= 1024).
    Small,
    /// 96x96 logo, 64px margins (images where both dimensions > 1024).
    Large,
}

impl WatermarkSize {
    /// Placement parameters for this variant.
    #[must_use]
    pub const fn config(self) -> OverlayConfig {
        match self {
            Self::Small => OverlayConfig {
                logo_size: 48,
                margin_right: 32,
                margin_bottom: 32,
            },
            Self::Large => OverlayConfig {
                logo_size: 96,
                margin_right: 64,
                margin_bottom: 64,
            },
        }
    }
}

/// Logo size and distance from the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Edge length of the square logo, in pixels.
    pub logo_size: u32,
    /// Gap between the logo and the right edge.
    pub margin_right: u32,
    /// Gap between the logo and the bottom edge.
    pub margin_bottom: u32,
}

/// Rectangle the overlay is expected to occupy, in image coordinates.
///
/// `x` and `y` go negative when the image is smaller than margin plus logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Footprint {
    /// Whether the whole rectangle lies inside a `width` x `height` image.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + i64::from(self.width) <= i64::from(width)
            && self.y + i64::from(self.height) <= i64::from(height)
    }
}

/// Pick the overlay variant for an image of the given dimensions.
///
/// - **Large**: both width AND height > 1024
/// - **Small**: otherwise (including exactly 1024x1024)
#[must_use]
pub fn watermark_size_for(width: u32, height: u32) -> WatermarkSize {
    if width > LARGE_MIN_EXCLUSIVE && height > LARGE_MIN_EXCLUSIVE {
        WatermarkSize::Large
    } else {
        WatermarkSize::Small
    }
}

/// Placement parameters for an image of the given dimensions.
#[must_use]
pub fn detect_config(width: u32, height: u32) -> OverlayConfig {
    watermark_size_for(width, height).config()
}

/// Where the logo sits on a `width` x `height` image under `config`.
#[must_use]
pub fn compute_footprint(width: u32, height: u32, config: OverlayConfig) -> Footprint {
    let logo = i64::from(config.logo_size);
    Footprint {
        x: i64::from(width) - i64::from(config.margin_right) - logo,
        y: i64::from(height) - i64::from(config.margin_bottom) - logo,
        width: config.logo_size,
        height: config.logo_size,
    }
}
