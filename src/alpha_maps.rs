//! Embedded reference captures of the overlay.
//!
//! Each capture is the sparkle logo rendered over a black backdrop, so the
//! brightest channel of every pixel is proportional to the overlay opacity.

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::locator::WatermarkSize;

/// 48x48 capture used for the small variant.
pub const BG_48_PNG: &[u8] = include_bytes!("../assets/bg_48.png");

/// 96x96 capture used for the large variant.
pub const BG_96_PNG: &[u8] = include_bytes!("../assets/bg_96.png");

/// Supplies decoded reference captures to the engine.
///
/// The engine asks for each size at most once and caches the alpha map it
/// builds from the result.
pub trait CaptureSource: Send + Sync {
    /// Decode the capture for `size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture cannot be decoded.
    fn capture(&self, size: WatermarkSize) -> Result<RgbaImage>;
}

/// The captures bundled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedCaptures;

impl CaptureSource for EmbeddedCaptures {
    fn capture(&self, size: WatermarkSize) -> Result<RgbaImage> {
        let bytes = match size {
            WatermarkSize::Small => BG_48_PNG,
            WatermarkSize::Large => BG_96_PNG,
        };
        let img = image::load_from_memory(bytes)
            .map_err(Error::AlphaMapDecode)?
            .to_rgba8();
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha_map::AlphaMap;

    fn assert_byte_alpha(map: &AlphaMap, row: u32, col: u32, byte: u8) {
        let got = map.get(row, col).unwrap();
        let want = f32::from(byte) / 255.0;
        assert!(
            (got - want).abs() < 1e-6,
            "({row},{col}) = {got}, expected {byte}/255"
        );
    }

    #[test]
    fn embedded_captures_match_their_logo_size() {
        assert_eq!(BG_48_PNG.len(), 1677);
        assert_eq!(BG_96_PNG.len(), 8165);
        for size in [WatermarkSize::Small, WatermarkSize::Large] {
            let img = EmbeddedCaptures.capture(size).unwrap();
            let logo = size.config().logo_size;
            assert_eq!(img.dimensions(), (logo, logo));
        }
    }

    #[test]
    fn small_capture_yields_known_opacities() {
        let capture = EmbeddedCaptures.capture(WatermarkSize::Small).unwrap();
        let map = AlphaMap::from_capture(&capture);
        assert_byte_alpha(&map, 0, 0, 2);
        assert_byte_alpha(&map, 47, 47, 1);
        assert_byte_alpha(&map, 24, 0, 112);
        assert_byte_alpha(&map, 24, 24, 128);
        assert_byte_alpha(&map, 35, 24, 129);
    }

    #[test]
    fn large_capture_yields_known_opacities() {
        let capture = EmbeddedCaptures.capture(WatermarkSize::Large).unwrap();
        let map = AlphaMap::from_capture(&capture);
        assert_byte_alpha(&map, 0, 0, 4);
        assert_byte_alpha(&map, 95, 95, 2);
        assert_byte_alpha(&map, 48, 0, 121);
        assert_byte_alpha(&map, 48, 48, 129);
    }
}
