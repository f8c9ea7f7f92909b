//! Per-pixel opacity of the overlay.

use image::RgbaImage;

/// Opacity template for one overlay variant, one `f32` in `[0, 1]` per pixel.
///
/// Stored row-major. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl AlphaMap {
    /// Build an alpha map from a reference capture.
    ///
    /// The capture shows the light logo over a black backdrop, so the
    /// opacity at each pixel is taken as `max(R, G, B) / 255.0`. The capture's
    /// own alpha channel is ignored.
    #[must_use]
    pub fn from_capture(capture: &RgbaImage) -> Self {
        let values = capture
            .pixels()
            .map(|px| f32::from(px[0].max(px[1]).max(px[2])) / 255.0)
            .collect();

        Self {
            width: capture.width(),
            height: capture.height(),
            values,
        }
    }

    /// Wrap precomputed opacity values.
    ///
    /// Returns `None` unless `values` holds exactly `width * height` entries,
    /// all within `[0, 1]`.
    #[must_use]
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> Option<Self> {
        let expected = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
        if values.len() != expected || !values.iter().all(|v| (0.0..=1.0).contains(v)) {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opacity at `(row, col)`, or `None` outside the map.
    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row as usize * self.width as usize + col as usize).copied()
    }

    /// One row of opacities.
    ///
    /// # Panics
    ///
    /// Panics if `row >= height`.
    #[must_use]
    pub fn row(&self, row: u32) -> &[f32] {
        let w = self.width as usize;
        let start = row as usize * w;
        &self.values[start..start + w]
    }

    /// All opacities, row-major.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
