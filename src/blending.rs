//! Alpha blending math for watermark removal.
//!
//! Gemini applies its overlay via forward alpha blending:
//! `watermarked = alpha * logo + (1 - alpha) * original`
//!
//! This module provides the reverse operation to recover original pixels.

use image::RgbaImage;

use crate::alpha_map::AlphaMap;
use crate::locator::Footprint;

/// Alpha threshold: ignore pixels with negligible watermark effect (noise).
pub const ALPHA_THRESHOLD: f64 = 0.002;

/// Maximum alpha: clamp to avoid division by near-zero in reverse blending.
pub const MAX_ALPHA: f64 = 0.99;

/// Color of the logo ink on every channel.
pub const LOGO_VALUE: f64 = 255.0;

/// What [`unblend`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnblendOutcome {
    /// The footprint was inside the image and was processed.
    Applied {
        /// Footprint pixels whose opacity reached the threshold.
        pixels: usize,
    },
    /// The footprint reaches outside the image; nothing was touched.
    OutOfBounds,
    /// The alpha map does not have the footprint's dimensions; nothing was touched.
    MapMismatch,
}

impl UnblendOutcome {
    /// Whether the buffer was left exactly as it was passed in.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !matches!(self, Self::Applied { .. })
    }
}

/// Remove the overlay from `image` in-place using reverse alpha blending.
///
/// Applies `original = (watermarked - alpha * 255) / (1 - alpha)` to the three
/// color channels of every footprint pixel whose opacity is at least
/// [`ALPHA_THRESHOLD`], with opacity capped at [`MAX_ALPHA`]. Results are
/// rounded and clamped to `[0, 255]`; the alpha channel is never written.
///
/// Opacities are stored as `f32`; the inversion itself runs in `f64`.
///
/// A footprint that does not lie entirely inside the image is not clipped:
/// the call leaves the buffer untouched and reports
/// [`UnblendOutcome::OutOfBounds`].
///
/// Running this twice over the same region is not idempotent. The formula
/// assumes the overlay is still present in its input.
pub fn unblend(
    image: &mut RgbaImage,
    alpha_map: &AlphaMap,
    footprint: Footprint,
) -> UnblendOutcome {
    if !footprint.fits_within(image.width(), image.height()) {
        return UnblendOutcome::OutOfBounds;
    }
    if alpha_map.width() != footprint.width || alpha_map.height() != footprint.height {
        return UnblendOutcome::MapMismatch;
    }

    // fits_within guarantees both are non-negative
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let (x0, y0) = (footprint.x as usize, footprint.y as usize);
    let stride = image.width() as usize * 4;
    let span = footprint.width as usize * 4;
    let buf: &mut [u8] = &mut **image;

    let mut pixels = 0;
    for row in 0..footprint.height {
        let start = (y0 + row as usize) * stride + x0 * 4;
        let line = &mut buf[start..start + span];

        for (px, &stored) in line.chunks_exact_mut(4).zip(alpha_map.row(row)) {
            let alpha = f64::from(stored);
            // Skip pixels with negligible watermark effect
            if alpha < ALPHA_THRESHOLD {
                continue;
            }
            pixels += 1;

            // Clamp alpha to avoid division instability
            let alpha = alpha.min(MAX_ALPHA);
            let inv_alpha = 1.0 - alpha;

            for ch in &mut px[..3] {
                let original = (f64::from(*ch) - alpha * LOGO_VALUE) / inv_alpha;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    *ch = original.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    UnblendOutcome::Applied { pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    fn at(x: i64, y: i64, size: u32) -> Footprint {
        Footprint {
            x,
            y,
            width: size,
            height: size,
        }
    }

    #[test]
    fn reverse_blend_recovers_original_within_tolerance() {
        let mut image = RgbaImage::from_pixel(100, 100, Rgba([128, 64, 200, 255]));
        let original_copy = image.clone();

        let size = 10u32;
        #[allow(clippy::cast_precision_loss)]
        let values: Vec<f32> = (0..size * size)
            .map(|i| (i as f32) / (size * size) as f32 * 0.5)
            .collect();
        let alpha_map = AlphaMap::from_values(size, size, values).unwrap();
        let (pos_x, pos_y) = (50u32, 50u32);

        // Apply forward blend
        for dy in 0..size {
            for dx in 0..size {
                let alpha = f64::from(alpha_map.get(dy, dx).unwrap());
                if alpha < ALPHA_THRESHOLD {
                    continue;
                }
                let px = image.get_pixel_mut(pos_x + dx, pos_y + dy);
                for ch in 0..3 {
                    let blended = alpha * LOGO_VALUE + (1.0 - alpha) * f64::from(px[ch]);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    {
                        px[ch] = blended.round().clamp(0.0, 255.0) as u8;
                    }
                }
            }
        }

        let outcome = unblend(&mut image, &alpha_map, at(50, 50, size));
        assert_eq!(outcome, UnblendOutcome::Applied { pixels: 99 });

        // +/- 2 for the double u8 rounding
        for (restored, orig) in image.pixels().zip(original_copy.pixels()) {
            for ch in 0..3 {
                let diff = (i32::from(restored[ch]) - i32::from(orig[ch])).abs();
                assert!(diff <= 2, "ch {ch} diff {diff}");
            }
            assert_eq!(restored[3], orig[3]);
        }
    }

    #[test]
    fn full_opacity_is_capped_then_clamped_to_black() {
        let map = AlphaMap::from_values(4, 4, vec![1.0; 16]).unwrap();

        let mut black = solid(8, 8, 0);
        unblend(&mut black, &map, at(2, 2, 4));
        assert!(black.pixels().all(|p| p.0 == [0, 0, 0, 255]));

        // (250 - 0.99 * 255) / 0.01 is negative, so light pixels also land on 0
        let mut light = solid(8, 8, 250);
        unblend(&mut light, &map, at(2, 2, 4));
        assert_eq!(light.get_pixel(3, 3).0, [0, 0, 0, 255]);
        assert_eq!(light.get_pixel(0, 0).0, [250, 250, 250, 255]);
    }

    #[test]
    fn threshold_boundary_decides_skip_or_process() {
        let below = AlphaMap::from_values(1, 1, vec![0.0019]).unwrap();
        let above = AlphaMap::from_values(1, 1, vec![0.0021]).unwrap();

        let mut img = solid(1, 1, 10);
        let outcome = unblend(&mut img, &below, at(0, 0, 1));
        assert_eq!(outcome, UnblendOutcome::Applied { pixels: 0 });
        assert_eq!(img.get_pixel(0, 0).0, [10, 10, 10, 255]);

        let mut img = solid(1, 1, 10);
        let outcome = unblend(&mut img, &above, at(0, 0, 1));
        assert_eq!(outcome, UnblendOutcome::Applied { pixels: 1 });
        assert_eq!(img.get_pixel(0, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn half_integer_results_round_like_double_precision() {
        // (128 - 255a) / (1 - a) with a = 1/255 stored as f32 is just below 127.5
        let map = AlphaMap::from_values(1, 1, vec![1.0 / 255.0]).unwrap();
        let mut img = solid(1, 1, 128);
        unblend(&mut img, &map, at(0, 0, 1));
        assert_eq!(img.get_pixel(0, 0).0, [127, 127, 127, 255]);
    }

    #[test]
    fn matches_double_precision_reference_for_every_byte_opacity() {
        for k in 1..=255u8 {
            let stored = f32::from(k) / 255.0;
            let map = AlphaMap::from_values(1, 1, vec![stored]).unwrap();
            let alpha = f64::from(stored).min(MAX_ALPHA);
            for observed in 0..=255u8 {
                let mut img = solid(1, 1, observed);
                unblend(&mut img, &map, at(0, 0, 1));

                let want = ((f64::from(observed) - alpha * 255.0) / (1.0 - alpha))
                    .round()
                    .clamp(0.0, 255.0);
                assert!(
                    (f64::from(img.get_pixel(0, 0)[0]) - want).abs() < f64::EPSILON,
                    "k={k} observed={observed}"
                );
            }
        }
    }

    #[test]
    fn second_application_keeps_darkening() {
        let map = AlphaMap::from_values(2, 2, vec![0.3; 4]).unwrap();
        let mut img = solid(4, 4, 128);

        unblend(&mut img, &map, at(1, 1, 2));
        let once = img.clone();
        assert_eq!(once.get_pixel(1, 1)[0], 74);

        unblend(&mut img, &map, at(1, 1, 2));
        assert_ne!(img, once, "unblend must not be treated as idempotent");
        assert_eq!(img.get_pixel(1, 1)[0], 0);
    }

    #[test]
    fn out_of_bounds_footprint_is_a_noop() {
        let map = AlphaMap::from_values(4, 4, vec![0.5; 16]).unwrap();
        let original = solid(6, 6, 100);

        for fp in [at(-1, 0, 4), at(0, -1, 4), at(3, 0, 4), at(0, 3, 4)] {
            let mut img = original.clone();
            assert_eq!(unblend(&mut img, &map, fp), UnblendOutcome::OutOfBounds);
            assert_eq!(img, original);
        }
    }

    #[test]
    fn mismatched_map_is_a_noop() {
        let map = AlphaMap::from_values(3, 3, vec![0.5; 9]).unwrap();
        let original = solid(6, 6, 100);
        let mut img = original.clone();

        let outcome = unblend(&mut img, &map, at(0, 0, 4));
        assert_eq!(outcome, UnblendOutcome::MapMismatch);
        assert!(outcome.is_noop());
        assert_eq!(img, original);
    }

    #[test]
    fn alpha_channel_is_preserved() {
        let map = AlphaMap::from_values(1, 1, vec![0.5]).unwrap();
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 17]));
        unblend(&mut img, &map, at(0, 0, 1));
        assert_eq!(img.get_pixel(0, 0).0, [145, 145, 145, 17]);
    }
}
