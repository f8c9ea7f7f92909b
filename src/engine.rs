//! Core watermark removal engine.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use once_cell::sync::OnceCell;

use crate::alpha_map::AlphaMap;
use crate::alpha_maps::{CaptureSource, EmbeddedCaptures};
use crate::blending::{self, UnblendOutcome};
use crate::codec;
use crate::error::{Error, Result};
use crate::locator::{self, Footprint, OverlayConfig, WatermarkSize};

/// Options controlling watermark processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Force a specific watermark size instead of picking it from the dimensions.
    pub force_size: Option<WatermarkSize>,
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (overlay footprint outside the image).
    pub skipped: bool,
    /// Human-readable status message.
    pub message: String,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            skipped: false,
            message: String::new(),
        }
    }
}

/// The watermark engine holding lazily built alpha maps.
///
/// Create once with [`WatermarkEngine::new()`] and reuse for multiple images.
/// Each variant's alpha map is built from its reference capture the first
/// time an image needs it and kept for the lifetime of the engine. Concurrent
/// first requests for the same variant build it only once.
pub struct WatermarkEngine {
    source: Box<dyn CaptureSource>,
    alpha_map_small: OnceCell<AlphaMap>,
    alpha_map_large: OnceCell<AlphaMap>,
}

impl Default for WatermarkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WatermarkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkEngine")
            .field("small_ready", &self.alpha_map_small.get().is_some())
            .field("large_ready", &self.alpha_map_large.get().is_some())
            .finish_non_exhaustive()
    }
}

impl WatermarkEngine {
    /// Create an engine backed by the embedded reference captures.
    ///
    /// Nothing is decoded until the first image is processed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(EmbeddedCaptures)
    }

    /// Create an engine that reads reference captures from `source`.
    #[must_use]
    pub fn with_source(source: impl CaptureSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            alpha_map_small: OnceCell::new(),
            alpha_map_large: OnceCell::new(),
        }
    }

    /// Build both alpha maps now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if either reference capture cannot be decoded or has
    /// the wrong dimensions.
    pub fn preload(&self) -> Result<()> {
        self.alpha_map(WatermarkSize::Small)?;
        self.alpha_map(WatermarkSize::Large)?;
        Ok(())
    }

    /// The alpha map for `size`, built on first request and cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlphaMapDecode`] or [`Error::AlphaMapSize`] if the
    /// reference capture is unusable. A failed build is not cached.
    pub fn alpha_map(&self, size: WatermarkSize) -> Result<&AlphaMap> {
        let cell = match size {
            WatermarkSize::Small => &self.alpha_map_small,
            WatermarkSize::Large => &self.alpha_map_large,
        };
        cell.get_or_try_init(|| self.build_alpha_map(size))
    }

    fn build_alpha_map(&self, size: WatermarkSize) -> Result<AlphaMap> {
        let expected = size.config().logo_size;
        let capture = self.source.capture(size)?;
        if capture.dimensions() != (expected, expected) {
            return Err(Error::AlphaMapSize {
                expected,
                width: capture.width(),
                height: capture.height(),
            });
        }
        log::debug!("built {expected}x{expected} alpha map");
        Ok(AlphaMap::from_capture(&capture))
    }

    /// Determine watermark size based on image dimensions.
    ///
    /// - **Large** (96x96, 64px margin): both width AND height > 1024
    /// - **Small** (48x48, 32px margin): otherwise (including 1024x1024)
    #[must_use]
    #[allow(clippy::unused_self)] // method on `self` for API consistency
    pub fn watermark_size_for(&self, width: u32, height: u32) -> WatermarkSize {
        locator::watermark_size_for(width, height)
    }

    /// Overlay placement for the given dimensions, honoring a forced size.
    #[must_use]
    pub fn config_for(
        &self,
        width: u32,
        height: u32,
        force_size: Option<WatermarkSize>,
    ) -> OverlayConfig {
        force_size
            .unwrap_or_else(|| self.watermark_size_for(width, height))
            .config()
    }

    /// Rectangle the overlay is expected to occupy on a `width` x `height` image.
    #[must_use]
    pub fn footprint_for(
        &self,
        width: u32,
        height: u32,
        force_size: Option<WatermarkSize>,
    ) -> Footprint {
        locator::compute_footprint(width, height, self.config_for(width, height, force_size))
    }

    /// Remove the watermark from an image in-place.
    ///
    /// The `force_size` parameter overrides automatic size selection. When the
    /// footprint does not fit inside the image the buffer is left untouched
    /// and [`UnblendOutcome::OutOfBounds`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the alpha map for the variant cannot be built.
    pub fn remove(
        &self,
        image: &mut RgbaImage,
        force_size: Option<WatermarkSize>,
    ) -> Result<UnblendOutcome> {
        let (w, h) = image.dimensions();
        let size = force_size.unwrap_or_else(|| self.watermark_size_for(w, h));
        let footprint = locator::compute_footprint(w, h, size.config());
        log::debug!("{w}x{h} image, {size:?} overlay at {footprint:?}");

        let alpha_map = self.alpha_map(size)?;
        let outcome = blending::unblend(image, alpha_map, footprint);
        if outcome == UnblendOutcome::OutOfBounds {
            log::warn!(
                "overlay footprint {footprint:?} falls outside {w}x{h} image, left unchanged"
            );
        }
        Ok(outcome)
    }

    /// Decode `input`, remove the watermark and return the result as PNG bytes.
    ///
    /// The output has the input's dimensions. Images too small to hold the
    /// overlay come back with their pixels unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`], [`Error::Surface`] or [`Error::Encode`] when
    /// the corresponding stage fails. Nothing is retried.
    pub fn remove_watermark(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.remove_watermark_with_outcome(input).map(|(png, _)| png)
    }

    /// Like [`remove_watermark`](Self::remove_watermark), also reporting
    /// whether the overlay region was processed.
    ///
    /// # Errors
    ///
    /// Same as [`remove_watermark`](Self::remove_watermark).
    pub fn remove_watermark_with_outcome(
        &self,
        input: &[u8],
    ) -> Result<(Vec<u8>, UnblendOutcome)> {
        let mut pixels = codec::decode(input)?;
        let outcome = self.remove(&mut pixels, None)?;
        let png = codec::encode_png(&pixels)?;
        Ok((png, outcome))
    }

    /// Process a single image file: load, remove, save as PNG.
    ///
    /// The output is PNG regardless of `output`'s extension. An image too small
    /// for the overlay is still written, unchanged, and reported as skipped.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult::new(input);

        let bytes = match std::fs::read(input) {
            Ok(b) => b,
            Err(e) => {
                result.message = format!("Failed to read: {e}");
                return result;
            }
        };

        let mut pixels = match codec::decode(&bytes) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let (w, h) = pixels.dimensions();
        let outcome = match self.remove(&mut pixels, opts.force_size) {
            Ok(o) => o,
            Err(e) => {
                result.message = format!("Failed to prepare alpha map: {e}");
                return result;
            }
        };

        let skipped = outcome.is_noop();

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    result.message = format!("Failed to create output directory: {e}");
                    return result;
                }
            }
        }

        match codec::write_png(&pixels, output) {
            Ok(()) if skipped => {
                let logo = self.config_for(w, h, opts.force_size).logo_size;
                result.success = true;
                result.skipped = true;
                result.message = format!(
                    "Image too small ({w}x{h}) for {logo}x{logo} watermark, copied unchanged"
                );
            }
            Ok(()) => {
                result.success = true;
                result.message = "Watermark removed".to_string();
            }
            Err(e) => {
                result.message = format!("Failed to save: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Each `name.ext` is written to `output_dir` as `name.png`.
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Returns a [`ProcessResult`] for each image found.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let mut inputs: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| codec::is_supported_image(p))
                .collect(),
            Err(e) => {
                let mut failed = ProcessResult::new(input_dir);
                failed.message = format!("Failed to read directory: {e}");
                return vec![failed];
            }
        };
        inputs.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                let mut failed = ProcessResult::new(output_dir);
                failed.message = format!("Failed to create output directory: {e}");
                return vec![failed];
            }
        }

        let run = |input: &PathBuf| {
            let output = match input.file_stem() {
                Some(stem) => output_dir.join(format!("{}.png", stem.to_string_lossy())),
                None => output_dir.to_path_buf(),
            };
            self.process_file(input, &output, opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            inputs.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            inputs.iter().map(run).collect()
        }
    }
}
