//! Image decode and encode at the edges of the pipeline.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageError, ImageReader, RgbaImage};

use crate::error::{Error, Result};

/// Decode compressed image bytes into an RGBA pixel buffer.
///
/// The format is sniffed from the content. An EXIF orientation tag is
/// applied, so the buffer is upright the way a viewer would show it.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are not a supported image, and
/// [`Error::Surface`] if the image dimensions cannot back a pixel buffer.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::Decode(ImageError::IoError(e)))?;
    let mut decoder = reader.into_decoder().map_err(Error::Decode)?;

    let (width, height) = decoder.dimensions();
    acquire_surface(width, height)?;

    // a malformed EXIF block should not sink an otherwise readable image
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut dyn_img = DynamicImage::from_decoder(decoder).map_err(Error::Decode)?;
    dyn_img.apply_orientation(orientation);
    Ok(dyn_img.to_rgba8())
}

/// Check that a `width` x `height` RGBA surface is addressable.
fn acquire_surface(width: u32, height: u32) -> Result<()> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4));
    match len {
        Some(n) if n > 0 => Ok(()),
        _ => Err(Error::Surface { width, height }),
    }
}

/// Encode an RGBA pixel buffer as PNG.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the encoder rejects the buffer.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(Error::Encode)?;
    Ok(out.into_inner())
}

/// Encode `img` as PNG and write it to `path`, whatever its extension.
///
/// # Errors
///
/// Returns [`Error::Encode`] if encoding fails or [`Error::Io`] if the file
/// cannot be written.
pub fn write_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let png = encode_png(img)?;
    std::fs::write(path, png)?;
    Ok(())
}

/// Check if a file has a decodable image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tif" | "tiff"
        ),
        None => false,
    }
}

/// Generate a default output path from an input path.
///
/// Output is always PNG: `"photo.jpg"` becomes `"photo_cleaned.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_cleaned.png"))
}
