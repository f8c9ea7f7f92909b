//! Error types for the gemini-unblend crate.

/// Errors that can occur while removing the overlay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes are not a valid or supported image.
    #[error("failed to decode input image: {0}")]
    Decode(image::ImageError),

    /// A pixel surface of the requested dimensions could not be allocated.
    #[error("cannot allocate a {width}x{height} pixel surface")]
    Surface {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The processed pixel grid could not be serialized.
    #[error("failed to encode output image: {0}")]
    Encode(image::ImageError),

    /// Failed to decode an embedded reference capture.
    #[error("failed to decode reference capture: {0}")]
    AlphaMapDecode(image::ImageError),

    /// A reference capture does not have the dimensions of its variant.
    #[error("reference capture is {width}x{height}, expected {expected}x{expected}")]
    AlphaMapSize {
        /// Logo size of the variant the capture belongs to.
        expected: u32,
        /// Actual capture width.
        width: u32,
        /// Actual capture height.
        height: u32,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
