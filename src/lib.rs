//! Remove the visible Gemini sparkle overlay via reverse alpha blending.
//!
//! Gemini composites a semi-transparent white logo onto the bottom-right
//! corner of generated images. This crate derives the logo's per-pixel opacity
//! from embedded 48x48 and 96x96 reference captures, places the logo from the
//! image dimensions alone, and inverts the compositing equation to recover the
//! original pixels underneath.
//!
//! # Quick Start
//!
//! ```no_run
//! use gemini_unblend::WatermarkEngine;
//!
//! let engine = WatermarkEngine::new();
//! let input = std::fs::read("photo.jpg").unwrap();
//! let png = engine.remove_watermark(&input).expect("processing failed");
//! std::fs::write("cleaned.png", png).unwrap();
//! ```
//!
//! # Working on pixels
//!
//! ```no_run
//! use gemini_unblend::WatermarkEngine;
//!
//! let engine = WatermarkEngine::new();
//! let mut img = image::open("photo.png").unwrap().to_rgba8();
//! let outcome = engine.remove(&mut img, None).unwrap();
//! if outcome.is_noop() {
//!     eprintln!("image too small for the overlay, left unchanged");
//! }
//! ```
//!
//! Both the opacity model and the fixed bottom-right placement are tuned to
//! this one generator; they do not generalize to other overlays.

#![deny(missing_docs)]

pub mod alpha_map;
pub mod alpha_maps;
pub mod blending;
pub mod codec;
mod engine;
pub mod error;
pub mod locator;

pub use alpha_map::AlphaMap;
pub use alpha_maps::{CaptureSource, EmbeddedCaptures};
pub use blending::UnblendOutcome;
pub use codec::{default_output_path, is_supported_image, write_png};
pub use engine::{ProcessOptions, ProcessResult, WatermarkEngine};
pub use error::{Error, Result};
pub use locator::{Footprint, OverlayConfig, WatermarkSize};
