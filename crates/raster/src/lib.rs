#![deny(unsafe_code)]
//! CPU drawing surface for the flowfield sketch.
//!
//! [`RasterCanvas`] implements `flowfield_core::Surface` on an in-memory RGB
//! buffer so a sketch can run headless; [`snapshot::write_png`] saves the
//! accumulated trails. Both the CLI and tests render through this crate.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::{BlendMode, RasterCanvas};
