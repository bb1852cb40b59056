//! PNG export of a [`RasterCanvas`].
//!
//! Feature-gated behind `png` (default on) so embedders that only need the
//! in-memory surface do not pull in the `image` crate.

use flowfield_core::error::EngineError;
use std::path::Path;

use crate::pixel::RasterCanvas;

/// Writes the canvas as an RGBA PNG.
///
/// Returns `EngineError::InvalidDimensions` if the canvas dimensions overflow
/// `u32`, or `EngineError::Io` on write failure.
pub fn write_png(canvas: &RasterCanvas, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(canvas.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(canvas.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, canvas.to_rgba())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| EngineError::Io(format!("{}: {e}", path.display())))
}
