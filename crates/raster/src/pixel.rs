//! CPU raster surface with alpha or additive blending.
//!
//! [`RasterCanvas`] keeps an RGB buffer of f64 channels in [0, 1] and
//! implements [`Surface`]. Lines are rasterized by stamping a square brush of
//! the stroke width at sub-pixel steps along the segment; each covered
//! pixel is blended once per segment so a short segment with low opacity
//! does not darken or brighten its own overlap.

use flowfield_core::color::{hsba_to_srgb, Hsba, Srgb};
use flowfield_core::error::EngineError;
use flowfield_core::surface::Surface;
use glam::DVec2;

/// Upper bound on brush stamps per segment.
const MAX_SEGMENT_STEPS: f64 = (1u32 << 20) as f64;

/// How a stroke color combines with the pixel beneath it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// `dst + src * alpha`, saturating at 1. Faint trails build up into
    /// bright streams.
    #[default]
    Additive,
    /// `dst * (1 - alpha) + src * alpha`.
    Normal,
}

/// An in-memory RGB canvas.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: usize,
    height: usize,
    blend: BlendMode,
    pixels: Vec<[f64; 3]>,
    /// Scratch list of pixel indices covered by the segment being drawn.
    covered: Vec<usize>,
}

impl RasterCanvas {
    /// Creates a black canvas.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize, blend: BlendMode) -> Result<Self, EngineError> {
        let len = pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            blend,
            pixels: vec![[0.0; 3]; len],
            covered: Vec::new(),
        })
    }

    /// Changes the canvas size. The contents are discarded and the canvas
    /// is black afterwards.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        let len = pixel_count(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 3]; len];
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The color of pixel (x, y), or `None` outside the canvas.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Srgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b] = self.pixels[y * self.width + x];
        Some(Srgb { r, g, b })
    }

    /// Converts the canvas to an RGBA8 buffer (`width * height * 4` bytes,
    /// alpha always 255).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&[r, g, b]| {
                let [r, g, b] = Srgb { r, g, b }.to_rgb8();
                [r, g, b, 255u8]
            })
            .collect()
    }

    /// Collects the pixels a segment covers into `self.covered`, sorted and
    /// without duplicates.
    fn rasterize(&mut self, from: DVec2, to: DVec2, weight: f64) {
        self.covered.clear();
        if !(from.is_finite() && to.is_finite()) {
            return;
        }
        let half = (weight.max(1.0) - 1.0) / 2.0;
        let steps = from.distance(to).ceil().clamp(1.0, MAX_SEGMENT_STEPS) as usize;
        for i in 0..=steps {
            let p = from.lerp(to, i as f64 / steps as f64);
            let Some((x0, x1)) = brush_span(p.x, half, self.width) else {
                continue;
            };
            let Some((y0, y1)) = brush_span(p.y, half, self.height) else {
                continue;
            };
            for y in y0..=y1 {
                let row = y * self.width;
                self.covered.extend((x0..=x1).map(|x| row + x));
            }
        }
        self.covered.sort_unstable();
        self.covered.dedup();
    }
}

impl Surface for RasterCanvas {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn draw_line(&mut self, from: DVec2, to: DVec2, color: Hsba, weight: f64) {
        let alpha = color.opacity();
        if alpha <= 0.0 {
            return;
        }
        let src = hsba_to_srgb(color);
        let src = [src.r, src.g, src.b];
        self.rasterize(from, to, weight);
        for &i in &self.covered {
            let dst = &mut self.pixels[i];
            for c in 0..3 {
                dst[c] = match self.blend {
                    BlendMode::Additive => (dst[c] + src[c] * alpha).min(1.0),
                    BlendMode::Normal => dst[c] * (1.0 - alpha) + src[c] * alpha,
                };
            }
        }
    }

    fn clear(&mut self, color: Srgb) {
        self.pixels.fill([color.r, color.g, color.b]);
    }
}

/// Pixel range `[lo, hi]` a brush of half-width `half` centered at `center`
/// covers on an axis of `len` pixels, or `None` if it misses the axis.
fn brush_span(center: f64, half: f64, len: usize) -> Option<(usize, usize)> {
    let last = (len - 1) as f64;
    let lo = (center - half).round().max(0.0);
    let hi = (center + half).round().min(last);
    (lo <= hi).then(|| (lo as usize, hi as usize))
}

fn pixel_count(width: usize, height: usize) -> Result<usize, EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions)
}
