//! The drawing surface a sketch renders onto.
//!
//! A [`Surface`] is the only output channel of a sketch: it reports its
//! size, draws stroked line segments, and clears. Surfaces accumulate
//! between frames; only [`Surface::clear`] erases previous trails.

use glam::DVec2;

use crate::color::{Hsba, Srgb};

/// A drawing surface exposing line-drawing and clear primitives.
pub trait Surface {
    /// Current size in pixels as `(width, height)`.
    ///
    /// May change between frames when the host resizes the surface.
    fn size(&self) -> (usize, usize);

    /// Draws a line segment from `from` to `to` with the given color and
    /// stroke weight in pixels. Alpha is taken from `color.a`.
    fn draw_line(&mut self, from: DVec2, to: DVec2, color: Hsba, weight: f64);

    /// Fills the whole surface with an opaque color.
    fn clear(&mut self, color: Srgb);
}
