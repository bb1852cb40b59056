//! The `Sketch` trait: one frame-driven generative animation.
//!
//! The trait is object-safe so hosts (the CLI, tests) can drive any sketch as
//! `dyn Sketch` against any `dyn Surface`.

use crate::error::EngineError;
use crate::surface::Surface;
use serde_json::Value;

/// A frame-driven generative animation.
///
/// Each call to [`Sketch::frame`] advances the simulation by one tick and
/// draws onto the surface. Hosts apply input between frames, never during.
pub trait Sketch {
    /// Advance one frame and draw it.
    ///
    /// Fails only when the surface reports an unusable size (zero width or
    /// height); the simulation step itself is total.
    fn frame(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError>;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing all available parameters, their types, ranges, and defaults.
    fn param_schema(&self) -> Value;
}
