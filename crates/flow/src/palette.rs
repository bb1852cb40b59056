//! Stroke color selection.
//!
//! A [`PaletteMode`] maps a particle's position (and base hue) to an HSB
//! color. Each mode is a pure function; the only state is which mode the
//! sketch currently has selected.

use std::fmt;
use std::str::FromStr;

use flowfield_core::color::Hsba;
use flowfield_core::error::EngineError;
use flowfield_core::noise_source::NoiseSource;
use glam::DVec2;

/// Scale from canvas pixels to noise space for noise-driven palettes.
const NOISE_SCALE: f64 = 0.01;
/// Alpha (percent) for the colored modes.
const TRAIL_ALPHA: f64 = 5.0;
/// Alpha (percent) for the monochrome mode.
const MONO_ALPHA: f64 = 3.0;

/// All selectable palette names, in key order.
const PALETTE_NAMES: &[&str] = &["rainbow", "ocean", "fire", "monochrome", "base-hue"];

/// How particle strokes are colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaletteMode {
    /// Hue sweeps diagonally across the canvas.
    #[default]
    Rainbow,
    /// Blues and teals modulated by 2-D noise.
    Ocean,
    /// Reds through yellows modulated by 1-D noise along x.
    Fire,
    /// Faint white, no hue.
    Monochrome,
    /// Each particle's own random hue. Fallback for unknown mode indices.
    BaseHue,
}

impl PaletteMode {
    /// Selects a mode by zero-based index; indices past the four keyed modes
    /// select [`PaletteMode::BaseHue`].
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Rainbow,
            1 => Self::Ocean,
            2 => Self::Fire,
            3 => Self::Monochrome,
            _ => Self::BaseHue,
        }
    }

    /// Looks up a mode by its kebab-case name.
    ///
    /// Returns `EngineError::UnknownPalette` for anything else.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "rainbow" => Ok(Self::Rainbow),
            "ocean" => Ok(Self::Ocean),
            "fire" => Ok(Self::Fire),
            "monochrome" => Ok(Self::Monochrome),
            "base-hue" => Ok(Self::BaseHue),
            _ => Err(EngineError::UnknownPalette(name.to_owned())),
        }
    }

    /// The kebab-case name of this mode.
    pub fn name(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Ocean => "ocean",
            Self::Fire => "fire",
            Self::Monochrome => "monochrome",
            Self::BaseHue => "base-hue",
        }
    }

    /// Returns all palette names.
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    /// Stroke color for a particle at `pos` with base hue `base_hue`.
    ///
    /// Defined for every position, including ones outside the canvas.
    pub fn color(self, pos: DVec2, base_hue: f64, noise: &dyn NoiseSource) -> Hsba {
        match self {
            Self::Rainbow => rainbow(pos),
            Self::Ocean => ocean(pos, noise),
            Self::Fire => fire(pos, noise),
            Self::Monochrome => monochrome(),
            Self::BaseHue => base_hue_color(base_hue),
        }
    }
}

impl FromStr for PaletteMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn rainbow(pos: DVec2) -> Hsba {
    Hsba::new(wrap_hue((pos.x + pos.y) * 0.2), 80.0, 90.0, TRAIL_ALPHA)
}

fn ocean(pos: DVec2, noise: &dyn NoiseSource) -> Hsba {
    let n = noise.sample(pos.x * NOISE_SCALE, pos.y * NOISE_SCALE, 0.0);
    Hsba::new(200.0 + n * 40.0, 70.0, 80.0, TRAIL_ALPHA)
}

fn fire(pos: DVec2, noise: &dyn NoiseSource) -> Hsba {
    let n = noise.sample(pos.x * NOISE_SCALE, 0.0, 0.0);
    Hsba::new(n * 60.0, 90.0, 90.0, TRAIL_ALPHA)
}

fn monochrome() -> Hsba {
    Hsba::new(0.0, 0.0, 90.0, MONO_ALPHA)
}

fn base_hue_color(base_hue: f64) -> Hsba {
    Hsba::new(wrap_hue(base_hue), 70.0, 80.0, TRAIL_ALPHA)
}

/// Reduces a hue into [0, 360). Non-finite hues become 0.
fn wrap_hue(hue: f64) -> f64 {
    let h = hue.rem_euclid(360.0);
    if h.is_finite() && h < 360.0 {
        h
    } else {
        0.0
    }
}
