//! Color types for the flowfield sketch.
//!
//! Palettes produce [`Hsba`] colors in the classic sketching ranges
//! (hue 0-360, saturation/brightness/alpha 0-100). Drawing surfaces convert
//! them to [`Srgb`] plus an opacity in [0, 1] with [`hsba_to_srgb`].

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue/saturation/brightness color with alpha.
///
/// `h` in degrees [0, 360); `s`, `b` and `a` are percentages in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsba {
    pub h: f64,
    pub s: f64,
    pub b: f64,
    pub a: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Quantizes to 8-bit channels with clamping and rounding.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl Hsba {
    pub fn new(h: f64, s: f64, b: f64, a: f64) -> Self {
        Self { h, s, b, a }
    }

    /// Alpha as an opacity in [0, 1].
    pub fn opacity(self) -> f64 {
        (self.a / 100.0).clamp(0.0, 1.0)
    }
}

/// Converts HSB to sRGB, ignoring alpha.
///
/// Hue wraps modulo 360; saturation and brightness are clamped to [0, 100].
/// NaN hue is treated as 0.
pub fn hsba_to_srgb(c: Hsba) -> Srgb {
    let h = if c.h.is_finite() { c.h.rem_euclid(360.0) } else { 0.0 };
    let s = (c.s / 100.0).clamp(0.0, 1.0);
    let v = (c.b / 100.0).clamp(0.0, 1.0);

    let chroma = v * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = v - chroma;
    Srgb {
        r: r + m,
        g: g + m,
        b: b + m,
    }
}
