#![deny(unsafe_code)]
//! Perlin flow-field particle sketch.
//!
//! Every frame a grid of unit vectors is regenerated from 3-D noise whose
//! third axis is time. Each particle then samples the cell beneath it, adds
//! that direction as a force, integrates with a speed limit, wraps around the
//! canvas edges, and draws a faint segment from where it was to where it is.
//! The surface is never cleared between frames, so the segments accumulate
//! into flowing trails.
//!
//! All state lives in [`FlowSketch`]; input arrives between frames as
//! [`Command`]s.

pub mod command;
pub mod field;
pub mod palette;
pub mod particle;

use std::f64::consts::TAU;

use flowfield_core::color::Srgb;
use flowfield_core::error::EngineError;
use flowfield_core::noise_source::{self, NoiseSource, PerlinNoise};
use flowfield_core::params::{
    param_f64, param_string, param_u32, param_usize, require_positive, require_range,
};
use flowfield_core::prng::Xorshift64;
use flowfield_core::surface::Surface;
use flowfield_core::Sketch;
use serde_json::{json, Value};
use tracing::{debug, trace};

pub use command::Command;
pub use field::{FieldShape, FlowField};
pub use palette::PaletteMode;
pub use particle::{Particle, ParticleSystem};

/// Default number of particles spawned at start.
const DEFAULT_PARTICLE_COUNT: usize = 1000;
/// Default grid cell edge in pixels.
const DEFAULT_CELL_SIZE: f64 = 20.0;
/// Default noise-space step between adjacent cells.
const DEFAULT_NOISE_STEP: f64 = 0.1;
/// Default noise-time advance per frame.
const DEFAULT_TIME_STEP: f64 = 0.003;
/// Default noise-to-angle multiplier: two full turns across the noise range.
const DEFAULT_ANGLE_SCALE: f64 = 2.0 * TAU;
/// Default speed limit in pixels per frame.
const DEFAULT_MAX_SPEED: f64 = 4.0;
/// Default stroke width in pixels.
const DEFAULT_STROKE_WEIGHT: f64 = 1.0;
/// Default number of particles added or removed per batch command.
const DEFAULT_BATCH_SIZE: usize = 100;
/// Accepted cell edge lengths in pixels.
const CELL_SIZE_RANGE: (f64, f64) = (1.0, 200.0);
/// Accepted stroke widths in pixels.
const STROKE_WEIGHT_RANGE: (f64, f64) = (0.5, 10.0);

/// Tunable constants of the flow-field sketch.
///
/// [`Default`] reproduces the classic look: 1000 particles, 20 px cells,
/// a 4π angle mapping and a speed limit of 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowParams {
    pub particle_count: usize,
    pub cell_size: f64,
    /// Noise-space step between cells, used for both axes.
    pub noise_step: f64,
    pub time_step: f64,
    pub angle_scale: f64,
    pub max_speed: f64,
    pub stroke_weight: f64,
    pub batch_size: usize,
    pub noise_octaves: u32,
    pub noise_falloff: f64,
    /// Palette selected at start.
    pub palette: PaletteMode,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            cell_size: DEFAULT_CELL_SIZE,
            noise_step: DEFAULT_NOISE_STEP,
            time_step: DEFAULT_TIME_STEP,
            angle_scale: DEFAULT_ANGLE_SCALE,
            max_speed: DEFAULT_MAX_SPEED,
            stroke_weight: DEFAULT_STROKE_WEIGHT,
            batch_size: DEFAULT_BATCH_SIZE,
            noise_octaves: noise_source::DEFAULT_OCTAVES,
            noise_falloff: noise_source::DEFAULT_FALLOFF,
            palette: PaletteMode::default(),
        }
    }
}

impl FlowParams {
    /// Extracts parameters from a JSON object, falling back to defaults for
    /// missing or mistyped keys.
    ///
    /// Returns `EngineError::UnknownPalette` if `palette` names no known mode.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        Ok(Self {
            particle_count: param_usize(params, "particle_count", d.particle_count),
            cell_size: param_f64(params, "cell_size", d.cell_size),
            noise_step: param_f64(params, "noise_step", d.noise_step),
            time_step: param_f64(params, "time_step", d.time_step),
            angle_scale: param_f64(params, "angle_scale", d.angle_scale),
            max_speed: param_f64(params, "max_speed", d.max_speed),
            stroke_weight: param_f64(params, "stroke_weight", d.stroke_weight),
            batch_size: param_usize(params, "batch_size", d.batch_size),
            noise_octaves: param_u32(params, "noise_octaves", d.noise_octaves),
            noise_falloff: param_f64(params, "noise_falloff", d.noise_falloff),
            palette: PaletteMode::from_name(&param_string(params, "palette", d.palette.name()))?,
        })
    }

    /// Checks the values the simulation divides by or limits with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let (min, max) = CELL_SIZE_RANGE;
        require_range("cell_size", self.cell_size, min, max)?;
        require_positive("max_speed", self.max_speed)?;
        let (min, max) = STROKE_WEIGHT_RANGE;
        require_range("stroke_weight", self.stroke_weight, min, max)?;
        for (name, value) in [
            ("noise_step", self.noise_step),
            ("time_step", self.time_step),
            ("angle_scale", self.angle_scale),
            ("noise_falloff", self.noise_falloff),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidParameter {
                    name: name.to_owned(),
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }

    fn field_shape(&self) -> FieldShape {
        FieldShape {
            cell_size: self.cell_size,
            step_x: self.noise_step,
            step_y: self.noise_step,
            angle_scale: self.angle_scale,
        }
    }
}

/// The complete state of one running sketch.
///
/// Owns the flow field, the particles, the selected palette, the noise
/// source, the PRNG and the noise-time coordinate. Nothing is global: two
/// sketches built from the same seed and params evolve identically.
pub struct FlowSketch {
    params: FlowParams,
    field: FlowField,
    particles: ParticleSystem,
    palette: PaletteMode,
    noise: Box<dyn NoiseSource>,
    rng: Xorshift64,
    time: f64,
    width: usize,
    height: usize,
    frames: u64,
}

impl FlowSketch {
    /// Creates a sketch for a `width x height` canvas.
    ///
    /// The PRNG seeded with `seed` picks the noise seed first, then the
    /// initial particle positions and hues.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero,
    /// or `EngineError::InvalidParameter` if `params` fails validation.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: FlowParams,
    ) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        params.validate()?;
        let mut rng = Xorshift64::new(seed);
        let noise = PerlinNoise::new(rng.next_u32(), params.noise_octaves, params.noise_falloff);
        let field = FlowField::new(width, height, params.field_shape())?;
        let particles =
            ParticleSystem::new(params.particle_count, &mut rng, width as f64, height as f64);
        Ok(Self {
            params,
            field,
            particles,
            palette: params.palette,
            noise: Box::new(noise),
            rng,
            time: 0.0,
            width,
            height,
            frames: 0,
        })
    }

    /// Creates a sketch from a JSON params object (see [`FlowParams::from_json`]).
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
    ) -> Result<Self, EngineError> {
        Self::new(width, height, seed, FlowParams::from_json(json_params)?)
    }

    /// Replaces the noise source used for the field and the noise palettes.
    pub fn with_noise(mut self, noise: impl NoiseSource + 'static) -> Self {
        self.noise = Box::new(noise);
        self
    }

    /// Applies an input command. Must be called between frames.
    ///
    /// `Reset` clears `surface` to black; the other commands do not draw.
    pub fn apply(&mut self, command: Command, surface: &mut dyn Surface) {
        let (w, h) = (self.width as f64, self.height as f64);
        match command {
            Command::Reset => {
                surface.clear(Srgb::BLACK);
                self.particles.reset(&mut self.rng, w, h);
                debug!(particles = self.particles.len(), "reset");
            }
            Command::AddBatch => {
                self.particles
                    .add_batch(self.params.batch_size, &mut self.rng, w, h);
                debug!(particles = self.particles.len(), "added particle batch");
            }
            Command::RemoveBatch => {
                let removed = self.particles.remove_batch(self.params.batch_size);
                debug!(removed, particles = self.particles.len(), "removed particle batch");
            }
            Command::SelectPalette(mode) => {
                self.palette = mode;
                debug!(palette = %mode, "palette selected");
            }
        }
    }

    /// Maps a key press to a command and applies it. Returns whether the key
    /// was bound.
    pub fn press_key(&mut self, key: char, surface: &mut dyn Surface) -> bool {
        match Command::from_key(key) {
            Some(command) => {
                self.apply(command, surface);
                true
            }
            None => false,
        }
    }

    /// Adapts to a new canvas size. The field grid is recomputed and its
    /// vectors discarded until the next frame regenerates them; particles
    /// keep their positions and wrap onto the new canvas as they move.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width = width;
        self.height = height;
        self.field.resize(width, height);
        debug!(
            width,
            height,
            columns = self.field.columns(),
            rows = self.field.rows(),
            "resized"
        );
        Ok(())
    }

    /// The flow field as of the last frame.
    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Currently selected palette.
    pub fn palette(&self) -> PaletteMode {
        self.palette
    }

    /// Noise-time coordinate the next frame will sample.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Canvas size the sketch currently simulates on.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl Sketch for FlowSketch {
    fn frame(&mut self, surface: &mut dyn Surface) -> Result<(), EngineError> {
        let (w, h) = surface.size();
        if (w, h) != (self.width, self.height) {
            self.resize(w, h)?;
        }

        self.field.regenerate(self.noise.as_ref(), self.time);
        self.time += self.params.time_step;

        self.particles.update(
            &self.field,
            surface,
            self.palette,
            self.noise.as_ref(),
            self.params.max_speed,
            self.params.stroke_weight,
        );
        self.frames += 1;
        trace!(frame = self.frames, time = self.time, "frame drawn");
        Ok(())
    }

    fn params(&self) -> Value {
        json!({
            "particle_count": self.particles.len(),
            "cell_size": self.params.cell_size,
            "noise_step": self.params.noise_step,
            "time_step": self.params.time_step,
            "angle_scale": self.params.angle_scale,
            "max_speed": self.params.max_speed,
            "stroke_weight": self.params.stroke_weight,
            "batch_size": self.params.batch_size,
            "noise_octaves": self.params.noise_octaves,
            "noise_falloff": self.params.noise_falloff,
            "palette": self.palette.name(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_PARTICLE_COUNT,
                "min": 0,
                "description": "Particles spawned at start"
            },
            "cell_size": {
                "type": "number",
                "default": DEFAULT_CELL_SIZE,
                "min": CELL_SIZE_RANGE.0,
                "max": CELL_SIZE_RANGE.1,
                "description": "Flow-field cell edge in pixels"
            },
            "noise_step": {
                "type": "number",
                "default": DEFAULT_NOISE_STEP,
                "min": 0.0,
                "max": 1.0,
                "description": "Noise-space distance between adjacent cells (spatial smoothness)"
            },
            "time_step": {
                "type": "number",
                "default": DEFAULT_TIME_STEP,
                "min": 0.0,
                "max": 0.1,
                "description": "Noise-time advance per frame"
            },
            "angle_scale": {
                "type": "number",
                "default": DEFAULT_ANGLE_SCALE,
                "min": 0.0,
                "max": 8.0 * TAU,
                "description": "Radians per unit of noise; 4π gives two turns across the noise range"
            },
            "max_speed": {
                "type": "number",
                "default": DEFAULT_MAX_SPEED,
                "min": 0.1,
                "max": 20.0,
                "description": "Particle speed limit in pixels per frame"
            },
            "stroke_weight": {
                "type": "number",
                "default": DEFAULT_STROKE_WEIGHT,
                "min": STROKE_WEIGHT_RANGE.0,
                "max": STROKE_WEIGHT_RANGE.1,
                "description": "Trail stroke width in pixels"
            },
            "batch_size": {
                "type": "integer",
                "default": DEFAULT_BATCH_SIZE,
                "min": 0,
                "description": "Particles added or removed per batch command"
            },
            "noise_octaves": {
                "type": "integer",
                "default": noise_source::DEFAULT_OCTAVES,
                "min": 1,
                "max": 8,
                "description": "Perlin octaves summed per sample"
            },
            "noise_falloff": {
                "type": "number",
                "default": noise_source::DEFAULT_FALLOFF,
                "min": 0.0,
                "max": 1.0,
                "description": "Amplitude multiplier between octaves"
            },
            "palette": {
                "type": "string",
                "default": PaletteMode::default().name(),
                "enum": PaletteMode::list_names(),
                "description": "Initial stroke palette"
            }
        })
    }
}
