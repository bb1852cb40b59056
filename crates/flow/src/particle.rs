//! Particles advected through the flow field.
//!
//! A [`Particle`] is a point mass integrated with explicit Euler steps. Each
//! frame it runs `follow -> integrate -> wrap_edges -> draw`, in that order.
//! The [`ParticleSystem`] owns every particle and applies batch commands
//! between frames.

use flowfield_core::noise_source::NoiseSource;
use flowfield_core::prng::Xorshift64;
use flowfield_core::surface::Surface;
use glam::DVec2;

use crate::field::FlowField;
use crate::palette::PaletteMode;

/// A single trail-drawing particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pos: DVec2,
    vel: DVec2,
    acc: DVec2,
    prev_pos: DVec2,
    hue: f64,
}

impl Particle {
    /// Creates a particle at rest at `pos` with the given base hue.
    pub fn new(pos: DVec2, hue: f64) -> Self {
        Self {
            pos,
            vel: DVec2::ZERO,
            acc: DVec2::ZERO,
            prev_pos: pos,
            hue,
        }
    }

    /// Creates a particle at a random canvas position with a random base hue.
    pub fn random(rng: &mut Xorshift64, width: f64, height: f64) -> Self {
        let pos = rng.next_position(width, height);
        let hue = rng.next_range(0.0, 360.0);
        Self::new(pos, hue)
    }

    /// Current position.
    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    /// Current velocity.
    pub fn vel(&self) -> DVec2 {
        self.vel
    }

    /// Accumulated, not yet integrated force.
    pub fn acc(&self) -> DVec2 {
        self.acc
    }

    /// Start of the trail segment drawn this frame.
    pub fn prev_pos(&self) -> DVec2 {
        self.prev_pos
    }

    /// Base hue in degrees, used by [`PaletteMode::BaseHue`].
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Replaces the velocity.
    pub fn with_vel(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    /// Adds a force to this frame's accumulator.
    pub fn apply_force(&mut self, force: DVec2) {
        self.acc += force;
    }

    /// Adds the force of the field cell under the particle. Positions with
    /// no cell (off-grid, or before the field is computed) receive no force.
    pub fn follow(&mut self, field: &FlowField) {
        if let Some(force) = field.lookup(self.pos) {
            self.apply_force(force);
        }
    }

    /// Applies accumulated force, limits speed, moves, and clears the accumulator.
    pub fn integrate(&mut self, max_speed: f64) {
        self.vel = (self.vel + self.acc).clamp_length_max(max_speed);
        self.pos += self.vel;
        self.acc = DVec2::ZERO;
    }

    /// Wraps the position onto the `[0, width) x [0, height)` torus.
    ///
    /// Each axis wraps independently: leaving past the far edge re-enters at
    /// 0, leaving past 0 re-enters just inside the far edge. On a wrap the
    /// trail start snaps to the new position so no segment crosses the canvas.
    pub fn wrap_edges(&mut self, width: f64, height: f64) {
        let (x, wrapped_x) = wrap_axis(self.pos.x, width);
        let (y, wrapped_y) = wrap_axis(self.pos.y, height);
        if wrapped_x || wrapped_y {
            self.pos = DVec2::new(x, y);
            self.prev_pos = self.pos;
        }
    }

    /// Draws the segment from the trail start to the current position and
    /// moves the trail start up to the current position.
    pub fn draw(
        &mut self,
        surface: &mut dyn Surface,
        palette: PaletteMode,
        noise: &dyn NoiseSource,
        stroke_weight: f64,
    ) {
        let color = palette.color(self.pos, self.hue, noise);
        surface.draw_line(self.prev_pos, self.pos, color, stroke_weight);
        self.prev_pos = self.pos;
    }

    /// Teleports to `pos` without leaving a trail.
    pub fn relocate(&mut self, pos: DVec2) {
        self.pos = pos;
        self.prev_pos = pos;
    }
}

/// Wraps one coordinate into `[0, bound)`; returns the new value and whether
/// it wrapped.
fn wrap_axis(v: f64, bound: f64) -> (f64, bool) {
    if v >= bound {
        (0.0, true)
    } else if v < 0.0 {
        (just_below(bound), true)
    } else {
        (v, false)
    }
}

/// The largest f64 strictly less than a positive finite `bound`.
fn just_below(bound: f64) -> f64 {
    if bound > 0.0 && bound.is_finite() {
        f64::from_bits(bound.to_bits() - 1)
    } else {
        0.0
    }
}

/// The particle collection, in insertion (and draw) order.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    /// Creates `count` random particles on a `width x height` canvas.
    pub fn new(count: usize, rng: &mut Xorshift64, width: f64, height: f64) -> Self {
        let mut system = Self::default();
        system.add_batch(count, rng, width, height);
        system
    }

    /// Wraps an existing list of particles.
    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Appends `count` random particles.
    pub fn add_batch(&mut self, count: usize, rng: &mut Xorshift64, width: f64, height: f64) {
        self.particles.reserve(count);
        self.particles
            .extend((0..count).map(|_| Particle::random(rng, width, height)));
    }

    /// Removes up to `count` particles from the front and returns how many
    /// were removed. Asking for more than exist empties the system.
    pub fn remove_batch(&mut self, count: usize) -> usize {
        let n = count.min(self.particles.len());
        self.particles.drain(..n);
        n
    }

    /// Moves every particle to a fresh random position without trails.
    pub fn reset(&mut self, rng: &mut Xorshift64, width: f64, height: f64) {
        for p in &mut self.particles {
            p.relocate(rng.next_position(width, height));
        }
    }

    /// Runs one frame for every particle in order.
    pub fn update(
        &mut self,
        field: &FlowField,
        surface: &mut dyn Surface,
        palette: PaletteMode,
        noise: &dyn NoiseSource,
        max_speed: f64,
        stroke_weight: f64,
    ) {
        let (w, h) = surface.size();
        let (width, height) = (w as f64, h as f64);
        for p in &mut self.particles {
            p.follow(field);
            p.integrate(max_speed);
            p.wrap_edges(width, height);
            p.draw(surface, palette, noise, stroke_weight);
        }
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether every particle has been removed.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}
