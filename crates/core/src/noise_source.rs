//! Noise sources: deterministic scalar functions of (x, y, z).
//!
//! The flow field samples a [`NoiseSource`] once per grid cell per frame,
//! using the third coordinate as time. Values are normalized to [0, 1] so
//! the angle mapping and palette formulas can treat them as fractions.

use noise::{NoiseFn, Perlin};

/// Default number of octaves summed by [`PerlinNoise`].
pub const DEFAULT_OCTAVES: u32 = 4;
/// Default per-octave amplitude falloff.
pub const DEFAULT_FALLOFF: f64 = 0.5;
/// Frequency multiplier between octaves.
const LACUNARITY: f64 = 2.0;

/// A deterministic scalar noise function.
///
/// Implementations must return the same value for identical inputs, and
/// values in [0, 1].
pub trait NoiseSource: Send + Sync {
    /// Sample the noise at (x, y, z).
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Multi-octave Perlin noise normalized to [0, 1].
///
/// Octaves are summed at doubling frequency with amplitude scaled by
/// `falloff` per octave, divided by the total amplitude, then remapped from
/// [-1, 1] to [0, 1].
#[derive(Clone)]
pub struct PerlinNoise {
    noise: Perlin,
    octaves: u32,
    falloff: f64,
}

/// Returns the same value everywhere. Used for reproducible field shapes in tests
/// and for flat "calm" fields.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(pub f64);

impl PerlinNoise {
    /// Creates a Perlin noise source. `octaves` is clamped to at least 1.
    pub fn new(seed: u32, octaves: u32, falloff: f64) -> Self {
        Self {
            noise: Perlin::new(seed),
            octaves: octaves.max(1),
            falloff,
        }
    }
}

impl Default for PerlinNoise {
    fn default() -> Self {
        Self::new(0, DEFAULT_OCTAVES, DEFAULT_FALLOFF)
    }
}

impl NoiseSource for PerlinNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (total, norm, _, _) = (0..self.octaves).fold(
            (0.0, 0.0, 1.0, 1.0),
            |(total, norm, amp, freq), _| {
                (
                    total + self.noise.get([x * freq, y * freq, z * freq]) * amp,
                    norm + amp,
                    amp * self.falloff,
                    freq * LACUNARITY,
                )
            },
        );
        if norm <= 0.0 || !total.is_finite() {
            return 0.5;
        }
        (total / norm * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl NoiseSource for ConstantNoise {
    fn sample(&self, _x: f64, _y: f64, _z: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perlin_is_deterministic_for_same_seed() {
        let a = PerlinNoise::new(7, 4, 0.5);
        let b = PerlinNoise::new(7, 4, 0.5);
        for i in 0..100 {
            let x = i as f64 * 0.37;
            assert_eq!(
                a.sample(x, x * 0.5, 0.003).to_bits(),
                b.sample(x, x * 0.5, 0.003).to_bits()
            );
        }
    }

    #[test]
    fn different_seeds_give_different_noise() {
        let a = PerlinNoise::new(1, 4, 0.5);
        let b = PerlinNoise::new(2, 4, 0.5);
        let differs = (0..50).any(|i| {
            let x = i as f64 * 0.31 + 0.1;
            (a.sample(x, 1.7, 0.2) - b.sample(x, 1.7, 0.2)).abs() > 1e-9
        });
        assert!(differs, "seeds 1 and 2 produced identical noise");
    }

    #[test]
    fn single_octave_matches_remapped_perlin_golden_value() {
        // Pins noise = "=0.9.0", Perlin::new(42).get([1.3, 2.7, 0.5]).
        // If this changes, saved seeds no longer replay identically.
        const GOLDEN_BITS: u64 = 0x3fd3_f04b_8ca2_cd01;
        let raw = f64::from_bits(GOLDEN_BITS);
        let n = PerlinNoise::new(42, 1, 0.5);
        let expected = (raw * 0.5 + 0.5).clamp(0.0, 1.0);
        assert_eq!(n.sample(1.3, 2.7, 0.5).to_bits(), expected.to_bits());
    }

    #[test]
    fn zero_octaves_is_treated_as_one() {
        let zero = PerlinNoise::new(3, 0, 0.5);
        let one = PerlinNoise::new(3, 1, 0.5);
        for (x, y, z) in [(0.4, 0.9, 0.1), (2.3, -1.7, 5.0)] {
            assert_eq!(zero.sample(x, y, z).to_bits(), one.sample(x, y, z).to_bits());
        }
    }

    #[test]
    fn constant_noise_ignores_coordinates() {
        let n = ConstantNoise(0.5);
        assert_eq!(n.sample(0.0, 0.0, 0.0), 0.5);
        assert_eq!(n.sample(-100.0, 3.5, 99.0), 0.5);
    }

    #[test]
    fn noise_source_is_object_safe() {
        let sources: Vec<Box<dyn NoiseSource>> =
            vec![Box::new(PerlinNoise::default()), Box::new(ConstantNoise(0.25))];
        for s in &sources {
            let v = s.sample(1.1, 2.2, 3.3);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn perlin_always_in_unit_interval(
                seed: u32,
                octaves in 1_u32..8,
                falloff in 0.05_f64..1.0,
                x in -1e4_f64..1e4,
                y in -1e4_f64..1e4,
                z in 0.0_f64..100.0,
            ) {
                let n = PerlinNoise::new(seed, octaves, falloff);
                let v = n.sample(x, y, z);
                prop_assert!((0.0..=1.0).contains(&v), "sample = {v}");
            }
        }
    }
}
