#![deny(unsafe_code)]
//! Core types and traits for the flowfield generative sketch.
//!
//! Provides the `Sketch` trait, the `Surface` drawing abstraction, the
//! `NoiseSource` trait with a multi-octave Perlin implementation, color types
//! (`Hsba`, `Srgb`), the `Xorshift64` PRNG, the replayable `Seed`, and
//! parameter helpers.

pub mod color;
pub mod error;
pub mod noise_source;
pub mod params;
pub mod prng;
pub mod seed;
pub mod sketch;
pub mod surface;

pub use color::{Hsba, Srgb};
pub use error::EngineError;
pub use noise_source::{ConstantNoise, NoiseSource, PerlinNoise};
pub use prng::Xorshift64;
pub use seed::{KeyEvent, Seed};
pub use sketch::Sketch;
pub use surface::Surface;
