//! Reproducible record of a sketch run.
//!
//! A [`Seed`] captures everything needed to recreate an image: canvas
//! dimensions, parameters, PRNG seed, frame count, and the key presses the
//! host delivered between frames.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A key press delivered before the given frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub frame: u64,
    pub key: char,
}

/// Everything needed to reproduce a sketch run.
///
/// Two identical `Seed` values replayed by the same binary produce
/// bit-identical output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub width: usize,
    pub height: usize,
    pub params: serde_json::Value,
    pub seed: u64,
    pub frames: u64,
    #[serde(default)]
    pub keys: Vec<KeyEvent>,
}

impl Seed {
    /// Creates a new Seed with default params (`{}`), no frames and no key presses.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            params: serde_json::Value::Object(serde_json::Map::new()),
            seed,
            frames: 0,
            keys: Vec::new(),
        }
    }

    /// Validates that the seed has non-zero dimensions and that
    /// `width * height` does not overflow.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(EngineError::InvalidDimensions)?;
        Ok(())
    }

    /// Key presses due before `frame`, in recorded order.
    pub fn keys_at(&self, frame: u64) -> impl Iterator<Item = char> + '_ {
        self.keys
            .iter()
            .filter(move |k| k.frame == frame)
            .map(|k| k.key)
    }
}

impl FromStr for KeyEvent {
    type Err = EngineError;

    /// Parses `"<frame>:<key>"`, where key is a single character or `space`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidKeyEvent(s.to_owned());
        let (frame, key) = s.trim_start().split_once(':').ok_or_else(invalid)?;
        let frame = frame.trim().parse::<u64>().map_err(|_| invalid())?;
        let key = if key.eq_ignore_ascii_case("space") {
            ' '
        } else {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(invalid()),
            }
        };
        Ok(KeyEvent { frame, key })
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key == ' ' {
            write!(f, "{}:space", self.frame)
        } else {
            write!(f, "{}:{}", self.frame, self.key)
        }
    }
}

/// Parses a comma-separated key script such as `"120:+,300:3,450:space"`.
///
/// An empty string yields no events. Events are sorted by frame, keeping the
/// written order for presses on the same frame.
pub fn parse_key_script(script: &str) -> Result<Vec<KeyEvent>, EngineError> {
    if script.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut events = script
        .split(',')
        .map(str::parse)
        .collect::<Result<Vec<KeyEvent>, _>>()?;
    events.sort_by_key(|e| e.frame);
    Ok(events)
}
