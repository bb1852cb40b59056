//! Discrete input commands applied between frames.

use crate::palette::PaletteMode;

/// A command from the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clear the surface and scatter every particle to a new random position.
    Reset,
    /// Append one batch of particles.
    AddBatch,
    /// Remove one batch of particles from the front.
    RemoveBatch,
    /// Switch the stroke palette.
    SelectPalette(PaletteMode),
}

/// Key bindings as `(key label, description)`, for help output.
pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("space", "clear canvas and scatter particles"),
    ("+ / =", "add a batch of particles"),
    ("-", "remove a batch of particles"),
    ("1", "rainbow palette"),
    ("2", "ocean palette"),
    ("3", "fire palette"),
    ("4", "monochrome palette"),
];

impl Command {
    /// Maps a key press to a command. Unbound keys return `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            ' ' => Some(Self::Reset),
            '+' | '=' => Some(Self::AddBatch),
            '-' => Some(Self::RemoveBatch),
            '1'..='4' => {
                let index = key as usize - '1' as usize;
                Some(Self::SelectPalette(PaletteMode::from_index(index)))
            }
            _ => None,
        }
    }
}
