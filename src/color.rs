// src/color.rs

//! Color values carried by text attributes, and their resolution to RGB.
//!
//! Attributes store colors symbolically (`Default`, a named ANSI color, a
//! 256-palette index or a true color). Engines only ever see resolved
//! `Color::Rgb` values produced by [`Color::to_rgb`] together with the
//! defaults held in `RenderSettings`.

use serde::{Deserialize, Serialize};

/// Standard ANSI named colors (indices 0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

impl NamedColor {
    /// Maps a palette index in `0..16` to its named color.
    pub fn from_index(idx: u8) -> Option<Self> {
        use NamedColor::*;
        const ALL: [NamedColor; 16] = [
            Black,
            Red,
            Green,
            Yellow,
            Blue,
            Magenta,
            Cyan,
            White,
            BrightBlack,
            BrightRed,
            BrightGreen,
            BrightYellow,
            BrightBlue,
            BrightMagenta,
            BrightCyan,
            BrightWhite,
        ];
        ALL.get(idx as usize).copied()
    }

    /// The bright counterpart of a normal color; bright colors map to themselves.
    pub fn brightened(self) -> Self {
        let idx = self as u8;
        if idx < 8 {
            // Indices 8..16 always exist.
            NamedColor::from_index(idx + 8).unwrap_or(self)
        } else {
            self
        }
    }

    /// sRGB values used by most xterm-compatible terminals.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::Red => (205, 0, 0),
            NamedColor::Green => (0, 205, 0),
            NamedColor::Yellow => (205, 205, 0),
            NamedColor::Blue => (0, 0, 238),
            NamedColor::Magenta => (205, 0, 205),
            NamedColor::Cyan => (0, 205, 205),
            NamedColor::White => (229, 229, 229),
            NamedColor::BrightBlack => (127, 127, 127),
            NamedColor::BrightRed => (255, 0, 0),
            NamedColor::BrightGreen => (0, 255, 0),
            NamedColor::BrightYellow => (255, 255, 0),
            NamedColor::BrightBlue => (92, 92, 255),
            NamedColor::BrightMagenta => (255, 0, 255),
            NamedColor::BrightCyan => (0, 255, 255),
            NamedColor::BrightWhite => (255, 255, 255),
        }
    }
}

/// A color as stored in a text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Color {
    /// Resolved against the default foreground or background at paint time.
    #[default]
    Default,
    Named(NamedColor),
    /// An index into the 256-color palette. Indices 0-15 alias the named colors.
    Indexed(u8),
    Rgb(u8, u8, u8),
}

const ANSI_NAMED_COLOR_COUNT: u8 = 16;
const COLOR_CUBE_OFFSET: u8 = 16;
const COLOR_CUBE_SIZE: u8 = 6;
const GRAYSCALE_OFFSET: u8 = COLOR_CUBE_OFFSET + COLOR_CUBE_SIZE * COLOR_CUBE_SIZE * COLOR_CUBE_SIZE;

impl Color {
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }

    /// Resolves this color to `Color::Rgb`, substituting `default` for `Color::Default`.
    ///
    /// `default` is expected to be concrete already; if it is not, it is
    /// resolved recursively against black.
    pub fn to_rgb(self, default: Color) -> Color {
        match self {
            Color::Default => match default {
                Color::Default => Color::Rgb(0, 0, 0),
                other => other.to_rgb(Color::Rgb(0, 0, 0)),
            },
            Color::Named(named) => {
                let (r, g, b) = named.rgb();
                Color::Rgb(r, g, b)
            }
            Color::Indexed(idx) if idx < ANSI_NAMED_COLOR_COUNT => match NamedColor::from_index(idx) {
                Some(named) => Color::Named(named).to_rgb(default),
                None => Color::Rgb(0, 0, 0),
            },
            Color::Indexed(idx) if idx < GRAYSCALE_OFFSET => {
                let cube_idx = idx - COLOR_CUBE_OFFSET;
                let component = |c: u8| if c == 0 { 0 } else { c * 40 + 55 };
                Color::Rgb(
                    component((cube_idx / (COLOR_CUBE_SIZE * COLOR_CUBE_SIZE)) % COLOR_CUBE_SIZE),
                    component((cube_idx / COLOR_CUBE_SIZE) % COLOR_CUBE_SIZE),
                    component(cube_idx % COLOR_CUBE_SIZE),
                )
            }
            Color::Indexed(idx) => {
                let level = (idx - GRAYSCALE_OFFSET) * 10 + 8;
                Color::Rgb(level, level, level)
            }
            rgb @ Color::Rgb(..) => rgb,
        }
    }

    /// Halves the intensity of a resolved color. Used for faint rendition.
    pub fn dimmed(self) -> Color {
        match self.to_rgb(Color::Rgb(0, 0, 0)) {
            Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
            other => other,
        }
    }
}
