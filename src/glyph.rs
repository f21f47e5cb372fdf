// src/glyph.rs

//! Defines the `Glyph` type (one text buffer cell), its visual attributes
//! (`AttrFlags`, `UnderlineStyle`, `TextAttribute`) and the double-byte
//! half marker used for wide characters.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::Color;

bitflags! {
    /// Rendition flags of a text attribute.
    ///
    /// The four `*_GRIDLINE` flags are the console's box-drawing line
    /// attributes; they are drawn independently of the glyph shape.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AttrFlags: u16 {
        const BOLD             = 1 << 0;
        const FAINT            = 1 << 1;
        const ITALIC           = 1 << 2;
        const BLINK            = 1 << 3;
        const REVERSE          = 1 << 4;
        const INVISIBLE        = 1 << 5;
        const CROSSED_OUT      = 1 << 6;
        const OVERLINED        = 1 << 7;
        const TOP_GRIDLINE     = 1 << 8;
        const BOTTOM_GRIDLINE  = 1 << 9;
        const LEFT_GRIDLINE    = 1 << 10;
        const RIGHT_GRIDLINE   = 1 << 11;
    }
}

/// Flags whose effect is visible on a blank cell.
const BLANK_VISIBLE_FLAGS: AttrFlags = AttrFlags::CROSSED_OUT
    .union(AttrFlags::OVERLINED)
    .union(AttrFlags::TOP_GRIDLINE)
    .union(AttrFlags::BOTTOM_GRIDLINE)
    .union(AttrFlags::LEFT_GRIDLINE)
    .union(AttrFlags::RIGHT_GRIDLINE);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
    Dotted,
    Dashed,
}

/// The visual attributes of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextAttribute {
    pub fg: Color,
    pub bg: Color,
    /// `Color::Default` means "same as the foreground".
    pub underline_color: Color,
    pub flags: AttrFlags,
    pub underline: UnderlineStyle,
    /// Zero when the text is not part of a hyperlink.
    pub hyperlink_id: u16,
}

impl TextAttribute {
    pub fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: AttrFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_underline(mut self, style: UnderlineStyle) -> Self {
        self.underline = style;
        self
    }

    pub fn with_hyperlink(mut self, id: u16) -> Self {
        self.hyperlink_id = id;
        self
    }

    pub fn is_blinking(&self) -> bool {
        self.flags.contains(AttrFlags::BLINK)
    }

    pub fn is_reverse_video(&self) -> bool {
        self.flags.contains(AttrFlags::REVERSE)
    }

    pub fn is_invisible(&self) -> bool {
        self.flags.contains(AttrFlags::INVISIBLE)
    }

    pub fn is_crossed_out(&self) -> bool {
        self.flags.contains(AttrFlags::CROSSED_OUT)
    }

    pub fn is_hyperlink(&self) -> bool {
        self.hyperlink_id != 0
    }

    pub fn is_top_horizontal_displayed(&self) -> bool {
        self.flags
            .intersects(AttrFlags::TOP_GRIDLINE | AttrFlags::OVERLINED)
    }

    pub fn is_bottom_horizontal_displayed(&self) -> bool {
        self.flags.contains(AttrFlags::BOTTOM_GRIDLINE)
    }

    pub fn is_left_vertical_displayed(&self) -> bool {
        self.flags.contains(AttrFlags::LEFT_GRIDLINE)
    }

    pub fn is_right_vertical_displayed(&self) -> bool {
        self.flags.contains(AttrFlags::RIGHT_GRIDLINE)
    }

    /// Returns true if a blank cell drawn with `self` looks exactly like a
    /// blank cell drawn with `other`.
    ///
    /// Only the effective background and the decorations that show up on a
    /// space matter; the foreground is irrelevant for blank space.
    pub fn has_identical_visual_representation_for_blank_space(
        &self,
        other: &TextAttribute,
        global_invert: bool,
    ) -> bool {
        self.effective_background(global_invert) == other.effective_background(global_invert)
            && (self.flags & BLANK_VISIBLE_FLAGS) == (other.flags & BLANK_VISIBLE_FLAGS)
            && self.underline == other.underline
            && self.hyperlink_id == other.hyperlink_id
            && (self.underline == UnderlineStyle::None || self.underline_color == other.underline_color)
    }

    fn effective_background(&self, global_invert: bool) -> Color {
        if self.is_reverse_video() != global_invert {
            self.fg
        } else {
            self.bg
        }
    }
}

/// Which half of a double-width character a cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DbcsAttribute {
    #[default]
    Single,
    Leading,
    Trailing,
}

/// One cell of the text buffer.
///
/// Both halves of a wide character carry the same text; the `dbcs` marker
/// tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub text: String,
    pub attr: TextAttribute,
    pub dbcs: DbcsAttribute,
}

impl Glyph {
    pub fn blank(attr: TextAttribute) -> Self {
        Self {
            text: String::from(" "),
            attr,
            dbcs: DbcsAttribute::Single,
        }
    }

    /// Number of screen columns the cell's text occupies when drawn from this cell.
    pub fn columns(&self) -> i32 {
        match self.dbcs {
            DbcsAttribute::Leading => 2,
            DbcsAttribute::Single | DbcsAttribute::Trailing => 1,
        }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::blank(TextAttribute::default())
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
