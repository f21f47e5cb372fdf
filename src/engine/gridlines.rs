// src/engine/gridlines.rs

use bitflags::bitflags;

use crate::glyph::{TextAttribute, UnderlineStyle};

bitflags! {
    /// Decorative lines drawn around or through a run of cells,
    /// independently of the glyphs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GridLines: u16 {
        const TOP                 = 1 << 0;
        const BOTTOM              = 1 << 1;
        const LEFT                = 1 << 2;
        const RIGHT               = 1 << 3;
        const STRIKETHROUGH       = 1 << 4;
        const UNDERLINE           = 1 << 5;
        const DOUBLE_UNDERLINE    = 1 << 6;
        const CURLY_UNDERLINE     = 1 << 7;
        const DOTTED_UNDERLINE    = 1 << 8;
        const DASHED_UNDERLINE    = 1 << 9;
        const HYPERLINK_UNDERLINE = 1 << 10;
    }
}

/// The grid lines implied by `attr` alone, with no hover state applied.
pub fn gridlines_for(attr: &TextAttribute) -> GridLines {
    let mut lines = GridLines::empty();
    lines.set(GridLines::TOP, attr.is_top_horizontal_displayed());
    lines.set(GridLines::BOTTOM, attr.is_bottom_horizontal_displayed());
    lines.set(GridLines::LEFT, attr.is_left_vertical_displayed());
    lines.set(GridLines::RIGHT, attr.is_right_vertical_displayed());
    lines.set(GridLines::STRIKETHROUGH, attr.is_crossed_out());
    lines |= match attr.underline {
        UnderlineStyle::None => GridLines::empty(),
        UnderlineStyle::Single => GridLines::UNDERLINE,
        UnderlineStyle::Double => GridLines::DOUBLE_UNDERLINE,
        UnderlineStyle::Curly => GridLines::CURLY_UNDERLINE,
        UnderlineStyle::Dotted => GridLines::DOTTED_UNDERLINE,
        UnderlineStyle::Dashed => GridLines::DASHED_UNDERLINE,
    };
    lines.set(GridLines::HYPERLINK_UNDERLINE, attr.is_hyperlink());
    lines
}
