// src/buffer/cell_iterator.rs

//! Cell-by-cell read access to a bounded region of the text buffer.

use crate::geometry::{Point, Viewport};
use crate::glyph::{DbcsAttribute, Glyph, TextAttribute};

use super::TextBuffer;

/// Walks the cells of a [`TextBuffer`] inside a bounding viewport, in
/// row-major order.
///
/// Moving outside the bounds makes the iterator invalid; moving back in
/// makes it valid again. Reads on an invalid iterator return `None`.
#[derive(Debug, Clone, Copy)]
pub struct TextBufferCellIterator<'a> {
    buffer: &'a TextBuffer,
    bounds: Viewport,
    pos: Point,
    valid: bool,
}

impl<'a> TextBufferCellIterator<'a> {
    pub(super) fn new(buffer: &'a TextBuffer, pos: Point, limit: Viewport) -> Self {
        let bounds = limit.intersect(&buffer.size());
        let valid = bounds.is_in_bounds(pos);
        Self {
            buffer,
            bounds,
            pos,
            valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn bounds(&self) -> Viewport {
        self.bounds
    }

    pub fn buffer(&self) -> &'a TextBuffer {
        self.buffer
    }

    pub fn glyph(&self) -> Option<&'a Glyph> {
        if !self.valid {
            return None;
        }
        self.buffer.glyph_at(self.pos)
    }

    pub fn text_attr(&self) -> Option<TextAttribute> {
        self.glyph().map(|g| g.attr)
    }

    /// The text of the current cell, empty when invalid.
    pub fn chars(&self) -> &'a str {
        self.glyph().map(|g| g.text.as_str()).unwrap_or("")
    }

    pub fn columns(&self) -> i32 {
        self.glyph().map(Glyph::columns).unwrap_or(0)
    }

    pub fn dbcs_attr(&self) -> DbcsAttribute {
        self.glyph().map(|g| g.dbcs).unwrap_or_default()
    }

    /// Moves by `delta` cells (negative moves backwards).
    pub fn advance(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }
        self.valid = self.bounds.walk_in_bounds(&mut self.pos, delta);
    }
}
