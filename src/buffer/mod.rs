// src/buffer/mod.rs

//! The text buffer read by the renderer: a fixed grid of rows plus the
//! cursor.
//!
//! The buffer is owned by the data source (see `crate::data`); the renderer
//! only ever reads it while holding the console lock.

pub mod cell_iterator;
pub mod cursor;
pub mod row;

pub use cell_iterator::TextBufferCellIterator;
pub use cursor::{Cursor, CursorType};
pub use row::{ImageSlice, LineRendition, Row};

use crate::geometry::{CoordType, Point, Size, Viewport};
use crate::glyph::{Glyph, TextAttribute};

#[derive(Debug, Clone)]
pub struct TextBuffer {
    size: Size,
    rows: Vec<Row>,
    cursor: Cursor,
    default_attr: TextAttribute,
    mutation_id: u64,
}

impl TextBuffer {
    pub fn new(width: CoordType, height: CoordType, default_attr: TextAttribute) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            size: Size::new(width, height),
            rows: (0..height).map(|_| Row::new(width as usize, default_attr)).collect(),
            cursor: Cursor::default(),
            default_attr,
            mutation_id: 0,
        }
    }

    /// The whole buffer as a viewport anchored at the origin.
    pub fn size(&self) -> Viewport {
        Viewport::from_dimensions(Point::default(), self.size)
    }

    pub fn width(&self) -> CoordType {
        self.size.width
    }

    pub fn height(&self) -> CoordType {
        self.size.height
    }

    pub fn default_attr(&self) -> TextAttribute {
        self.default_attr
    }

    pub fn row(&self, y: CoordType) -> Option<&Row> {
        usize::try_from(y).ok().and_then(|y| self.rows.get(y))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access to a row. Counts as a buffer mutation.
    pub fn row_mut(&mut self, y: CoordType) -> Option<&mut Row> {
        self.mutation_id += 1;
        usize::try_from(y).ok().and_then(move |y| self.rows.get_mut(y))
    }

    pub fn glyph_at(&self, p: Point) -> Option<&Glyph> {
        self.row(p.y).and_then(|row| row.glyph_at(p.x))
    }

    pub fn line_rendition(&self, y: CoordType) -> LineRendition {
        self.row(y).map(Row::line_rendition).unwrap_or_default()
    }

    pub fn is_double_width_line(&self, y: CoordType) -> bool {
        self.line_rendition(y).is_double_width()
    }

    pub fn set_line_rendition(&mut self, y: CoordType, rendition: LineRendition) {
        if let Some(row) = self.row_mut(y) {
            row.set_line_rendition(rendition);
        }
    }

    pub fn set_wrap_forced(&mut self, y: CoordType, wrap: bool) {
        if let Some(row) = self.row_mut(y) {
            row.set_wrap_forced(wrap);
        }
    }

    pub fn set_image_slice(&mut self, y: CoordType, slice: Option<ImageSlice>) {
        if let Some(row) = self.row_mut(y) {
            row.set_image_slice(slice);
        }
    }

    /// Writes `text` at `at` on a single row and returns the position after it.
    /// Text that does not fit is dropped.
    pub fn write(&mut self, at: Point, text: &str, attr: TextAttribute) -> Point {
        match self.row_mut(at.y) {
            Some(row) => Point::new(row.replace_text(at.x, text, attr), at.y),
            None => at,
        }
    }

    /// Writes `text` at `at`, continuing on the next rows when a row is full.
    /// Rows that overflow are marked as force-wrapped.
    pub fn write_wrapped(&mut self, at: Point, text: &str, attr: TextAttribute) -> Point {
        let mut pos = at;
        let mut rest = text;
        while !rest.is_empty() && pos.y < self.size.height {
            let end = self.write(pos, rest, attr);
            let written = self.consumed_prefix(rest, end.x - pos.x);
            rest = &rest[written..];
            if rest.is_empty() {
                return end;
            }
            self.set_wrap_forced(pos.y, true);
            pos = Point::new(0, pos.y + 1);
        }
        pos
    }

    /// Byte length of the prefix of `text` that fills `columns` cells.
    fn consumed_prefix(&self, text: &str, columns: CoordType) -> usize {
        use unicode_width::UnicodeWidthChar;
        let mut used = 0;
        for (idx, c) in text.char_indices() {
            let w = c.width().unwrap_or(1) as CoordType;
            if w > 0 && used + w > columns {
                return idx;
            }
            used += w;
        }
        text.len()
    }

    pub fn set_attributes(&mut self, y: CoordType, begin: CoordType, end: CoordType, attr: TextAttribute) {
        if let Some(row) = self.row_mut(y) {
            row.replace_attributes(begin, end, attr);
        }
    }

    pub fn clear_row(&mut self, y: CoordType) {
        let attr = self.default_attr;
        if let Some(row) = self.row_mut(y) {
            row.reset(attr);
        }
    }

    /// Rotates the buffer up by `count` rows: the top rows are discarded and
    /// blank rows appear at the bottom.
    pub fn scroll_up(&mut self, count: CoordType) {
        let count = count.clamp(0, self.size.height) as usize;
        if count == 0 {
            return;
        }
        self.rows.rotate_left(count);
        let first_new = self.rows.len() - count;
        for row in &mut self.rows[first_new..] {
            row.reset(self.default_attr);
        }
        self.mutation_id += 1;
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Changes on every write; lets observers detect that the buffer moved on.
    pub fn last_mutation_id(&self) -> u64 {
        self.mutation_id
    }

    /// An iterator over the cells of `limit` starting at `at`.
    pub fn cell_iter_at(&self, at: Point, limit: Viewport) -> TextBufferCellIterator<'_> {
        TextBufferCellIterator::new(self, at, limit)
    }

    /// An iterator over the single row `y`.
    pub fn row_iter(&self, y: CoordType) -> TextBufferCellIterator<'_> {
        let line = Viewport::from_dimensions(Point::new(0, y), Size::new(self.size.width, 1));
        TextBufferCellIterator::new(self, Point::new(0, y), line)
    }

    /// The row's text with trailing halves of wide characters skipped.
    pub fn row_text(&self, y: CoordType) -> String {
        self.row(y)
            .map(|row| {
                row.cells()
                    .iter()
                    .filter(|g| g.dbcs != crate::glyph::DbcsAttribute::Trailing)
                    .map(|g| g.text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}
