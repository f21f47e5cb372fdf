// src/buffer/row.rs

//! A single row of the text buffer.

use unicode_width::UnicodeWidthChar;

use crate::geometry::{CoordType, Size};
use crate::glyph::{DbcsAttribute, Glyph, TextAttribute};

/// How a row is scaled when drawn (DECDWL / DECDHL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineRendition {
    #[default]
    SingleWidth,
    DoubleWidth,
    DoubleHeightTop,
    DoubleHeightBottom,
}

impl LineRendition {
    pub fn is_double_width(self) -> bool {
        self != LineRendition::SingleWidth
    }
}

/// A slice of a raster image attached to one row (e.g. a sixel strip).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSlice {
    /// Pixel size of one cell at the time the image was placed.
    pub cell_size: Size,
    pub column_begin: CoordType,
    pub column_end: CoordType,
    /// Row-major RGBA pixels covering `column_begin..column_end`.
    pub pixels: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Glyph>,
    rendition: LineRendition,
    wrap_forced: bool,
    image_slice: Option<ImageSlice>,
}

impl Row {
    pub fn new(width: usize, attr: TextAttribute) -> Self {
        Self {
            cells: vec![Glyph::blank(attr); width],
            rendition: LineRendition::SingleWidth,
            wrap_forced: false,
            image_slice: None,
        }
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Glyph] {
        &self.cells
    }

    pub fn glyph_at(&self, column: CoordType) -> Option<&Glyph> {
        usize::try_from(column).ok().and_then(|c| self.cells.get(c))
    }

    pub fn attr_at(&self, column: CoordType) -> Option<TextAttribute> {
        self.glyph_at(column).map(|g| g.attr)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &TextAttribute> + '_ {
        self.cells.iter().map(|g| &g.attr)
    }

    pub fn dbcs_at(&self, column: CoordType) -> DbcsAttribute {
        self.glyph_at(column).map(|g| g.dbcs).unwrap_or_default()
    }

    pub fn line_rendition(&self) -> LineRendition {
        self.rendition
    }

    pub fn set_line_rendition(&mut self, rendition: LineRendition) {
        self.rendition = rendition;
    }

    pub fn was_wrap_forced(&self) -> bool {
        self.wrap_forced
    }

    pub fn set_wrap_forced(&mut self, wrap: bool) {
        self.wrap_forced = wrap;
    }

    pub fn image_slice(&self) -> Option<&ImageSlice> {
        self.image_slice.as_ref()
    }

    pub fn set_image_slice(&mut self, slice: Option<ImageSlice>) {
        self.image_slice = slice;
    }

    /// Resets every cell to a blank with `attr` and drops row metadata.
    pub fn reset(&mut self, attr: TextAttribute) {
        self.cells.fill(Glyph::blank(attr));
        self.rendition = LineRendition::SingleWidth;
        self.wrap_forced = false;
        self.image_slice = None;
    }

    /// Writes `text` starting at `column` and returns the column after the
    /// last written cell. Stops at the end of the row; a wide character that
    /// does not fit in the last column is replaced by padding.
    ///
    /// Zero-width characters are appended to the preceding cell.
    pub fn replace_text(&mut self, column: CoordType, text: &str, attr: TextAttribute) -> CoordType {
        let width = self.cells.len() as CoordType;
        let mut col = column.max(0);
        for c in text.chars() {
            let char_width = c.width().unwrap_or(1) as CoordType;
            if char_width == 0 {
                if col > 0 && col <= width {
                    let prev = (col - 1) as usize;
                    self.cells[prev].text.push(c);
                    if self.cells[prev].dbcs == DbcsAttribute::Trailing && prev > 0 {
                        self.cells[prev - 1].text.push(c);
                    }
                }
                continue;
            }
            if col >= width {
                break;
            }
            if char_width == 2 {
                if col + 1 >= width {
                    self.cells[col as usize] = Glyph::blank(attr);
                    col += 1;
                    break;
                }
                let text = c.to_string();
                self.cells[col as usize] = Glyph {
                    text: text.clone(),
                    attr,
                    dbcs: DbcsAttribute::Leading,
                };
                self.cells[col as usize + 1] = Glyph {
                    text,
                    attr,
                    dbcs: DbcsAttribute::Trailing,
                };
                col += 2;
            } else {
                self.cells[col as usize] = Glyph {
                    text: c.to_string(),
                    attr,
                    dbcs: DbcsAttribute::Single,
                };
                col += 1;
            }
        }
        self.repair_wide_halves();
        col
    }

    /// Sets the attribute of cells in `[begin, end)`.
    pub fn replace_attributes(&mut self, begin: CoordType, end: CoordType, attr: TextAttribute) {
        let end = end.min(self.cells.len() as CoordType);
        for col in begin.max(0)..end {
            self.cells[col as usize].attr = attr;
        }
    }

    /// Turns halves of wide characters that lost their partner into blanks.
    fn repair_wide_halves(&mut self) {
        let len = self.cells.len();
        for i in 0..len {
            let orphan = match self.cells[i].dbcs {
                DbcsAttribute::Leading => {
                    i + 1 >= len || self.cells[i + 1].dbcs != DbcsAttribute::Trailing
                }
                DbcsAttribute::Trailing => i == 0 || self.cells[i - 1].dbcs != DbcsAttribute::Leading,
                DbcsAttribute::Single => false,
            };
            if orphan {
                let attr = self.cells[i].attr;
                self.cells[i] = Glyph::blank(attr);
            }
        }
    }
}
