// src/engine/line_data.rs

use crate::buffer::{LineRendition, TextBuffer, TextBufferCellIterator};
use crate::data::RenderView;
use crate::geometry::{Point, Rect, Viewport};

/// Everything an engine needs to paint one row, built fresh per dirty line.
pub struct BufferLineRenderData<'a> {
    pub render_data: &'a dyn RenderView,
    /// The buffer the row is read from: the main buffer or an overlay's.
    pub buffer: &'a TextBuffer,
    /// The cells of the row to paint, in `buffer` coordinates (one row tall).
    pub buffer_line: Viewport,
    /// The visible viewport at the time of the frame.
    pub visible_viewport: Viewport,
    /// Where the first cell lands on screen.
    pub target: Point,
    pub line_rendition: LineRendition,
    /// The row was force-wrapped and its last column is being painted.
    pub line_wrapped: bool,
    pub global_invert: bool,
    pub grid_lines_allowed: bool,
}

impl<'a> BufferLineRenderData<'a> {
    pub fn cells(&self) -> TextBufferCellIterator<'a> {
        self.buffer.cell_iter_at(self.buffer_line.origin(), self.buffer_line)
    }
}

/// Maps a screen row segment (exclusive) to the buffer cells it shows.
/// On double-width rows every buffer cell covers two screen columns.
pub fn screen_to_buffer_line(line: Rect, rendition: LineRendition) -> Rect {
    if rendition.is_double_width() {
        Rect::new(line.left >> 1, line.top, (line.right + 1) >> 1, line.bottom)
    } else {
        line
    }
}

/// The inverse of [`screen_to_buffer_line`].
pub fn buffer_to_screen_line(line: Rect, rendition: LineRendition) -> Rect {
    if rendition.is_double_width() {
        Rect::new(line.left << 1, line.top, line.right << 1, line.bottom)
    } else {
        line
    }
}
