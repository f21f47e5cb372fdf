// src/engine/headless.rs

//! An engine that paints into an in-memory grid of cells.
//!
//! Nothing is rasterized; each surface cell records the text, resolved
//! colors, grid lines and selection state it was last painted with. Used
//! by the binary to show what a frame produced and by the tests.

use anyhow::Result;
use log::{debug, trace};
use std::time::Duration;

use crate::buffer::CursorType;
use crate::color::Color;
use crate::geometry::{CoordType, Point, Rect, Size, Viewport};
use crate::glyph::{AttrFlags, TextAttribute};

use super::{Cluster, CursorOptions, EngineBase, GridLines, RenderEngine, RenderFrame};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceCell {
    /// Empty for the right half of a wide character.
    pub text: String,
    pub fg: Color,
    pub bg: Color,
    pub faint: bool,
    pub lines: GridLines,
    pub selected: bool,
}

impl SurfaceCell {
    fn blank(bg: Color) -> Self {
        Self {
            text: " ".to_string(),
            fg: bg,
            bg,
            faint: false,
            lines: GridLines::empty(),
            selected: false,
        }
    }
}

/// Where and how the cursor was drawn in the last frame that painted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintedCursor {
    pub position: Point,
    pub cursor_type: CursorType,
    pub is_on: bool,
}

#[derive(Debug)]
pub struct HeadlessEngine {
    base: EngineBase,
    size: Size,
    cells: Vec<SurfaceCell>,
    fg: Color,
    bg: Color,
    faint: bool,
    default_bg: Color,
    cursor: Option<PaintedCursor>,
    title: String,
    title_updates: usize,
    frames_painted: usize,
    presents: usize,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new(super::DEFAULT_THROTTLE)
    }
}

impl HeadlessEngine {
    pub fn new(throttle: Duration) -> Self {
        Self {
            base: EngineBase::new(throttle),
            size: Size::default(),
            cells: Vec::new(),
            fg: Color::Default,
            bg: Color::Default,
            faint: false,
            default_bg: Color::Rgb(0, 0, 0),
            cursor: None,
            title: String::new(),
            title_updates: 0,
            frames_painted: 0,
            presents: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn cell(&self, x: CoordType, y: CoordType) -> Option<&SurfaceCell> {
        self.index(x, y).and_then(|i| self.cells.get(i))
    }

    fn cell_mut(&mut self, x: CoordType, y: CoordType) -> Option<&mut SurfaceCell> {
        self.index(x, y).and_then(move |i| self.cells.get_mut(i))
    }

    fn index(&self, x: CoordType, y: CoordType) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }

    /// The painted text, one string per row, with trailing halves skipped.
    pub fn snapshot_text(&self) -> Vec<String> {
        (0..self.size.height)
            .map(|y| {
                (0..self.size.width)
                    .filter_map(|x| self.cell(x, y))
                    .map(|c| c.text.as_str())
                    .collect()
            })
            .collect()
    }

    pub fn cursor(&self) -> Option<PaintedCursor> {
        self.cursor
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_updates(&self) -> usize {
        self.title_updates
    }

    /// Frames that went past `start_paint`.
    pub fn frames_painted(&self) -> usize {
        self.frames_painted
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    fn resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }
        debug!("HeadlessEngine: Resizing surface to {}x{}", size.width, size.height);
        self.size = size;
        let count = (size.width.max(0) * size.height.max(0)) as usize;
        self.cells = vec![SurfaceCell::blank(self.default_bg); count];
    }

    fn for_each_cell_in(&mut self, rect: Rect, mut f: impl FnMut(&mut SurfaceCell)) {
        let rect = rect.intersect(&Rect::from_point_size(Point::default(), self.size));
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                if let Some(cell) = self.cell_mut(x, y) {
                    f(cell);
                }
            }
        }
    }
}

impl RenderEngine for HeadlessEngine {
    fn base(&self) -> &EngineBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EngineBase {
        &mut self.base
    }

    fn paint_background(&mut self) -> Result<()> {
        self.frames_painted += 1;
        let bg = self.default_bg;
        for rect in self.base.dirty().dirty_area() {
            self.for_each_cell_in(rect, |cell| *cell = SurfaceCell::blank(bg));
        }
        self.cursor = None;
        Ok(())
    }

    fn paint_buffer_line(
        &mut self,
        clusters: &[Cluster<'_>],
        target: Point,
        trim_left: bool,
        _line_wrapped: bool,
    ) -> Result<()> {
        trace!(
            "HeadlessEngine: {} clusters at ({}, {})",
            clusters.len(),
            target.x,
            target.y
        );
        let (fg, bg, faint) = (self.fg, self.bg, self.faint);
        let mut x = target.x;
        for (i, cluster) in clusters.iter().enumerate() {
            let skip = usize::from(trim_left && i == 0);
            for col in 0..cluster.columns().max(1) {
                let text = if col as usize == skip { cluster.text() } else { "" };
                if col as usize >= skip {
                    if let Some(cell) = self.cell_mut(x + col, target.y) {
                        cell.text = text.to_string();
                        cell.fg = fg;
                        cell.bg = bg;
                        cell.faint = faint;
                        cell.lines = GridLines::empty();
                        cell.selected = false;
                    }
                }
            }
            x += cluster.columns().max(1);
        }
        Ok(())
    }

    fn paint_buffer_grid_lines(
        &mut self,
        lines: GridLines,
        _color: Color,
        _underline_color: Color,
        columns: CoordType,
        target: Point,
    ) -> Result<()> {
        let rect = Rect::new(target.x, target.y, target.x + columns, target.y + 1);
        self.for_each_cell_in(rect, |cell| cell.lines |= lines);
        Ok(())
    }

    fn paint_selection(&mut self, rect: Rect) -> Result<()> {
        self.for_each_cell_in(rect, |cell| cell.selected = true);
        Ok(())
    }

    fn paint_cursor(&mut self, options: &CursorOptions) -> Result<()> {
        self.cursor = Some(PaintedCursor {
            position: Point::new(options.coord.x - options.viewport_left, options.coord.y),
            cursor_type: options.cursor_type,
            is_on: options.is_on,
        });
        Ok(())
    }

    fn update_drawing_brushes(
        &mut self,
        attr: &TextAttribute,
        frame: &RenderFrame<'_>,
        _using_soft_font: bool,
        is_setting_defaults: bool,
    ) -> Result<()> {
        let (fg, bg) = frame.settings.attribute_colors(attr, frame.blink_faint);
        self.fg = fg;
        self.bg = bg;
        self.faint = attr.flags.contains(AttrFlags::FAINT) || (attr.is_blinking() && frame.blink_faint);
        if is_setting_defaults {
            self.default_bg = frame.settings.default_bg.to_rgb(Color::Rgb(0, 0, 0));
        }
        Ok(())
    }

    fn do_update_title(&mut self, title: &str) -> Result<()> {
        self.title = title.to_string();
        self.title_updates += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn update_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.resize(viewport.size());
        self.base.dirty_mut().resize(viewport.size());
        Ok(())
    }
}
