// src/engine/mod.rs

//! Render engines: the backends that turn a frame into output.
//!
//! A backend implements [`RenderEngine`]'s drawing primitives and embeds an
//! [`EngineBase`], which provides title tracking, dirty-region tracking,
//! the cluster buffer and grid-line decisions. The trait's default
//! [`RenderEngine::render`] runs the whole per-frame pipeline, so most
//! backends only draw.

pub mod blinking;
pub mod cluster;
pub mod cluster_iterator;
pub mod gridlines;
pub mod headless;
pub mod line_data;
mod paint;

pub use blinking::BlinkingState;
pub use cluster::Cluster;
pub use cluster_iterator::{cluster_runs, RenderClusterIterator};
pub use gridlines::{gridlines_for, GridLines};
pub use headless::HeadlessEngine;
pub use line_data::{buffer_to_screen_line, screen_to_buffer_line, BufferLineRenderData};

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::buffer::{CursorType, ImageSlice, LineRendition, TextBuffer};
use crate::color::Color;
use crate::data::RenderView;
use crate::geometry::{CoordType, Point, PointSpan, Rect, Size, Viewport};
use crate::glyph::TextAttribute;
use crate::settings::RenderSettings;

/// An engine shared between the renderer and its owner.
pub type SharedEngine = Arc<Mutex<dyn RenderEngine>>;

/// Default minimum time between two frames of an engine (about 120 Hz).
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(8);

/// Result of an optional engine capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    Handled,
    /// The engine does not implement the capability; the caller falls back.
    NotHandled,
}

/// Result of [`RenderEngine::update_title`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleUpdate {
    Updated,
    /// The title matched the last one drawn; the backend was not called.
    Unchanged,
}

/// Result of [`RenderEngine::start_paint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStart {
    Paint,
    /// Nothing is dirty; the rest of the frame is skipped for this engine.
    Skip,
}

/// The soft-font (DRCS) code point range currently loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftFontRange {
    pub first: u32,
    pub last: u32,
}

impl SoftFontRange {
    /// True if `text` is a single UTF-16 code unit inside the range.
    pub fn contains(&self, text: &str) -> bool {
        let mut units = text.encode_utf16();
        match (units.next(), units.next()) {
            (Some(unit), None) => (self.first..=self.last).contains(&u32::from(unit)),
            _ => false,
        }
    }
}

/// How and where the cursor is drawn this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorOptions {
    /// Buffer column, viewport-relative row.
    pub coord: Point,
    pub viewport_left: CoordType,
    pub line_rendition: LineRendition,
    pub height_percent: u32,
    pub pixel_width: u32,
    /// The cursor sits on a wide character.
    pub is_double_width: bool,
    pub cursor_type: CursorType,
    /// `None` draws the cursor by inverting the cell.
    pub color: Option<Color>,
    pub is_visible: bool,
    /// Visible and in the "on" phase of the blink cycle.
    pub is_on: bool,
    pub in_viewport: bool,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            coord: Point::default(),
            viewport_left: 0,
            line_rendition: LineRendition::SingleWidth,
            height_percent: 25,
            pixel_width: 1,
            is_double_width: false,
            cursor_type: CursorType::Legacy,
            color: None,
            is_visible: false,
            is_on: false,
            in_viewport: false,
        }
    }
}

/// Extra information handed to [`RenderEngine::prepare_render_info`] before
/// anything is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrameInfo {
    pub selection_spans: Vec<PointSpan>,
    pub search_highlights: Vec<PointSpan>,
    pub search_highlight_focused: Option<PointSpan>,
    pub selection_background: Color,
}

/// The payload of one frame, valid while the console lock is held.
pub struct RenderFrame<'a> {
    pub data: &'a dyn RenderView,
    pub settings: &'a RenderSettings,
    pub viewport: Viewport,
    pub cursor: &'a CursorOptions,
    /// Selection rectangles relative to the viewport origin.
    pub selection_rects: &'a [Rect],
    pub blink_faint: bool,
    pub soft_font: Option<SoftFontRange>,
    /// A hovered pattern interval, viewport-relative.
    pub hovered_interval: Option<PointSpan>,
}

impl RenderFrame<'_> {
    pub fn is_soft_font_char(&self, text: &str) -> bool {
        self.soft_font.map_or(false, |range| range.contains(text))
    }
}

/// The regions of an engine's surface that need repainting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyTracker {
    size: Size,
    rects: Vec<Rect>,
    all: bool,
    scroll_delta: Point,
}

impl DirtyTracker {
    pub fn size(&self) -> Size {
        self.size
    }

    fn bounds(&self) -> Rect {
        Rect::from_point_size(Point::default(), self.size)
    }

    pub fn resize(&mut self, size: Size) {
        if size != self.size {
            self.size = size;
            self.invalidate_all();
        }
    }

    pub fn invalidate(&mut self, rect: Rect) {
        if self.all {
            return;
        }
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || self.rects.iter().any(|r| r.intersect(&rect) == rect) {
            return;
        }
        self.rects.push(rect);
    }

    pub fn invalidate_all(&mut self) {
        self.all = true;
        self.rects.clear();
    }

    /// Records a scroll of the whole surface. Without a backend that can
    /// move pixels, everything is repainted.
    pub fn invalidate_scroll(&mut self, delta: Point) {
        if delta != Point::default() {
            self.scroll_delta += delta;
            self.invalidate_all();
        }
    }

    pub fn take_scroll_delta(&mut self) -> Point {
        std::mem::take(&mut self.scroll_delta)
    }

    pub fn is_dirty(&self) -> bool {
        (self.all && !self.bounds().is_empty()) || !self.rects.is_empty()
    }

    pub fn is_all_dirty(&self) -> bool {
        self.all
    }

    /// The dirty regions in surface (viewport-relative) coordinates.
    pub fn dirty_area(&self) -> Vec<Rect> {
        if self.all {
            let bounds = self.bounds();
            if bounds.is_empty() {
                Vec::new()
            } else {
                vec![bounds]
            }
        } else {
            self.rects.clone()
        }
    }

    pub fn clear(&mut self) {
        self.rects.clear();
        self.all = false;
    }
}

/// State every engine shares.
#[derive(Debug)]
pub struct EngineBase {
    title_changed: bool,
    last_frame_title: String,
    cluster_buffer: Vec<Cluster<'static>>,
    hovered_hyperlink_id: u16,
    throttle: Duration,
    dirty: DirtyTracker,
}

impl Default for EngineBase {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}

impl EngineBase {
    pub fn new(throttle: Duration) -> Self {
        Self {
            title_changed: false,
            last_frame_title: String::new(),
            cluster_buffer: Vec::new(),
            hovered_hyperlink_id: 0,
            throttle,
            dirty: DirtyTracker::default(),
        }
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Marks the title as changed if `proposed` differs from the last title drawn.
    pub fn invalidate_title(&mut self, proposed: &str) {
        if proposed != self.last_frame_title {
            self.title_changed = true;
        }
    }

    pub fn title_changed(&self) -> bool {
        self.title_changed
    }

    pub fn last_frame_title(&self) -> &str {
        &self.last_frame_title
    }

    fn title_updated(&mut self, title: &str) {
        self.last_frame_title.clear();
        self.last_frame_title.push_str(title);
        self.title_changed = false;
    }

    pub fn hovered_hyperlink_id(&self) -> u16 {
        self.hovered_hyperlink_id
    }

    pub fn set_hovered_hyperlink_id(&mut self, id: u16) {
        self.hovered_hyperlink_id = id;
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyTracker {
        &mut self.dirty
    }

    pub(crate) fn take_cluster_buffer<'b>(&mut self) -> Vec<Cluster<'b>> {
        cluster::recycle(std::mem::take(&mut self.cluster_buffer))
    }

    pub(crate) fn return_cluster_buffer(&mut self, clusters: Vec<Cluster<'_>>) {
        self.cluster_buffer = cluster::recycle(clusters);
    }

    /// The grid lines to draw for `attr` at screen position `target`.
    ///
    /// Hovered hyperlinks and hovered pattern intervals trade the dashed
    /// hyperlink underline for a solid one.
    pub fn gridlines(&self, attr: &TextAttribute, target: Point, frame: &RenderFrame<'_>) -> GridLines {
        let mut lines = gridlines_for(attr);
        let hovered_link = self.hovered_hyperlink_id != 0 && self.hovered_hyperlink_id == attr.hyperlink_id;
        let in_hovered_interval = frame
            .hovered_interval
            .map_or(false, |span| span.contains(target) && !frame.data.pattern_ids(target).is_empty());
        if hovered_link || in_hovered_interval {
            lines.remove(GridLines::HYPERLINK_UNDERLINE);
            lines.insert(GridLines::UNDERLINE);
        }
        lines
    }

    /// Calls `f` once for every dirty row of the main buffer.
    pub fn loop_dirty_lines<F>(frame: &RenderFrame<'_>, dirty: &[Rect], mut f: F) -> Result<()>
    where
        F: FnMut(&BufferLineRenderData<'_>) -> Result<()>,
    {
        let buffer = frame.data.text_buffer();
        let viewport = frame.viewport;
        for rect in dirty.iter().filter(|r| !r.is_empty()) {
            let redraw = Viewport::from_rect(*rect).offset(viewport.origin()).intersect(&viewport);
            for row in redraw.top()..redraw.bottom_exclusive() {
                let screen_line = Rect::new(redraw.left(), row, redraw.right_exclusive(), row + 1);
                let line_rendition = buffer.line_rendition(row);
                let buffer_line = Viewport::from_rect(screen_to_buffer_line(screen_line, line_rendition));
                let line_wrapped = buffer.row(row).map_or(false, |r| r.was_wrap_forced())
                    && buffer_line.right_exclusive() == buffer.width();
                let line = BufferLineRenderData {
                    render_data: frame.data,
                    buffer,
                    buffer_line,
                    visible_viewport: viewport,
                    target: Point::new(buffer_line.left(), row - viewport.top()),
                    line_rendition,
                    line_wrapped,
                    global_invert: frame.settings.global_invert(),
                    grid_lines_allowed: frame.data.is_grid_line_drawing_allowed(),
                };
                f(&line)?;
            }
        }
        Ok(())
    }

    /// Calls `f` once for every dirty row covered by an overlay.
    pub fn loop_overlays<F>(frame: &RenderFrame<'_>, dirty: &[Rect], mut f: F) -> Result<()>
    where
        F: FnMut(&BufferLineRenderData<'_>) -> Result<()>,
    {
        for overlay in frame.data.overlays() {
            let area = overlay.screen_area();
            for rect in dirty {
                let redraw = Viewport::from_rect(*rect).intersect(&area);
                for row in redraw.top()..redraw.bottom_exclusive() {
                    let source = Point::new(redraw.left(), row) - overlay.origin + overlay.region.origin();
                    let buffer_line = Viewport::from_dimensions(source, Size::new(redraw.width(), 1));
                    let line = BufferLineRenderData {
                        render_data: frame.data,
                        buffer: &overlay.buffer,
                        buffer_line,
                        visible_viewport: frame.viewport,
                        target: Point::new(redraw.left(), row),
                        line_rendition: LineRendition::SingleWidth,
                        line_wrapped: false,
                        global_invert: frame.settings.global_invert(),
                        grid_lines_allowed: frame.data.is_grid_line_drawing_allowed(),
                    };
                    f(&line)?;
                }
            }
        }
        Ok(())
    }

    /// Calls `f` once for every part of a selection rectangle that is dirty.
    pub fn loop_selection<F>(frame: &RenderFrame<'_>, dirty: &[Rect], mut f: F) -> Result<()>
    where
        F: FnMut(Rect) -> Result<()>,
    {
        for dirty_rect in dirty {
            for rect in frame.selection_rects {
                let visible = rect.intersect(dirty_rect);
                if !visible.is_empty() {
                    f(visible)?;
                }
            }
        }
        Ok(())
    }
}

/// A rendering backend.
///
/// Implementors provide the drawing primitives and access to their
/// [`EngineBase`]; everything else has a working default. Optional
/// capabilities return [`HookResult::NotHandled`] unless overridden.
pub trait RenderEngine: Send {
    fn base(&self) -> &EngineBase;
    fn base_mut(&mut self) -> &mut EngineBase;

    // --- Drawing primitives ---

    /// Fills the dirty area with the default background.
    fn paint_background(&mut self) -> Result<()>;

    /// Draws `clusters` starting at screen position `target` with the
    /// current brushes. `trim_left` means the first cluster is a wide
    /// character whose left half lies before `target.x + 1` and must not
    /// be drawn.
    fn paint_buffer_line(
        &mut self,
        clusters: &[Cluster<'_>],
        target: Point,
        trim_left: bool,
        line_wrapped: bool,
    ) -> Result<()>;

    fn paint_buffer_grid_lines(
        &mut self,
        lines: GridLines,
        color: Color,
        underline_color: Color,
        columns: CoordType,
        target: Point,
    ) -> Result<()>;

    /// Highlights `rect` (viewport-relative) as selected.
    fn paint_selection(&mut self, rect: Rect) -> Result<()>;

    fn paint_cursor(&mut self, options: &CursorOptions) -> Result<()>;

    /// Switches brushes to the colors of `attr`. `is_setting_defaults` is
    /// set once per frame, before anything is drawn.
    fn update_drawing_brushes(
        &mut self,
        attr: &TextAttribute,
        frame: &RenderFrame<'_>,
        using_soft_font: bool,
        is_setting_defaults: bool,
    ) -> Result<()>;

    /// Pushes a changed title to the backend.
    fn do_update_title(&mut self, title: &str) -> Result<()>;

    /// Shows the frame. Called after every engine has painted and the
    /// console lock is released.
    fn present(&mut self) -> Result<()>;

    // --- Frame lifecycle ---

    fn start_paint(&mut self) -> Result<PaintStart> {
        let base = self.base();
        if base.dirty().is_dirty() || base.title_changed() {
            Ok(PaintStart::Paint)
        } else {
            Ok(PaintStart::Skip)
        }
    }

    fn end_paint(&mut self) -> Result<()> {
        self.base_mut().dirty_mut().clear();
        Ok(())
    }

    /// Moves already drawn content by the accumulated scroll delta.
    fn scroll_frame(&mut self) -> Result<()> {
        self.base_mut().dirty_mut().take_scroll_delta();
        Ok(())
    }

    /// Paints one frame. The default runs the full pipeline.
    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
        paint::render_frame(self, frame)
    }

    /// Blocks until the engine is ready for another frame.
    fn wait_until_can_render(&mut self) {
        std::thread::sleep(self.base().throttle());
    }

    /// True if the engine animates on its own and wants frames even
    /// without new invalidations.
    fn requires_continuous_redraw(&self) -> bool {
        false
    }

    /// `Ok(None)` when the engine cannot tell.
    fn is_glyph_wide_by_font(&self, _glyph: &str) -> Result<Option<bool>> {
        Ok(None)
    }

    // --- Invalidation ---

    fn invalidate(&mut self, rect: Rect) -> Result<()> {
        self.base_mut().dirty_mut().invalidate(rect);
        Ok(())
    }

    fn invalidate_cursor(&mut self, rect: Rect) -> Result<()> {
        self.invalidate(rect)
    }

    fn invalidate_system(&mut self, rect: Rect) -> Result<()> {
        self.invalidate(rect)
    }

    fn invalidate_scroll(&mut self, delta: Point) -> Result<()> {
        self.base_mut().dirty_mut().invalidate_scroll(delta);
        Ok(())
    }

    fn invalidate_all(&mut self) -> Result<()> {
        self.base_mut().dirty_mut().invalidate_all();
        Ok(())
    }

    /// The buffer rotated under a fixed viewport.
    fn invalidate_circling(&mut self) -> Result<()> {
        self.invalidate_all()
    }

    fn invalidate_title(&mut self, proposed: &str) -> Result<()> {
        self.base_mut().invalidate_title(proposed);
        Ok(())
    }

    fn update_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.base_mut().dirty_mut().resize(viewport.size());
        Ok(())
    }

    fn font_changed(&mut self) -> Result<()> {
        self.invalidate_all()
    }

    fn dirty_area(&self) -> Vec<Rect> {
        self.base().dirty().dirty_area()
    }

    /// Draws `title` if it differs from the last one drawn.
    fn update_title(&mut self, title: &str) -> Result<TitleUpdate> {
        if title == self.base().last_frame_title() {
            return Ok(TitleUpdate::Unchanged);
        }
        self.do_update_title(title)?;
        self.base_mut().title_updated(title);
        Ok(TitleUpdate::Updated)
    }

    fn update_hyperlink_hovered_id(&mut self, id: u16) {
        self.base_mut().set_hovered_hyperlink_id(id);
    }

    // --- Optional capabilities ---

    fn invalidate_selection(&mut self, _rects: &[Rect]) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn invalidate_highlight(&mut self, _spans: &[PointSpan], _buffer: &TextBuffer) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn notify_new_text(&mut self, _text: &str) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn update_soft_font(&mut self, _bit_pattern: &[u16], _cell_size: Size, _centering_hint: usize) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn prepare_render_info(&mut self, _info: &RenderFrameInfo) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn reset_line_transform(&mut self) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn prepare_line_transform(
        &mut self,
        _rendition: LineRendition,
        _target_row: CoordType,
        _viewport_left: CoordType,
    ) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }

    fn paint_image_slice(
        &mut self,
        _slice: &ImageSlice,
        _target_row: CoordType,
        _viewport_left: CoordType,
    ) -> Result<HookResult> {
        Ok(HookResult::NotHandled)
    }
}
