// src/data.rs

//! The renderer's view of the console: a read interface (`RenderView`) and
//! a source that hands it out under a lock (`RenderData`).
//!
//! `Console` is the in-memory implementation used by the binary and the
//! tests. Hosts with their own terminal state implement `RenderData` for it.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::buffer::TextBuffer;
use crate::config::BehaviorConfig;
use crate::geometry::{CoordType, Point, PointSpan, Size, Viewport};
use crate::glyph::TextAttribute;

/// Read-only access to everything a frame needs.
///
/// Implementations are only ever used while the console lock is held, so
/// every accessor sees a consistent snapshot.
pub trait RenderView {
    /// The visible window onto the text buffer, in buffer coordinates.
    fn viewport(&self) -> Viewport;
    fn text_buffer(&self) -> &TextBuffer;
    /// Selected spans in buffer coordinates, in row-major order.
    fn selection_spans(&self) -> Vec<PointSpan>;
    fn search_highlights(&self) -> Vec<PointSpan>;
    fn search_highlight_focused(&self) -> Option<PointSpan>;
    /// Buffers drawn on top of the main buffer (e.g. IME composition).
    fn overlays(&self) -> &[Overlay];
    fn is_grid_line_drawing_allowed(&self) -> bool;
    fn console_title(&self) -> &str;
    fn hyperlink_uri(&self, id: u16) -> Option<&str>;
    fn hyperlink_custom_id(&self, id: u16) -> Option<&str>;
    /// Ids of the detected patterns (URLs and the like) covering the cell at
    /// `screen`, a viewport-relative position.
    fn pattern_ids(&self, screen: Point) -> Vec<usize>;
    fn cursor_pixel_width(&self) -> u32;
    /// `None` when the cursor should not blink.
    fn blink_interval(&self) -> Option<Duration>;
}

/// A source of frames. The console lock is held for as long as the guard
/// returned by [`RenderData::lock_console`] lives.
pub trait RenderData: Send + Sync + 'static {
    type View: RenderView;
    type Guard<'a>: Deref<Target = Self::View>
    where
        Self: 'a;

    fn lock_console(&self) -> Self::Guard<'_>;
}

/// A buffer drawn over the main text buffer.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub buffer: TextBuffer,
    /// Screen (viewport-relative) position of the region's top-left cell.
    pub origin: Point,
    /// The part of `buffer` that is shown.
    pub region: Viewport,
}

impl Overlay {
    /// Shows the whole of `buffer` with its top-left cell at `origin`.
    pub fn new(buffer: TextBuffer, origin: Point) -> Self {
        let region = buffer.size();
        Self { buffer, origin, region }
    }

    /// The screen rectangle the overlay covers.
    pub fn screen_area(&self) -> Viewport {
        Viewport::from_dimensions(self.origin, self.region.size())
    }
}

#[derive(Debug, Clone)]
struct Hyperlink {
    uri: String,
    custom_id: String,
}

/// The mutable console state behind [`Console`]'s lock.
#[derive(Debug, Clone)]
pub struct ConsoleState {
    buffer: TextBuffer,
    viewport: Viewport,
    selection: Vec<PointSpan>,
    search_highlights: Vec<PointSpan>,
    search_highlight_focused: Option<PointSpan>,
    overlays: Vec<Overlay>,
    grid_lines_allowed: bool,
    title: String,
    hyperlinks: HashMap<u16, Hyperlink>,
    /// Pattern matches in buffer coordinates.
    patterns: Vec<(PointSpan, usize)>,
    cursor_pixel_width: u32,
    blink_interval: Option<Duration>,
}

impl ConsoleState {
    /// A console of `width x height` cells whose viewport shows the whole buffer.
    pub fn new(width: CoordType, height: CoordType, behavior: &BehaviorConfig) -> Self {
        let buffer = TextBuffer::new(width, height, TextAttribute::default());
        let viewport = buffer.size();
        Self {
            buffer,
            viewport,
            selection: Vec::new(),
            search_highlights: Vec::new(),
            search_highlight_focused: None,
            overlays: Vec::new(),
            grid_lines_allowed: behavior.grid_lines_allowed,
            title: String::new(),
            hyperlinks: HashMap::new(),
            patterns: Vec::new(),
            cursor_pixel_width: 1,
            blink_interval: behavior.cursor_blink_interval(),
        }
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Moves the viewport. The size is clamped to the buffer.
    pub fn set_viewport(&mut self, origin: Point, size: Size) {
        self.viewport = Viewport::from_dimensions(origin, size).intersect(&self.buffer.size());
    }

    pub fn set_selection(&mut self, spans: Vec<PointSpan>) {
        self.selection = spans;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Replaces the search highlights and returns the previous ones.
    pub fn set_search_highlights(&mut self, spans: Vec<PointSpan>, focused: Option<PointSpan>) -> Vec<PointSpan> {
        self.search_highlight_focused = focused;
        std::mem::replace(&mut self.search_highlights, spans)
    }

    pub fn set_overlays(&mut self, overlays: Vec<Overlay>) {
        self.overlays = overlays;
    }

    pub fn set_grid_lines_allowed(&mut self, allowed: bool) {
        self.grid_lines_allowed = allowed;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn add_hyperlink(&mut self, id: u16, uri: impl Into<String>, custom_id: impl Into<String>) {
        self.hyperlinks.insert(
            id,
            Hyperlink {
                uri: uri.into(),
                custom_id: custom_id.into(),
            },
        );
    }

    pub fn add_pattern(&mut self, span: PointSpan, id: usize) {
        self.patterns.push((span, id));
    }

    pub fn clear_patterns(&mut self) {
        self.patterns.clear();
    }

    pub fn set_cursor_pixel_width(&mut self, width: u32) {
        self.cursor_pixel_width = width;
    }

    pub fn set_blink_interval(&mut self, interval: Option<Duration>) {
        self.blink_interval = interval;
    }
}

impl RenderView for ConsoleState {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn text_buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    fn selection_spans(&self) -> Vec<PointSpan> {
        self.selection.clone()
    }

    fn search_highlights(&self) -> Vec<PointSpan> {
        self.search_highlights.clone()
    }

    fn search_highlight_focused(&self) -> Option<PointSpan> {
        self.search_highlight_focused
    }

    fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    fn is_grid_line_drawing_allowed(&self) -> bool {
        self.grid_lines_allowed
    }

    fn console_title(&self) -> &str {
        &self.title
    }

    fn hyperlink_uri(&self, id: u16) -> Option<&str> {
        self.hyperlinks.get(&id).map(|h| h.uri.as_str())
    }

    fn hyperlink_custom_id(&self, id: u16) -> Option<&str> {
        self.hyperlinks.get(&id).map(|h| h.custom_id.as_str())
    }

    fn pattern_ids(&self, screen: Point) -> Vec<usize> {
        let at = screen + self.viewport.origin();
        self.patterns
            .iter()
            .filter(|(span, _)| span.contains(at))
            .map(|&(_, id)| id)
            .collect()
    }

    fn cursor_pixel_width(&self) -> u32 {
        self.cursor_pixel_width
    }

    fn blink_interval(&self) -> Option<Duration> {
        self.blink_interval
    }
}

/// An in-memory console guarded by a mutex.
#[derive(Debug)]
pub struct Console {
    state: Mutex<ConsoleState>,
}

impl Console {
    pub fn new(state: ConsoleState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl RenderData for Console {
    type View = ConsoleState;
    type Guard<'a> = MutexGuard<'a, ConsoleState>;

    fn lock_console(&self) -> MutexGuard<'_, ConsoleState> {
        // A panic while the lock was held leaves the state readable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
