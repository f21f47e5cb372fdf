// src/renderer.rs

//! This module defines the `Renderer`.
//!
//! The `Renderer` sits between one data source (`RenderData`) and any number
//! of backends (`RenderEngine`). Hosts call its `trigger_*` methods while
//! holding the console lock to describe what changed; engines accumulate the
//! resulting invalidations, and the render thread later calls
//! [`Renderer::paint_frame`], which reads the latest state under the console
//! lock and lets every engine paint what is dirty. Any number of triggers
//! between two frames collapse into the next frame.
//!
//! Lock order is always console lock, then renderer state, then an engine.

pub mod thread;

pub use thread::{FrameOutcome, FramePainter, PaintSignal, RenderThread};

use anyhow::Result;
use log::{debug, error, info, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::{LineRendition, TextBuffer};
use crate::config::{BehaviorConfig, Config, RenderConfig};
use crate::data::{RenderData, RenderView};
use crate::engine::{
    buffer_to_screen_line, screen_to_buffer_line, BlinkingState, CursorOptions, HookResult, RenderEngine,
    RenderFrame, SharedEngine, SoftFontRange,
};
use crate::geometry::{Point, PointSpan, Rect, Size, Viewport};
use crate::glyph::DbcsAttribute;
use crate::settings::{RenderMode, RenderSettings};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    error_state: Option<Callback>,
    background_changed: Option<Callback>,
    frame_changed: Option<Callback>,
}

/// Everything the renderer remembers between frames.
struct RendererState {
    engines: Vec<SharedEngine>,
    settings: RenderSettings,
    /// The viewport as of the last frame (or scroll trigger).
    viewport: Viewport,
    force_update_viewport: bool,

    /// Selection rectangles relative to `viewport`, as last invalidated.
    last_selection_rects: Vec<Rect>,
    last_selection_span: Option<PointSpan>,
    last_selection_count: usize,

    cursor: CursorOptions,
    cursor_buffer_mutation_id: u64,
    cursor_mutation_id: u64,
    cursor_blinker_on: bool,
    /// The cursor is currently in a blinking phase (visible, blinking, with
    /// a blink interval).
    cursor_blinking: bool,
    cursor_blink_allowed: bool,

    blinking: BlinkingState,
    hovered_hyperlink_id: u16,
    hovered_interval: Option<PointSpan>,
    first_soft_font_char: u32,
    soft_font: Option<SoftFontRange>,

    error_state: bool,
    teardown: bool,
}

fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, dyn RenderEngine + 'static> {
    // A paint that panicked leaves the engine usable for the next frame.
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Falls back to plain invalidation for engines without selection support.
fn invalidate_selection_rects(engine: &mut dyn RenderEngine, rects: &[Rect]) -> Result<()> {
    if engine.invalidate_selection(rects)? == HookResult::NotHandled {
        for rect in rects {
            engine.invalidate(*rect)?;
        }
    }
    Ok(())
}

/// Viewport-relative rectangles covering `spans`, one per row.
fn span_rects(spans: &[PointSpan], buffer: &TextBuffer, viewport: Viewport) -> Vec<Rect> {
    let mut rects = Vec::new();
    for span in spans {
        span.iterate_rows(buffer.width(), |row, min, max| {
            let shift = u32::from(buffer.line_rendition(row) != LineRendition::SingleWidth);
            let rect = Rect::new(min << shift, row, max << shift, row + 1);
            rects.push(viewport.convert_to_origin(&rect));
        });
    }
    rects
}

impl RendererState {
    fn new(config: &Config) -> Self {
        let behavior: &BehaviorConfig = &config.behavior;
        Self {
            engines: Vec::new(),
            settings: RenderSettings::from_config(&config.colors, behavior.blinking_allowed),
            viewport: Viewport::default(),
            force_update_viewport: true,
            last_selection_rects: Vec::new(),
            last_selection_span: None,
            last_selection_count: 0,
            cursor: CursorOptions::default(),
            cursor_buffer_mutation_id: 0,
            cursor_mutation_id: 0,
            cursor_blinker_on: true,
            cursor_blinking: false,
            cursor_blink_allowed: true,
            blinking: BlinkingState::new(behavior.blinking_allowed),
            hovered_hyperlink_id: 0,
            hovered_interval: None,
            first_soft_font_char: behavior.soft_font_first_char,
            soft_font: None,
            error_state: false,
            teardown: false,
        }
    }

    /// Runs `f` on every engine, logging (not propagating) failures.
    fn for_each_engine<T>(&self, what: &str, mut f: impl FnMut(&mut dyn RenderEngine) -> Result<T>) {
        for engine in &self.engines {
            let mut engine = lock_engine(engine);
            if let Err(e) = f(&mut *engine) {
                warn!("Renderer: {} failed: {:#}", what, e);
            }
        }
    }

    /// Picks up a moved viewport. Returns true if anything changed.
    fn check_viewport_and_scroll(&mut self, view: &dyn RenderView) -> bool {
        let new = view.viewport();
        if !self.force_update_viewport && new == self.viewport {
            return false;
        }
        let old = std::mem::replace(&mut self.viewport, new);
        self.force_update_viewport = false;

        let delta = Point::new(old.left() - new.left(), old.top() - new.top());
        debug!(
            "Renderer: Viewport now {}x{} at ({}, {}), scroll delta ({}, {})",
            new.width(),
            new.height(),
            new.left(),
            new.top(),
            delta.x,
            delta.y
        );
        self.for_each_engine("update_viewport", |engine| {
            engine.update_viewport(new)?;
            engine.invalidate_scroll(delta)
        });
        self.scroll_previous_selection(delta);

        // The cursor may have moved into or out of the viewport.
        let visible = screen_to_buffer_line(new.to_rect(), self.cursor.line_rendition);
        let at = Point::new(self.cursor.coord.x, self.cursor.coord.y + new.top());
        self.cursor.in_viewport = cursor_in_view(at, visible);
        self.cursor.viewport_left = new.left();
        true
    }

    fn scroll_previous_selection(&mut self, delta: Point) {
        if delta == Point::default() {
            return;
        }
        for rect in &mut self.last_selection_rects {
            *rect = rect.offset(delta);
        }
        self.cursor.coord.y += delta.y;
    }

    fn record_blink_usage(&mut self, view: &dyn RenderView) {
        let buffer = view.text_buffer();
        for y in self.viewport.top()..self.viewport.bottom_exclusive() {
            let Some(row) = buffer.row(y) else {
                continue;
            };
            if let Some(attr) = row.attributes().find(|attr| attr.is_blinking()) {
                self.blinking.record_blinking_usage(attr);
                return;
            }
        }
    }

    fn invalidate_current_cursor(&self, view: &dyn RenderView) {
        if !self.cursor.in_viewport || !self.cursor.is_on {
            return;
        }
        let coord = self.cursor.coord;
        let width = if self.cursor.is_double_width { 2 } else { 1 };
        let x = coord.x - self.viewport.left();
        let mut rect = buffer_to_screen_line(
            Rect::new(x, coord.y, x + width, coord.y + 1),
            self.cursor.line_rendition,
        );
        if view.text_buffer().size().trim_to_viewport(&mut rect) {
            self.for_each_engine("invalidate_cursor", |engine| engine.invalidate_cursor(rect));
        }
    }

    fn update_cursor_info(&mut self, view: &dyn RenderView) {
        let buffer = view.text_buffer();
        let cursor = buffer.cursor();
        let position = cursor.position();

        // The cursor is never drawn double height; only the width matters.
        let line_rendition = if buffer.is_double_width_line(position.y) {
            LineRendition::DoubleWidth
        } else {
            LineRendition::SingleWidth
        };
        let visible = screen_to_buffer_line(self.viewport.to_rect(), line_rendition);
        let in_viewport = cursor_in_view(position, visible);

        // Any output restarts the blink cycle with the cursor shown.
        if self.cursor_buffer_mutation_id != buffer.last_mutation_id()
            || self.cursor_mutation_id != cursor.last_mutation_id()
        {
            self.cursor_buffer_mutation_id = buffer.last_mutation_id();
            self.cursor_mutation_id = cursor.last_mutation_id();
            self.cursor_blinker_on = true;
        }
        self.cursor_blinking = self.cursor_blink_allowed
            && cursor.is_visible()
            && cursor.is_blinking()
            && view.blink_interval().is_some();
        if !self.cursor_blinking {
            self.cursor_blinker_on = true;
        }

        let mut height = cursor.size_percent();
        if cursor.is_double() {
            height = if height > 50 { height >> 1 } else { height << 1 };
        }

        let color = self.settings.cursor_color;
        let is_visible = cursor.is_visible();
        self.cursor = CursorOptions {
            coord: Point::new(position.x, position.y - visible.top),
            viewport_left: self.viewport.left(),
            line_rendition,
            height_percent: height,
            pixel_width: view.cursor_pixel_width(),
            is_double_width: buffer
                .row(position.y)
                .map_or(false, |row| row.dbcs_at(position.x) != DbcsAttribute::Single),
            cursor_type: cursor.cursor_type(),
            color: (!color.is_default()).then_some(color),
            is_visible,
            is_on: is_visible && self.cursor_blinker_on,
            in_viewport,
        };
    }

    /// Brings viewport, blink and cursor state up to date before engines paint.
    fn prepare_frame(&mut self, view: &dyn RenderView) {
        self.check_viewport_and_scroll(view);
        if self.blinking.is_blinking_allowed() {
            self.record_blink_usage(view);
        }
        // Old cursor cell, then the new one.
        self.invalidate_current_cursor(view);
        self.update_cursor_info(view);
        self.invalidate_current_cursor(view);
    }
}

/// `at` is in buffer coordinates. One column of slack on the left keeps
/// a cursor on the right half of a wide character visible.
fn cursor_in_view(at: Point, visible: Rect) -> bool {
    at.x >= visible.left - 1 && at.x < visible.right && at.y >= visible.top && at.y < visible.bottom
}

/// Coordinates a data source with its render engines.
///
/// Every method takes `&self`; state lives behind a mutex so triggers from
/// host threads and frames on the render thread can interleave.
pub struct Renderer<D: RenderData> {
    data: Arc<D>,
    state: Mutex<RendererState>,
    callbacks: Mutex<Callbacks>,
    signal: Arc<PaintSignal>,
    config: RenderConfig,
}

impl<D: RenderData> Renderer<D> {
    pub fn new(data: Arc<D>, config: &Config) -> Self {
        info!(
            "Renderer: Created (retries {}, backoff {:?})",
            config.render.paint_retries,
            config.render.retry_backoff()
        );
        Self {
            data,
            state: Mutex::new(RendererState::new(config)),
            callbacks: Mutex::new(Callbacks::default()),
            signal: Arc::new(PaintSignal::new()),
            config: config.render.clone(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_callbacks(&self) -> MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn data(&self) -> &Arc<D> {
        &self.data
    }

    /// The wake signal shared with the [`RenderThread`] that drives this renderer.
    pub fn signal(&self) -> Arc<PaintSignal> {
        Arc::clone(&self.signal)
    }

    fn notify_paint(&self) {
        self.signal.notify();
    }

    // --- Engines ---

    pub fn add_render_engine(&self, engine: SharedEngine) {
        let mut state = self.lock_state();
        state.engines.push(engine);
        state.force_update_viewport = true;
        debug!("Renderer: Engine added ({} total)", state.engines.len());
    }

    /// Removes `engine` by identity. Unknown engines are ignored.
    pub fn remove_render_engine(&self, engine: &SharedEngine) {
        let target = Arc::as_ptr(engine) as *const ();
        let mut state = self.lock_state();
        state.engines.retain(|e| Arc::as_ptr(e) as *const () != target);
        debug!("Renderer: Engine removed ({} left)", state.engines.len());
    }

    pub fn engine_count(&self) -> usize {
        self.lock_state().engines.len()
    }

    // --- Callbacks ---

    /// Called once when painting gives up after repeated failures.
    pub fn set_renderer_entered_error_state_callback(&self, f: impl Fn() + Send + Sync + 'static) {
        self.lock_callbacks().error_state = Some(Arc::new(f));
    }

    pub fn set_background_color_changed_callback(&self, f: impl Fn() + Send + Sync + 'static) {
        self.lock_callbacks().background_changed = Some(Arc::new(f));
    }

    pub fn set_frame_color_changed_callback(&self, f: impl Fn() + Send + Sync + 'static) {
        self.lock_callbacks().frame_changed = Some(Arc::new(f));
    }

    // --- Triggers ---

    /// A region of the buffer (buffer coordinates) changed.
    pub fn trigger_redraw(&self, view: &dyn RenderView, region: Viewport) {
        let viewport = view.viewport();
        let buffer = view.text_buffer();
        let mut rect = region.to_rect();

        // Cells of double-width rows cover two screen columns.
        if (rect.top..rect.bottom).any(|row| buffer.is_double_width_line(row)) {
            rect.right *= 2;
        }

        if viewport.trim_to_viewport(&mut rect) {
            let rect = viewport.convert_to_origin(&rect);
            trace!("Renderer: Redraw {:?}", rect);
            self.lock_state()
                .for_each_engine("invalidate", |engine| engine.invalidate(rect));
            self.notify_paint();
        }
    }

    pub fn trigger_redraw_at(&self, view: &dyn RenderView, point: Point) {
        self.trigger_redraw(view, Viewport::from_dimensions(point, Size::new(1, 1)));
    }

    /// Everything is potentially invalid. Use sparingly.
    pub fn trigger_redraw_all(&self, background_changed: bool, frame_changed: bool) {
        self.lock_state()
            .for_each_engine("invalidate_all", |engine| engine.invalidate_all());
        self.notify_paint();

        let (background, frame) = {
            let callbacks = self.lock_callbacks();
            (callbacks.background_changed.clone(), callbacks.frame_changed.clone())
        };
        if let Some(f) = background.filter(|_| background_changed) {
            f();
        }
        if let Some(f) = frame.filter(|_| frame_changed) {
            f();
        }
    }

    /// The host window needs `rect` (surface coordinates) repainted.
    pub fn trigger_system_redraw(&self, rect: Rect) {
        self.lock_state()
            .for_each_engine("invalidate_system", |engine| engine.invalidate_system(rect));
        self.notify_paint();
    }

    /// Re-reads the selection and invalidates the old and new selected
    /// cells if it changed.
    pub fn trigger_selection(&self, view: &dyn RenderView) {
        let spans = view.selection_spans();
        let outer = match (spans.first(), spans.last()) {
            (Some(first), Some(last)) => Some(PointSpan::new(first.start, last.end)),
            _ => None,
        };

        let mut state = self.lock_state();
        if spans.len() == state.last_selection_count && (spans.is_empty() || outer == state.last_selection_span) {
            return;
        }

        state.last_selection_count = spans.len();
        let mut rects = Vec::new();
        if outer.is_some() {
            state.last_selection_span = outer;
            rects = span_rects(&spans, view.text_buffer(), state.viewport);
        }

        state.for_each_engine("invalidate_selection", |engine| {
            invalidate_selection_rects(engine, &state.last_selection_rects)?;
            invalidate_selection_rects(engine, &rects)
        });
        trace!("Renderer: Selection now {} rects", rects.len());
        state.last_selection_rects = rects;
        drop(state);
        self.notify_paint();
    }

    /// Search highlights changed from `old` to whatever the view reports now.
    pub fn trigger_search_highlight(&self, view: &dyn RenderView, old: &[PointSpan]) {
        let new = view.search_highlights();
        if old.is_empty() && new.is_empty() {
            return;
        }
        let buffer = view.text_buffer();
        let state = self.lock_state();
        let viewport = state.viewport;
        state.for_each_engine("invalidate_highlight", |engine| {
            for spans in [old, new.as_slice()] {
                if engine.invalidate_highlight(spans, buffer)? == HookResult::NotHandled {
                    for rect in span_rects(spans, buffer, viewport) {
                        engine.invalidate(rect)?;
                    }
                }
            }
            Ok(())
        });
        drop(state);
        self.notify_paint();
    }

    /// The viewport may have moved.
    pub fn trigger_scroll(&self, view: &dyn RenderView) {
        if self.lock_state().check_viewport_and_scroll(view) {
            self.notify_paint();
        }
    }

    /// The content moved by `delta` under a fixed viewport.
    pub fn trigger_scroll_by(&self, delta: Point) {
        let mut state = self.lock_state();
        state.for_each_engine("invalidate_scroll", |engine| engine.invalidate_scroll(delta));
        state.scroll_previous_selection(delta);
        drop(state);
        self.notify_paint();
    }

    /// The circular buffer rotated behind a fixed viewport.
    pub fn trigger_circling(&self) {
        self.lock_state()
            .for_each_engine("invalidate_circling", |engine| engine.invalidate_circling());
        self.notify_paint();
    }

    pub fn trigger_title_change(&self, title: &str) {
        self.lock_state()
            .for_each_engine("invalidate_title", |engine| engine.invalidate_title(title));
        self.notify_paint();
    }

    /// Forwards freshly written text to engines that want it (e.g. for
    /// accessibility). Does not schedule a frame.
    pub fn trigger_new_text_notification(&self, text: &str) {
        self.lock_state()
            .for_each_engine("notify_new_text", |engine| engine.notify_new_text(text));
    }

    pub fn trigger_font_change(&self) {
        self.lock_state()
            .for_each_engine("font_changed", |engine| engine.font_changed());
        self.notify_paint();
    }

    /// Loads a soft font. `bit_pattern` holds `cell_size.height` scanlines
    /// per glyph; an empty pattern unloads it.
    pub fn update_soft_font(&self, bit_pattern: &[u16], cell_size: Size, centering_hint: usize) {
        {
            let mut state = self.lock_state();
            let count = if cell_size.height > 0 {
                bit_pattern.len() / cell_size.height as usize
            } else {
                0
            };
            let first = state.first_soft_font_char;
            state.soft_font = (count > 0).then(|| SoftFontRange {
                first,
                last: first + count as u32 - 1,
            });
            debug!("Renderer: Soft font with {} glyphs", count);
            state.for_each_engine("update_soft_font", |engine| {
                engine.update_soft_font(bit_pattern, cell_size, centering_hint)
            });
        }
        self.trigger_redraw_all(false, false);
    }

    pub fn soft_font_range(&self) -> Option<SoftFontRange> {
        self.lock_state().soft_font
    }

    /// Whether the active font draws `glyph` two columns wide. The first
    /// engine with a definite answer decides; narrow otherwise.
    pub fn is_glyph_wide_by_font(&self, glyph: &str) -> bool {
        let state = self.lock_state();
        for engine in &state.engines {
            match lock_engine(engine).is_glyph_wide_by_font(glyph) {
                Ok(Some(wide)) => return wide,
                Ok(None) => {}
                Err(e) => warn!("Renderer: is_glyph_wide_by_font failed: {:#}", e),
            }
        }
        false
    }

    pub fn update_hyperlink_hovered_id(&self, id: u16) {
        let mut state = self.lock_state();
        state.hovered_hyperlink_id = id;
        for engine in &state.engines {
            lock_engine(engine).update_hyperlink_hovered_id(id);
        }
    }

    pub fn hovered_hyperlink_id(&self) -> u16 {
        self.lock_state().hovered_hyperlink_id
    }

    /// The pattern interval under the mouse, viewport-relative.
    pub fn update_last_hovered_interval(&self, interval: Option<PointSpan>) {
        self.lock_state().hovered_interval = interval;
    }

    // --- Blinking and render settings ---

    /// Advances the blink rendition cycle; called by the host's blink timer.
    /// Returns true if a full redraw was scheduled.
    pub fn toggle_blink_rendition(&self) -> bool {
        let redraw = self.lock_state().blinking.toggle_blinking_rendition();
        if redraw {
            self.trigger_redraw_all(false, false);
        }
        redraw
    }

    pub fn set_blinking_allowed(&self, allowed: bool) {
        {
            let mut state = self.lock_state();
            state.blinking.set_blinking_allowed(allowed);
            state.settings.set_render_mode(RenderMode::BLINK_ALLOWED, allowed);
        }
        info!("Renderer: Blinking {}", if allowed { "allowed" } else { "disallowed" });
        self.trigger_redraw_all(false, false);
    }

    pub fn is_blinking_faint(&self) -> bool {
        self.lock_state().blinking.is_blinking_faint()
    }

    /// Flips the cursor between on and off; called by the host's cursor
    /// blink timer at the view's blink interval.
    pub fn toggle_cursor_blink(&self) {
        let mut state = self.lock_state();
        if !state.cursor_blinking {
            return;
        }
        state.cursor_blinker_on = !state.cursor_blinker_on;
        drop(state);
        self.notify_paint();
    }

    /// Host-side override that keeps the cursor steady.
    pub fn set_cursor_blink_allowed(&self, allowed: bool) {
        self.lock_state().cursor_blink_allowed = allowed;
        self.notify_paint();
    }

    pub fn set_render_mode(&self, mode: RenderMode, enabled: bool) {
        self.lock_state().settings.set_render_mode(mode, enabled);
    }

    pub fn render_settings(&self) -> RenderSettings {
        self.lock_state().settings.clone()
    }

    pub fn set_render_settings(&self, settings: RenderSettings) {
        self.lock_state().settings = settings;
    }

    /// The cursor as derived for the last frame.
    pub fn cursor_options(&self) -> CursorOptions {
        self.lock_state().cursor.clone()
    }

    // --- Lifecycle ---

    pub fn is_in_error_state(&self) -> bool {
        self.lock_state().error_state
    }

    /// Leaves the error state and repaints everything.
    pub fn reset_error_state_and_resume(&self) {
        {
            let mut state = self.lock_state();
            if !state.error_state {
                return;
            }
            state.error_state = false;
            state.for_each_engine("invalidate_all", |engine| engine.invalidate_all());
        }
        info!("Renderer: Resuming after error state");
        self.notify_paint();
    }

    /// Makes the next frame report [`FrameOutcome::Stop`], ending the render
    /// thread's loop.
    pub fn trigger_teardown(&self) {
        self.lock_state().teardown = true;
        info!("Renderer: Teardown requested");
        self.notify_paint();
    }

    // --- Painting ---

    /// Paints one frame on every engine, retrying failed frames with a
    /// growing backoff. Gives up into the error state after the configured
    /// number of attempts.
    pub fn paint_frame(&self) -> Result<FrameOutcome> {
        {
            let state = self.lock_state();
            if state.teardown {
                return Ok(FrameOutcome::Stop);
            }
            if state.error_state {
                return Ok(FrameOutcome::Suspended);
            }
            if state.engines.is_empty() {
                trace!("Renderer: No engines, nothing to paint");
                return Ok(FrameOutcome::NothingToDo);
            }
        }

        let attempts = self.config.paint_retries.max(1);
        for attempt in 1..=attempts {
            match self.paint_frame_once() {
                Ok(()) => return Ok(FrameOutcome::Painted),
                Err(e) => {
                    warn!("Renderer: Frame failed (attempt {}/{}): {:#}", attempt, attempts, e);
                    if attempt < attempts {
                        std::thread::sleep(self.config.retry_backoff() * attempt);
                    }
                }
            }
        }

        error!("Renderer: Giving up after {} attempts, painting suspended", attempts);
        self.lock_state().error_state = true;
        let callback = self.lock_callbacks().error_state.clone();
        if let Some(f) = callback {
            f();
        }
        Ok(FrameOutcome::Suspended)
    }

    fn paint_frame_once(&self) -> Result<()> {
        let engines = {
            let guard = self.data.lock_console();
            let view: &D::View = &guard;
            let mut state = self.lock_state();
            state.prepare_frame(view);

            let frame = RenderFrame {
                data: view,
                settings: &state.settings,
                viewport: state.viewport,
                cursor: &state.cursor,
                selection_rects: &state.last_selection_rects,
                blink_faint: state.blinking.is_blinking_faint(),
                soft_font: state.soft_font,
                hovered_interval: state.hovered_interval,
            };
            let mut continuous = false;
            for engine in &state.engines {
                let mut engine = lock_engine(engine);
                engine.render(&frame)?;
                continuous |= engine.requires_continuous_redraw();
            }
            if continuous {
                self.notify_paint();
            }
            state.engines.clone()
        };

        // Presenting may block on the display; the console is free again.
        for engine in &engines {
            lock_engine(engine).present()?;
        }
        Ok(())
    }

    /// Gives every engine the chance to throttle before the next frame.
    pub fn wait_until_can_render(&self) {
        let engines = self.lock_state().engines.clone();
        for engine in &engines {
            lock_engine(engine).wait_until_can_render();
        }
    }
}

impl<D: RenderData> FramePainter for Renderer<D> {
    fn wait_until_can_render(&self) {
        Renderer::wait_until_can_render(self);
    }

    fn paint_frame(&self) -> Result<FrameOutcome> {
        Renderer::paint_frame(self)
    }
}

#[cfg(test)]
mod tests;
