// src/renderer/tests.rs

use super::*;
use crate::buffer::LineRendition;
use crate::color::Color;
use crate::config::{BehaviorConfig, Config, RenderConfig};
use crate::data::{Console, ConsoleState};
use crate::engine::{
    Cluster, CursorOptions, EngineBase, GridLines, HeadlessEngine, RenderEngine, RenderFrame, SharedEngine,
};
use crate::geometry::{CoordType, Point, PointSpan, Rect, Size, Viewport};
use crate::glyph::{AttrFlags, TextAttribute};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use test_log::test;

// --- Mock engine ---

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Invalidate(Rect),
    Selection(Vec<Rect>),
    All,
    Scroll(Point),
    NewText(String),
    SoftFont(usize),
    Render,
    Present,
}

type Events = Arc<Mutex<Vec<Event>>>;

/// Records what the renderer asks of it without drawing anything.
struct MockEngine {
    base: EngineBase,
    events: Events,
    failures_left: usize,
    handles_selection: bool,
    wide: Option<bool>,
}

impl MockEngine {
    fn new(events: &Events) -> Self {
        Self {
            base: EngineBase::new(Duration::ZERO),
            events: Arc::clone(events),
            failures_left: 0,
            handles_selection: false,
            wide: None,
        }
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl RenderEngine for MockEngine {
    fn base(&self) -> &EngineBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EngineBase {
        &mut self.base
    }

    fn paint_background(&mut self) -> Result<()> {
        Ok(())
    }

    fn paint_buffer_line(&mut self, _: &[Cluster<'_>], _: Point, _: bool, _: bool) -> Result<()> {
        Ok(())
    }

    fn paint_buffer_grid_lines(&mut self, _: GridLines, _: Color, _: Color, _: CoordType, _: Point) -> Result<()> {
        Ok(())
    }

    fn paint_selection(&mut self, _: Rect) -> Result<()> {
        Ok(())
    }

    fn paint_cursor(&mut self, _: &CursorOptions) -> Result<()> {
        Ok(())
    }

    fn update_drawing_brushes(&mut self, _: &TextAttribute, _: &RenderFrame<'_>, _: bool, _: bool) -> Result<()> {
        Ok(())
    }

    fn do_update_title(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.record(Event::Present);
        Ok(())
    }

    fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<()> {
        self.record(Event::Render);
        if self.failures_left > 0 {
            self.failures_left -= 1;
            bail!("device lost");
        }
        self.base.dirty_mut().clear();
        Ok(())
    }

    fn is_glyph_wide_by_font(&self, _glyph: &str) -> Result<Option<bool>> {
        Ok(self.wide)
    }

    fn invalidate(&mut self, rect: Rect) -> Result<()> {
        self.record(Event::Invalidate(rect));
        Ok(())
    }

    fn invalidate_cursor(&mut self, _rect: Rect) -> Result<()> {
        Ok(())
    }

    fn invalidate_all(&mut self) -> Result<()> {
        self.record(Event::All);
        Ok(())
    }

    fn invalidate_scroll(&mut self, delta: Point) -> Result<()> {
        self.record(Event::Scroll(delta));
        Ok(())
    }

    fn invalidate_selection(&mut self, rects: &[Rect]) -> Result<HookResult> {
        if !self.handles_selection {
            return Ok(HookResult::NotHandled);
        }
        self.record(Event::Selection(rects.to_vec()));
        Ok(HookResult::Handled)
    }

    fn notify_new_text(&mut self, text: &str) -> Result<HookResult> {
        self.record(Event::NewText(text.to_string()));
        Ok(HookResult::Handled)
    }

    fn update_soft_font(&mut self, bit_pattern: &[u16], _: Size, _: usize) -> Result<HookResult> {
        self.record(Event::SoftFont(bit_pattern.len()));
        Ok(HookResult::Handled)
    }
}

// --- Fixtures ---

fn test_config() -> Config {
    Config {
        render: RenderConfig {
            throttle_ms: 0,
            retry_backoff_ms: 0,
            ..RenderConfig::default()
        },
        ..Config::default()
    }
}

fn console(width: CoordType, height: CoordType) -> Arc<Console> {
    Arc::new(Console::new(ConsoleState::new(width, height, &BehaviorConfig::default())))
}

fn renderer(console: &Arc<Console>) -> Renderer<Console> {
    Renderer::new(Arc::clone(console), &test_config())
}

fn add_mock(renderer: &Renderer<Console>, engine: MockEngine) -> Arc<Mutex<MockEngine>> {
    let engine = Arc::new(Mutex::new(engine));
    let shared: SharedEngine = engine.clone();
    renderer.add_render_engine(shared);
    engine
}

fn add_headless(renderer: &Renderer<Console>) -> Arc<Mutex<HeadlessEngine>> {
    let engine = Arc::new(Mutex::new(HeadlessEngine::new(Duration::ZERO)));
    let shared: SharedEngine = engine.clone();
    renderer.add_render_engine(shared);
    engine
}

fn take_events(events: &Events) -> Vec<Event> {
    std::mem::take(&mut *events.lock().unwrap())
}

/// Polls `done` for up to two seconds.
fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

/// Counts frames and remembers the name of the thread that painted them.
#[derive(Default)]
struct CountingPainter {
    frames: AtomicUsize,
    thread_name: Mutex<Option<String>>,
}

impl FramePainter for CountingPainter {
    fn wait_until_can_render(&self) {}

    fn paint_frame(&self) -> Result<FrameOutcome> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        *self.thread_name.lock().unwrap() = std::thread::current().name().map(str::to_string);
        Ok(FrameOutcome::Painted)
    }
}

fn counting_thread() -> (Arc<CountingPainter>, RenderThread) {
    let painter = Arc::new(CountingPainter::default());
    let thread = RenderThread::new(painter.clone(), Arc::new(PaintSignal::new()), "render-test");
    (painter, thread)
}

// --- Painting ---

#[test]
fn paint_without_engines_does_nothing() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::NothingToDo);
}

#[test]
fn frame_reaches_headless_surface() {
    let console = console(10, 3);
    console
        .lock_console()
        .buffer_mut()
        .write(Point::new(0, 1), "hello", TextAttribute::default());
    let renderer = renderer(&console);
    let engine = add_headless(&renderer);

    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Painted);

    let engine = engine.lock().unwrap();
    assert_eq!(engine.size(), Size::new(10, 3));
    assert_eq!(engine.snapshot_text()[1], "hello     ");
    assert_eq!(engine.presents(), 1);
}

#[test]
fn clean_engine_skips_second_frame() {
    let console = console(10, 3);
    console.lock_console().buffer_mut().cursor_mut().set_visible(false);
    let renderer = renderer(&console);
    let engine = add_headless(&renderer);

    renderer.paint_frame().unwrap();
    renderer.paint_frame().unwrap();

    let engine = engine.lock().unwrap();
    assert_eq!(engine.frames_painted(), 1);
    assert_eq!(engine.presents(), 2);
}

#[test]
fn title_is_drawn_once() {
    let console = console(10, 3);
    console.lock_console().set_title("shell");
    let renderer = renderer(&console);
    let engine = add_headless(&renderer);

    renderer.trigger_title_change("shell");
    renderer.paint_frame().unwrap();
    renderer.trigger_title_change("shell");
    renderer.paint_frame().unwrap();

    let engine = engine.lock().unwrap();
    assert_eq!(engine.title(), "shell");
    assert_eq!(engine.title_updates(), 1);
}

// --- Triggers ---

#[test]
fn redraw_on_double_width_row_doubles_right_edge() {
    let console = console(10, 5);
    console.lock_console().buffer_mut().set_line_rendition(1, LineRendition::DoubleWidth);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    let guard = console.lock_console();
    renderer.trigger_redraw(&*guard, Viewport::from_dimensions(Point::new(1, 1), Size::new(4, 1)));
    drop(guard);

    assert_eq!(take_events(&events), vec![Event::Invalidate(Rect::new(1, 1, 10, 2))]);
    assert!(renderer.signal().is_pending());
}

#[test]
fn redraw_outside_viewport_is_ignored() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    let guard = console.lock_console();
    renderer.trigger_redraw_at(&*guard, Point::new(3, 7));
    drop(guard);

    assert!(take_events(&events).is_empty());
    assert!(!renderer.signal().is_pending());
}

#[test]
fn redraw_all_runs_requested_callbacks() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));
    let background = Arc::new(AtomicUsize::new(0));
    let frame = Arc::new(AtomicUsize::new(0));
    {
        let background = background.clone();
        renderer.set_background_color_changed_callback(move || {
            background.fetch_add(1, Ordering::SeqCst);
        });
        let frame = frame.clone();
        renderer.set_frame_color_changed_callback(move || {
            frame.fetch_add(1, Ordering::SeqCst);
        });
    }

    renderer.trigger_redraw_all(true, false);

    assert_eq!(take_events(&events), vec![Event::All]);
    assert_eq!(background.load(Ordering::SeqCst), 1);
    assert_eq!(frame.load(Ordering::SeqCst), 0);
}

#[test]
fn selection_falls_back_to_invalidate() {
    let console = console(10, 5);
    console
        .lock_console()
        .set_selection(vec![PointSpan::new(Point::new(1, 1), Point::new(3, 1))]);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    let guard = console.lock_console();
    renderer.trigger_selection(&*guard);
    drop(guard);

    assert_eq!(take_events(&events), vec![Event::Invalidate(Rect::new(1, 1, 4, 2))]);
}

#[test]
fn unchanged_selection_is_not_invalidated_again() {
    let console = console(10, 5);
    console
        .lock_console()
        .set_selection(vec![PointSpan::new(Point::new(1, 1), Point::new(3, 1))]);
    let renderer = renderer(&console);
    let events = Events::default();
    let mut mock = MockEngine::new(&events);
    mock.handles_selection = true;
    add_mock(&renderer, mock);

    let guard = console.lock_console();
    renderer.trigger_selection(&*guard);
    assert_eq!(
        take_events(&events).last(),
        Some(&Event::Selection(vec![Rect::new(1, 1, 4, 2)]))
    );
    renderer.signal().wait();

    renderer.trigger_selection(&*guard);
    drop(guard);
    assert!(take_events(&events).is_empty());
    assert!(!renderer.signal().is_pending());
}

#[test]
fn cleared_selection_invalidates_previous_rects() {
    let console = console(10, 5);
    console
        .lock_console()
        .set_selection(vec![PointSpan::new(Point::new(0, 2), Point::new(4, 2))]);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    renderer.trigger_selection(&*console.lock_console());
    take_events(&events);

    console.lock_console().clear_selection();
    renderer.trigger_selection(&*console.lock_console());

    assert_eq!(take_events(&events), vec![Event::Invalidate(Rect::new(0, 2, 5, 3))]);
}

#[test]
fn search_highlight_falls_back_to_row_rects() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    let old = console
        .lock_console()
        .set_search_highlights(vec![PointSpan::new(Point::new(8, 0), Point::new(1, 1))], None);
    renderer.trigger_search_highlight(&*console.lock_console(), &old);

    assert_eq!(
        take_events(&events),
        vec![
            Event::Invalidate(Rect::new(8, 0, 10, 1)),
            Event::Invalidate(Rect::new(0, 1, 2, 2)),
        ]
    );
}

#[test]
fn scroll_reports_viewport_delta() {
    let console = console(10, 20);
    console.lock_console().set_viewport(Point::new(0, 0), Size::new(10, 5));
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));
    renderer.paint_frame().unwrap();
    take_events(&events);

    console.lock_console().set_viewport(Point::new(0, 3), Size::new(10, 5));
    renderer.trigger_scroll(&*console.lock_console());

    assert!(take_events(&events).contains(&Event::Scroll(Point::new(0, -3))));
    assert!(renderer.signal().is_pending());
}

#[test]
fn horizontal_scroll_keeps_cursor_column() {
    let console = console(20, 10);
    {
        let mut state = console.lock_console();
        state.set_viewport(Point::new(0, 0), Size::new(10, 5));
        state.buffer_mut().cursor_mut().set_position(Point::new(3, 1));
    }
    let renderer = renderer(&console);
    add_headless(&renderer);
    renderer.paint_frame().unwrap();
    assert_eq!(renderer.cursor_options().coord, Point::new(3, 1));

    console.lock_console().set_viewport(Point::new(2, 0), Size::new(10, 5));
    renderer.trigger_scroll(&*console.lock_console());

    let cursor = renderer.cursor_options();
    assert_eq!(cursor.coord, Point::new(3, 1));
    assert!(cursor.in_viewport);
    assert_eq!(cursor.viewport_left, 2);
}

#[test]
fn unmoved_viewport_does_not_scroll() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));
    renderer.paint_frame().unwrap();
    take_events(&events);

    renderer.trigger_scroll(&*console.lock_console());

    assert!(take_events(&events).is_empty());
    assert!(!renderer.signal().is_pending());
}

#[test]
fn new_text_is_forwarded_without_a_frame() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));

    renderer.trigger_new_text_notification("ls\n");

    assert_eq!(take_events(&events), vec![Event::NewText("ls\n".to_string())]);
    assert!(!renderer.signal().is_pending());
}

// --- Engines and font queries ---

#[test]
fn removed_engine_gets_no_more_triggers() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let first_events = Events::default();
    let second_events = Events::default();
    let first = add_mock(&renderer, MockEngine::new(&first_events));
    add_mock(&renderer, MockEngine::new(&second_events));

    let first: SharedEngine = first;
    renderer.remove_render_engine(&first);
    renderer.trigger_circling();

    assert_eq!(renderer.engine_count(), 1);
    assert!(take_events(&first_events).is_empty());
    assert_eq!(take_events(&second_events), vec![Event::All]);
}

#[test]
fn first_definite_font_answer_wins() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    assert!(!renderer.is_glyph_wide_by_font("\u{E0B0}"));

    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));
    let mut wide = MockEngine::new(&events);
    wide.wide = Some(true);
    add_mock(&renderer, wide);
    let mut narrow = MockEngine::new(&events);
    narrow.wide = Some(false);
    add_mock(&renderer, narrow);

    assert!(renderer.is_glyph_wide_by_font("\u{E0B0}"));
}

#[test]
fn soft_font_range_follows_glyph_count() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    add_mock(&renderer, MockEngine::new(&events));
    let first = BehaviorConfig::default().soft_font_first_char;

    renderer.update_soft_font(&[0u16; 24], Size::new(8, 12), 0);
    assert_eq!(
        renderer.soft_font_range(),
        Some(SoftFontRange {
            first,
            last: first + 1
        })
    );
    assert_eq!(take_events(&events), vec![Event::SoftFont(24), Event::All]);

    renderer.update_soft_font(&[], Size::new(8, 12), 0);
    assert_eq!(renderer.soft_font_range(), None);
}

#[test]
fn hovered_hyperlink_reaches_engines() {
    let console = console(10, 5);
    let renderer = renderer(&console);
    let events = Events::default();
    let engine = add_mock(&renderer, MockEngine::new(&events));

    renderer.update_hyperlink_hovered_id(5);

    assert_eq!(renderer.hovered_hyperlink_id(), 5);
    assert_eq!(engine.lock().unwrap().base().hovered_hyperlink_id(), 5);
}

// --- Blinking and cursor ---

#[test]
fn blink_toggle_draws_blinking_text_faint() {
    let console = console(10, 3);
    {
        let mut guard = console.lock_console();
        let buffer = guard.buffer_mut();
        buffer.write(Point::new(0, 0), "b", TextAttribute::default().with_flags(AttrFlags::BLINK));
        buffer.write(Point::new(2, 0), "n", TextAttribute::default());
    }
    let renderer = renderer(&console);
    let engine = add_headless(&renderer);
    renderer.paint_frame().unwrap();

    assert!(!renderer.toggle_blink_rendition());
    assert!(renderer.toggle_blink_rendition());
    renderer.paint_frame().unwrap();

    let engine = engine.lock().unwrap();
    assert!(engine.cell(0, 0).unwrap().faint);
    assert!(!engine.cell(2, 0).unwrap().faint);
}

#[test]
fn blink_toggle_without_blinking_text_is_quiet() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    add_headless(&renderer);
    renderer.paint_frame().unwrap();

    assert!(!renderer.toggle_blink_rendition());
    assert!(!renderer.toggle_blink_rendition());
    assert!(renderer.is_blinking_faint());
}

#[test]
fn cursor_blinks_until_next_output() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    add_headless(&renderer);

    renderer.paint_frame().unwrap();
    assert!(renderer.cursor_options().is_on);

    renderer.toggle_cursor_blink();
    renderer.paint_frame().unwrap();
    assert!(!renderer.cursor_options().is_on);

    console
        .lock_console()
        .buffer_mut()
        .write(Point::new(0, 0), "x", TextAttribute::default());
    renderer.paint_frame().unwrap();
    assert!(renderer.cursor_options().is_on);
}

#[test]
fn steady_cursor_ignores_blink_toggle() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    add_headless(&renderer);
    renderer.set_cursor_blink_allowed(false);

    renderer.paint_frame().unwrap();
    renderer.toggle_cursor_blink();
    renderer.paint_frame().unwrap();

    assert!(renderer.cursor_options().is_on);
}

#[test]
fn double_size_cursor_height() {
    let console = console(10, 3);
    {
        let mut guard = console.lock_console();
        let cursor = guard.buffer_mut().cursor_mut();
        cursor.set_size_percent(80);
        cursor.set_double(true);
    }
    let renderer = renderer(&console);
    add_headless(&renderer);

    renderer.paint_frame().unwrap();

    assert_eq!(renderer.cursor_options().height_percent, 40);
}

// --- Error state ---

#[test]
fn failing_frames_enter_error_state_once() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    let events = Events::default();
    let mut mock = MockEngine::new(&events);
    mock.failures_left = usize::MAX;
    let engine = add_mock(&renderer, mock);
    let entered = Arc::new(AtomicUsize::new(0));
    {
        let entered = entered.clone();
        renderer.set_renderer_entered_error_state_callback(move || {
            entered.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Suspended);
    let renders = take_events(&events).iter().filter(|e| **e == Event::Render).count();
    assert_eq!(renders, 3);
    assert_eq!(entered.load(Ordering::SeqCst), 1);
    assert!(renderer.is_in_error_state());

    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Suspended);
    assert!(take_events(&events).is_empty());

    engine.lock().unwrap().failures_left = 0;
    renderer.reset_error_state_and_resume();
    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Painted);
    assert_eq!(entered.load(Ordering::SeqCst), 1);
}

#[test]
fn transient_failure_is_retried() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    let events = Events::default();
    let mut mock = MockEngine::new(&events);
    mock.failures_left = 1;
    add_mock(&renderer, mock);

    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Painted);
    let events = take_events(&events);
    assert_eq!(events.iter().filter(|e| **e == Event::Render).count(), 2);
    assert_eq!(events.last(), Some(&Event::Present));
    assert!(!renderer.is_in_error_state());
}

/// A headless surface whose line painting fails once on one row. Uses the
/// default frame pipeline.
struct FlakySurface {
    inner: HeadlessEngine,
    fail_row: Option<CoordType>,
}

impl RenderEngine for FlakySurface {
    fn base(&self) -> &EngineBase {
        self.inner.base()
    }

    fn base_mut(&mut self) -> &mut EngineBase {
        self.inner.base_mut()
    }

    fn paint_background(&mut self) -> Result<()> {
        self.inner.paint_background()
    }

    fn paint_buffer_line(&mut self, clusters: &[Cluster<'_>], target: Point, trim_left: bool, wrapped: bool) -> Result<()> {
        if self.fail_row == Some(target.y) {
            self.fail_row = None;
            bail!("line {} lost", target.y);
        }
        self.inner.paint_buffer_line(clusters, target, trim_left, wrapped)
    }

    fn paint_buffer_grid_lines(
        &mut self,
        lines: GridLines,
        color: Color,
        underline_color: Color,
        columns: CoordType,
        target: Point,
    ) -> Result<()> {
        self.inner.paint_buffer_grid_lines(lines, color, underline_color, columns, target)
    }

    fn paint_selection(&mut self, rect: Rect) -> Result<()> {
        self.inner.paint_selection(rect)
    }

    fn paint_cursor(&mut self, options: &CursorOptions) -> Result<()> {
        self.inner.paint_cursor(options)
    }

    fn update_drawing_brushes(
        &mut self,
        attr: &TextAttribute,
        frame: &RenderFrame<'_>,
        using_soft_font: bool,
        is_setting_defaults: bool,
    ) -> Result<()> {
        self.inner.update_drawing_brushes(attr, frame, using_soft_font, is_setting_defaults)
    }

    fn do_update_title(&mut self, title: &str) -> Result<()> {
        self.inner.do_update_title(title)
    }

    fn present(&mut self) -> Result<()> {
        self.inner.present()
    }

    fn update_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.inner.update_viewport(viewport)
    }
}

#[test]
fn retried_frame_repaints_the_failed_row() {
    let console = console(10, 3);
    let renderer = renderer(&console);
    let surface = Arc::new(Mutex::new(FlakySurface {
        inner: HeadlessEngine::new(Duration::ZERO),
        fail_row: None,
    }));
    let shared: SharedEngine = surface.clone();
    renderer.add_render_engine(shared);
    renderer.paint_frame().unwrap();

    {
        let mut guard = console.lock_console();
        guard
            .buffer_mut()
            .write(Point::new(0, 1), "hello", TextAttribute::default());
        surface.lock().unwrap().fail_row = Some(1);
        renderer.trigger_redraw(&*guard, Viewport::from_dimensions(Point::new(0, 1), Size::new(5, 1)));
    }

    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Painted);
    let surface = surface.lock().unwrap();
    assert_eq!(surface.inner.snapshot_text()[1], "hello     ");
    assert!(!surface.inner.base().dirty().is_dirty());
}

// --- Render thread ---

#[test]
fn one_notify_paints_one_frame() {
    let (painter, thread) = counting_thread();
    thread.enable_painting().unwrap();

    thread.notify_paint();
    assert!(wait_for(|| painter.frames.load(Ordering::SeqCst) == 1));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(painter.frames.load(Ordering::SeqCst), 1);

    thread.wait_for_paint_completion_and_disable();
}

#[test]
fn notifies_before_enable_coalesce() {
    let (painter, thread) = counting_thread();
    thread.notify_paint();
    thread.notify_paint();

    thread.enable_painting().unwrap();
    assert!(wait_for(|| painter.frames.load(Ordering::SeqCst) >= 1));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(painter.frames.load(Ordering::SeqCst), 1);

    thread.wait_for_paint_completion_and_disable();
}

#[test]
fn enabling_twice_keeps_one_named_thread() {
    let (painter, thread) = counting_thread();
    thread.enable_painting().unwrap();
    thread.enable_painting().unwrap();
    assert!(thread.is_running());

    thread.notify_paint();
    assert!(wait_for(|| painter.frames.load(Ordering::SeqCst) == 1));
    assert_eq!(painter.thread_name.lock().unwrap().as_deref(), Some("render-test"));

    thread.wait_for_paint_completion_and_disable();
    thread.wait_for_paint_completion_and_disable();
    assert!(!thread.is_running());
}

#[test]
fn notify_after_disable_paints_nothing() {
    let (painter, thread) = counting_thread();
    thread.enable_painting().unwrap();
    thread.wait_for_paint_completion_and_disable();

    thread.notify_paint();
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(painter.frames.load(Ordering::SeqCst), 0);
    assert!(!thread.is_running());
}

#[test]
fn triggers_before_a_frame_collapse_into_it() {
    let console = console(10, 5);
    console
        .lock_console()
        .set_selection(vec![PointSpan::new(Point::new(0, 0), Point::new(2, 0))]);
    let renderer = Arc::new(renderer(&console));
    let engine = add_headless(&renderer);
    renderer.set_cursor_blink_allowed(false);

    renderer.trigger_selection(&*console.lock_console());
    renderer.trigger_title_change("busy");
    renderer.trigger_circling();

    let thread = RenderThread::new(renderer.clone(), renderer.signal(), "render-test");
    thread.enable_painting().unwrap();
    assert!(wait_for(|| engine.lock().unwrap().presents() >= 1));
    std::thread::sleep(Duration::from_millis(50));
    thread.wait_for_paint_completion_and_disable();

    let engine = engine.lock().unwrap();
    assert_eq!(engine.frames_painted(), 1);
    assert!(engine.cell(1, 0).unwrap().selected);
    assert!(!engine.cell(3, 0).unwrap().selected);
}

#[test]
fn disable_racing_enable_always_returns() {
    for _ in 0..20 {
        let (_painter, thread) = counting_thread();
        let thread = Arc::new(thread);
        thread.enable_painting().unwrap();

        let done = Arc::new(AtomicUsize::new(0));
        let disabler = {
            let thread = thread.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                thread.wait_for_paint_completion_and_disable();
                done.fetch_add(1, Ordering::SeqCst);
            })
        };
        thread.enable_painting().unwrap();

        assert!(wait_for(|| done.load(Ordering::SeqCst) == 1));
        disabler.join().unwrap();
        thread.wait_for_paint_completion_and_disable();
        assert!(!thread.is_running());
    }
}

/// Paints once and then asks the thread to stop.
#[derive(Default)]
struct StoppingPainter {
    frames: AtomicUsize,
}

impl FramePainter for StoppingPainter {
    fn wait_until_can_render(&self) {}

    fn paint_frame(&self) -> Result<FrameOutcome> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(FrameOutcome::Stop)
    }
}

#[test]
fn disable_after_stop_leaves_no_pending_frame() {
    let painter = Arc::new(StoppingPainter::default());
    let signal = Arc::new(PaintSignal::new());
    let thread = RenderThread::new(painter.clone(), signal.clone(), "render-test");
    thread.enable_painting().unwrap();
    thread.notify_paint();
    assert!(wait_for(|| !thread.is_running()));

    thread.wait_for_paint_completion_and_disable();
    assert!(!signal.is_pending());

    thread.enable_painting().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(painter.frames.load(Ordering::SeqCst), 1);
    thread.wait_for_paint_completion_and_disable();
}

#[test]
fn teardown_stops_the_thread() {
    let console = console(10, 3);
    let renderer = Arc::new(renderer(&console));
    add_headless(&renderer);
    let thread = RenderThread::new(renderer.clone(), renderer.signal(), "render-test");
    thread.enable_painting().unwrap();

    renderer.trigger_teardown();

    assert!(wait_for(|| !thread.is_running()));
    assert_eq!(renderer.paint_frame().unwrap(), FrameOutcome::Stop);
}
