// src/main.rs

//! Demo: renders a small console into the headless engine on a render
//! thread and logs the resulting surface.

use core_render::{
    color::{Color, NamedColor},
    config::CONFIG,
    data::{Console, ConsoleState, RenderData},
    engine::{HeadlessEngine, SharedEngine},
    geometry::{Point, PointSpan, Size, Viewport},
    glyph::{AttrFlags, TextAttribute, UnderlineStyle},
    renderer::{RenderThread, Renderer},
};

use anyhow::Context;
use log::{info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const COLUMNS: i32 = 40;
const ROWS: i32 = 6;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting core-render demo...");
    let config = &*CONFIG;

    let console = Arc::new(Console::new(ConsoleState::new(COLUMNS, ROWS, &config.behavior)));
    let renderer = Arc::new(Renderer::new(Arc::clone(&console), config));
    renderer.set_renderer_entered_error_state_callback(|| warn!("Renderer entered its error state"));

    let surface = Arc::new(Mutex::new(HeadlessEngine::new(config.render.throttle())));
    let engine: SharedEngine = surface.clone();
    renderer.add_render_engine(engine);

    let thread = RenderThread::new(renderer.clone(), renderer.signal(), config.render.thread_name.clone());
    thread.enable_painting().context("Failed to start painting")?;

    let lines: [(&str, TextAttribute); 4] = [
        ("core-render demo", TextAttribute::default().with_flags(AttrFlags::BOLD)),
        (
            "green on default",
            TextAttribute::new(Color::Named(NamedColor::Green), Color::Default),
        ),
        ("blinking text", TextAttribute::default().with_flags(AttrFlags::BLINK)),
        (
            "underlined link",
            TextAttribute::default()
                .with_underline(UnderlineStyle::Single)
                .with_hyperlink(1),
        ),
    ];

    for (row, (text, attr)) in lines.iter().enumerate() {
        let row = row as i32;
        let mut guard = console.lock_console();
        let end = guard.buffer_mut().write(Point::new(0, row), text, *attr);
        renderer.trigger_redraw(&*guard, Viewport::from_dimensions(Point::new(0, row), Size::new(end.x, 1)));
        renderer.trigger_new_text_notification(text);
    }

    {
        let mut guard = console.lock_console();
        guard.add_hyperlink(1, "https://example.com", "demo");
        guard.set_title("core-render");
        guard.set_selection(vec![PointSpan::new(Point::new(0, 1), Point::new(4, 1))]);
        guard.buffer_mut().cursor_mut().set_position(Point::new(0, 4));
        renderer.trigger_selection(&*guard);
    }
    renderer.trigger_title_change("core-render");

    // Two blink phases reach the faint half of the cycle.
    renderer.toggle_blink_rendition();
    renderer.toggle_blink_rendition();

    std::thread::sleep(Duration::from_millis(100));
    thread.wait_for_paint_completion_and_disable();
    renderer.trigger_teardown();

    let surface = surface.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    info!(
        "Surface {}x{}, {} frames painted, title {:?}",
        surface.size().width,
        surface.size().height,
        surface.frames_painted(),
        surface.title()
    );
    for (row, text) in surface.snapshot_text().iter().enumerate() {
        info!("{:>2} |{}|", row, text);
    }
    if let Some(cursor) = surface.cursor() {
        info!("Cursor at ({}, {}), on={}", cursor.position.x, cursor.position.y, cursor.is_on);
    }

    info!("core-render demo finished.");
    Ok(())
}
