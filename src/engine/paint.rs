// src/engine/paint.rs

//! The default per-engine frame pipeline and the line painter that turns a
//! row of cells into runs of clusters.

use anyhow::Result;
use log::{trace, warn};

use crate::buffer::TextBufferCellIterator;
use crate::geometry::{CoordType, Point};
use crate::glyph::{DbcsAttribute, TextAttribute};

use super::{
    BufferLineRenderData, Cluster, EngineBase, HookResult, PaintStart, RenderClusterIterator, RenderEngine,
    RenderFrame, RenderFrameInfo,
};

/// Logs a failed optional hook; such failures never abort a frame.
fn log_hook(what: &str, result: Result<HookResult>) {
    if let Err(e) = result {
        warn!("RenderEngine: {} failed: {:#}", what, e);
    }
}

pub(super) fn render_frame<E: RenderEngine + ?Sized>(engine: &mut E, frame: &RenderFrame<'_>) -> Result<()> {
    if engine.start_paint()? == PaintStart::Skip {
        trace!("RenderEngine: Nothing to paint");
        return Ok(());
    }

    let dirty = engine.dirty_area();
    let painted = paint_phases(engine, frame);
    let ended = engine.end_paint();
    if let Err(e) = painted {
        // The failed area stays dirty until a frame paints it.
        let tracker = engine.base_mut().dirty_mut();
        for rect in dirty {
            tracker.invalidate(rect);
        }
        return Err(e);
    }
    ended
}

fn paint_phases<E: RenderEngine + ?Sized>(engine: &mut E, frame: &RenderFrame<'_>) -> Result<()> {
    let default_attr = frame.data.text_buffer().default_attr();
    engine.update_drawing_brushes(&default_attr, frame, false, true)?;
    engine.scroll_frame()?;

    let info = RenderFrameInfo {
        selection_spans: frame.data.selection_spans(),
        search_highlights: frame.data.search_highlights(),
        search_highlight_focused: frame.data.search_highlight_focused(),
        selection_background: frame.settings.selection_background,
    };
    engine.prepare_render_info(&info)?;

    engine.paint_background()?;

    let dirty = engine.dirty_area();
    let lines = EngineBase::loop_dirty_lines(frame, &dirty, |line| {
        log_hook(
            "prepare_line_transform",
            engine.prepare_line_transform(line.line_rendition, line.target.y, frame.viewport.left()),
        );
        paint_line(engine, frame, line)?;
        if let Some(slice) = line.buffer.row(line.buffer_line.top()).and_then(|r| r.image_slice()) {
            log_hook(
                "paint_image_slice",
                engine.paint_image_slice(slice, line.target.y, frame.viewport.left()),
            );
        }
        Ok(())
    });
    log_hook("reset_line_transform", engine.reset_line_transform());
    lines?;

    EngineBase::loop_overlays(frame, &dirty, |line| paint_line(engine, frame, line))?;

    EngineBase::loop_selection(frame, &dirty, |rect| {
        if let Err(e) = engine.paint_selection(rect) {
            warn!("RenderEngine: paint_selection failed: {:#}", e);
        }
        Ok(())
    })?;

    if frame.cursor.in_viewport && frame.cursor.is_visible {
        if let Err(e) = engine.paint_cursor(frame.cursor) {
            warn!("RenderEngine: paint_cursor failed: {:#}", e);
        }
    }

    engine.update_title(frame.data.console_title())?;
    Ok(())
}

fn is_all_spaces(text: &str) -> bool {
    text.chars().all(|c| c == ' ')
}

/// Paints one row as a sequence of runs.
///
/// A run ends where the attribute changes, where the set of patterns under
/// the cell changes, or where soft-font usage changes. Blank cells whose
/// attribute only differs in ways a space cannot show stay in the run.
pub(super) fn paint_line<E: RenderEngine + ?Sized>(
    engine: &mut E,
    frame: &RenderFrame<'_>,
    line: &BufferLineRenderData<'_>,
) -> Result<()> {
    let cells = line.cells();
    if !cells.is_valid() {
        return Ok(());
    }
    let mut clusters = engine.base_mut().take_cluster_buffer();
    let result = paint_runs(engine, frame, line, cells, &mut clusters);
    engine.base_mut().return_cluster_buffer(clusters);
    result
}

fn paint_runs<'a, E: RenderEngine + ?Sized>(
    engine: &mut E,
    frame: &RenderFrame<'_>,
    line: &BufferLineRenderData<'_>,
    mut cells: TextBufferCellIterator<'a>,
    clusters: &mut Vec<Cluster<'a>>,
) -> Result<()> {
    let mut screen_point = line.target;
    let mut cols: CoordType = 0;
    let mut pattern_ids = frame.data.pattern_ids(screen_point);
    let mut using_soft_font = frame.is_soft_font_char(cells.chars());

    while cells.is_valid() {
        let Some(run_attr) = cells.text_attr() else {
            break;
        };
        engine.update_drawing_brushes(&run_attr, frame, using_soft_font, false)?;

        screen_point.x += cols;
        cols = 0;

        let run_start_cells = cells;
        let run_start_target = screen_point;
        clusters.clear();
        let mut trim_left = false;
        let mut contains_wide = false;

        let mut it = RenderClusterIterator::new(cells);
        loop {
            let at = *it.cells();
            if !at.is_valid() {
                break;
            }
            let this_point = Point::new(screen_point.x + cols, screen_point.y);
            let this_patterns = frame.data.pattern_ids(this_point);
            let this_soft_font = frame.is_soft_font_char(at.chars());
            let changed = this_patterns != pattern_ids || this_soft_font != using_soft_font;
            if !it.is_valid() || changed {
                let attr = at.text_attr().unwrap_or(run_attr);
                let keep = !changed
                    && (attr == run_attr
                        || (is_all_spaces(at.chars())
                            && attr.has_identical_visual_representation_for_blank_space(&run_attr, line.global_invert)));
                if !keep {
                    pattern_ids = this_patterns;
                    using_soft_font = this_soft_font;
                    break;
                }
                it.continue_run();
            }

            let mut column_count = at.columns();
            if clusters.is_empty() && at.dbcs_attr() == DbcsAttribute::Trailing {
                // Start one column early so the whole glyph is struck; the
                // engine trims off the left half.
                screen_point.x -= 1;
                trim_left = true;
                column_count += 1;
            }
            contains_wide |= column_count > 1;

            clusters.push(Cluster::new(at.chars(), column_count));
            it.move_by(at.columns().max(1) as isize);
            cols += column_count;
        }
        cells = *it.cells();

        engine.paint_buffer_line(clusters, screen_point, trim_left, line.line_wrapped)?;

        if line.grid_lines_allowed {
            if contains_wide {
                // The halves of a wide character may carry different lines.
                let mut line_cells = run_start_cells;
                let mut target = run_start_target;
                for _ in 0..cols {
                    let attr = line_cells.text_attr().unwrap_or(run_attr);
                    paint_grid_lines(engine, frame, &attr, 1, target);
                    line_cells.advance(1);
                    target.x += 1;
                }
            } else {
                paint_grid_lines(engine, frame, &run_attr, cols, screen_point);
            }
        }
    }
    Ok(())
}

fn paint_grid_lines<E: RenderEngine + ?Sized>(
    engine: &mut E,
    frame: &RenderFrame<'_>,
    attr: &TextAttribute,
    columns: CoordType,
    target: Point,
) {
    let lines = engine.base().gridlines(attr, target, frame);
    if lines.is_empty() {
        return;
    }
    let color = frame.settings.attribute_colors(attr, frame.blink_faint).0;
    let underline_color = frame.settings.attribute_underline_color(attr, frame.blink_faint);
    if let Err(e) = engine.paint_buffer_grid_lines(lines, color, underline_color, columns, target) {
        warn!("RenderEngine: paint_buffer_grid_lines failed: {:#}", e);
    }
}
