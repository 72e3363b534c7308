//! Text rendering of the game state.

use std::fmt::Write as _;

use art_gallery_core::{GuardView, MetricsReport, Point, Ratio};
use art_gallery_geometry as geometry;
use art_gallery_world::{query, World};

const MAP_COLUMNS: usize = 64;
const MAX_MAP_ROWS: usize = 32;

const OUTSIDE: char = ' ';
const UNSEEN: char = '.';
const SEEN_ONCE: char = ':';
const SEEN_MANY: char = '#';

/// Summary panel with placement progress, the four metrics and the guard list.
pub(crate) fn render_dashboard(world: &World, report: Option<&MetricsReport>) -> String {
    let settings = query::settings(world);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Guards placed: {}/{} ({} remaining)",
        query::guard_count(world),
        settings.max_guards(),
        query::remaining_guards(world)
    );
    if query::is_finished(world) {
        let _ = writeln!(out, "All guards are in position.");
    } else if settings.blind() {
        let _ = writeln!(out, "Blind mode: results are revealed once every guard is placed.");
    }

    let metric = |pick: fn(&MetricsReport) -> Ratio| {
        report.map_or_else(|| "-".to_owned(), |report| pick(report).to_string())
    };
    let rows = [
        ("Covered by 1+", metric(|report| report.coverage)),
        ("Covered by 2+", metric(|report| report.overlap)),
        ("Most effective guard", metric(|report| report.best_guard)),
        ("Least effective guard", metric(|report| report.worst_guard)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<24}{value:>5}", format!("{label}:"));
    }

    let guards = query::guard_view(world);
    if !guards.is_empty() {
        let _ = writeln!(out, "Guards:");
        for guard in guards.iter() {
            let _ = writeln!(
                out,
                "  #{} at ({:.2}, {:.2})",
                guard.id,
                guard.position.x(),
                guard.position.y()
            );
        }
    }
    out
}

/// ASCII raster of the floor plan with guards and, when revealed, what they see.
///
/// Returns `None` before the first game has started.
pub(crate) fn render_map(world: &World) -> Option<String> {
    let floor_plan = query::floor_plan(world)?;
    let bounds = floor_plan.bounds();
    let guards = query::guard_view(world);

    let columns = MAP_COLUMNS;
    // Terminal cells are roughly twice as tall as they are wide.
    let rows = ((bounds.height() / bounds.width()) * columns as f64 / 2.0)
        .round()
        .clamp(1.0, MAX_MAP_ROWS as f64) as usize;
    let cell_width = bounds.width() / columns as f64;
    let cell_height = bounds.height() / rows as f64;

    let mut grid = vec![vec![OUTSIDE; columns]; rows];
    for (row, line) in grid.iter_mut().enumerate() {
        let y = bounds.max_y() - (row as f64 + 0.5) * cell_height;
        for (column, cell) in line.iter_mut().enumerate() {
            let point = Point::new(bounds.min_x() + (column as f64 + 0.5) * cell_width, y);
            if floor_plan.contains(point) {
                *cell = shade(&guards, point);
            }
        }
    }

    for guard in guards.iter() {
        let column = ((guard.position.x() - bounds.min_x()) / cell_width) as usize;
        let row = ((bounds.max_y() - guard.position.y()) / cell_height) as usize;
        let marker = char::from_digit(guard.id.get() % 10, 10).unwrap_or('G');
        grid[row.min(rows - 1)][column.min(columns - 1)] = marker;
    }

    let mut out = String::with_capacity((columns + 3) * (rows + 2));
    let border = format!("+{}+", "-".repeat(columns));
    let _ = writeln!(out, "{border}");
    for line in grid {
        let _ = writeln!(out, "|{}|", line.into_iter().collect::<String>());
    }
    let _ = writeln!(out, "{border}");
    let _ = writeln!(
        out,
        "x: {:.2}..{:.2}  y: {:.2}..{:.2}  '{UNSEEN}' unseen  '{SEEN_ONCE}' seen by 1  '{SEEN_MANY}' seen by 2+",
        bounds.min_x(),
        bounds.max_x(),
        bounds.min_y(),
        bounds.max_y()
    );
    Some(out)
}

fn shade(guards: &GuardView, point: Point) -> char {
    let watchers = guards
        .iter()
        .filter_map(|guard| guard.visibility.as_ref())
        .filter(|visibility| geometry::contains(visibility, point))
        .count();
    match watchers {
        0 => UNSEEN,
        1 => SEEN_ONCE,
        _ => SEEN_MANY,
    }
}
