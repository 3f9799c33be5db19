//! Text rendering of a path over the field, for debugging.

use crate::models::Waypoint;

pub const EMPTY_PATH_MESSAGE: &str = "No path to visualize.";

const EMPTY_CELL: char = '.';
const PATH_CELL: char = 'X';
const START_CELL: char = 'S';
const END_CELL: char = 'E';

/// Render `path` as an ASCII grid, highest row first so the origin sits at
/// the bottom left. Points outside the grid are skipped.
pub fn render_path(path: &[Waypoint], field_width: f64, field_height: f64, coverage_radius: f64) -> String {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return EMPTY_PATH_MESSAGE.to_string();
    };

    let grid_width = cell_count(field_width);
    let grid_height = cell_count(field_height);
    let mut grid = vec![vec![EMPTY_CELL; grid_width]; grid_height];

    let mut mark = |wp: &Waypoint, symbol: char| {
        if let Some((col, row)) = cell_of(wp, grid_width, grid_height) {
            grid[row][col] = symbol;
        }
    };
    for wp in path {
        mark(wp, PATH_CELL);
    }
    mark(first, START_CELL);
    mark(last, END_CELL);

    let mut out = format!(
        "Field Size: {}x{} | Coverage Radius: {}",
        field_width, field_height, coverage_radius
    );
    for row in grid.iter().rev() {
        out.push('\n');
        let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        out.push_str(&line.join(" "));
    }
    out
}

fn cell_count(extent: f64) -> usize {
    if extent >= 0.0 {
        extent.floor() as usize + 1
    } else {
        0
    }
}

/// Grid cell of a waypoint, truncating coordinates toward zero.
fn cell_of(wp: &Waypoint, width: usize, height: usize) -> Option<(usize, usize)> {
    let col = wp.x.trunc();
    let row = wp.y.trunc();
    if !(col >= 0.0 && row >= 0.0) {
        return None;
    }
    let (col, row) = (col as usize, row as usize);
    (col < width && row < height).then_some((col, row))
}
