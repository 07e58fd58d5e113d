/// Spawn resolution.
///
/// Fallback chain, each step only used when the previous finds nothing:
///   1. The designated spawn cell. If a level has several, the LAST one in
///      row-major order wins (the scan keeps overwriting).
///   2. The first empty cell in row-major order.
///   3. A fixed point one tile in from the origin.
///
/// The actor is anchored horizontally centred in the cell with its feet on
/// the cell's bottom edge. The result is clamped into the world.

use super::grid::TileGrid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
}

/// Resolve the spawn point for an actor of size (w, h).
pub fn resolve(grid: &TileGrid, w: f32, h: f32) -> SpawnPoint {
    let spawn_cell = grid
        .cells()
        .filter(|&(_, _, t)| t.is_spawn())
        .last()
        .map(|(r, c, _)| (r, c));

    match spawn_cell {
        Some((r, c)) => anchored(grid, r, c, w, h),
        None => first_empty(grid, w, h),
    }
}

/// First empty cell in row-major order, or the fixed default.
pub fn first_empty(grid: &TileGrid, w: f32, h: f32) -> SpawnPoint {
    match grid.cells().find(|&(_, _, t)| t.is_empty()) {
        Some((r, c, _)) => anchored(grid, r, c, w, h),
        None => {
            let ts = grid.tile_size();
            let (x, y) = clamp_to_world(grid, ts, ts, w, h);
            SpawnPoint { x, y }
        }
    }
}

/// Clamp a top-left position so an actor of size (w, h) stays in the world.
/// Non-finite coordinates collapse to the origin side.
pub fn clamp_to_world(grid: &TileGrid, x: f32, y: f32, w: f32, h: f32) -> (f32, f32) {
    let (ww, wh) = grid.world_size();
    let cx = x.max(0.0).min((ww - w).max(0.0));
    let cy = y.max(0.0).min((wh - h).max(0.0));
    (cx, cy)
}

fn anchored(grid: &TileGrid, row: usize, col: usize, w: f32, h: f32) -> SpawnPoint {
    let ts = grid.tile_size();
    let x = col as f32 * ts + (ts - w) / 2.0;
    let y = row as f32 * ts + (ts - h);
    let (x, y) = clamp_to_world(grid, x, y, w, h);
    SpawnPoint { x, y }
}
