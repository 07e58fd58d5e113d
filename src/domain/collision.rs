/// Rectangle-vs-tile collision: axis-separated sweep and push-out.
///
/// ## Cell span
///
/// A rectangle covers the half-open box `[x, x+w) x [y, y+h)`. The cells it
/// spans run from `floor(x/ts)` to `ceil((x+w)/ts) - 1` on each axis, so an
/// actor resting flush on a floor (bottom edge == tile top) does not count
/// as overlapping that floor. Without this, walking along the ground would
/// trip the horizontal sweep on every frame.
///
/// ## Sweep order
///
/// Per frame the actor moves along X, resolves, then moves along Y and
/// resolves. Each axis only ever pushes back along itself, so corners are
/// never ambiguous.

use super::grid::TileGrid;
use super::tile::Tile;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Inclusive range of cell indices covered by `[lo, lo + len)`.
#[inline]
fn cell_span(lo: f32, len: f32, ts: f32) -> (i64, i64) {
    let first = (lo / ts).floor() as i64;
    let last = (((lo + len) / ts).ceil() as i64).saturating_sub(1);
    (first, last.max(first))
}

/// Visit every (row, col) the rectangle spans.
fn for_each_spanned_cell(grid: &TileGrid, rect: &Rect, mut f: impl FnMut(i64, i64)) {
    let ts = grid.tile_size();
    let (left, right) = cell_span(rect.x, rect.w, ts);
    let (top, bottom) = cell_span(rect.y, rect.h, ts);
    for r in top..=bottom {
        for c in left..=right {
            f(r, c);
        }
    }
}

/// Rectangles of every blocking cell the rectangle spans.
///
/// A cell blocks if it is out of range (implicit border wall) or its tile
/// is `Solid`. Hazard, goal and spawn cells never appear here.
pub fn overlapping_solid_cells(grid: &TileGrid, rect: &Rect) -> Vec<Rect> {
    let mut cells = Vec::new();
    for_each_spanned_cell(grid, rect, |r, c| {
        if grid.cell_at(r, c).is_solid() {
            cells.push(grid.cell_rect(r, c));
        }
    });
    cells
}

/// Does the rectangle touch an in-range cell matching `pred`?
/// The border wall is not a tile and never matches.
pub fn touches(grid: &TileGrid, rect: &Rect, pred: impl Fn(Tile) -> bool) -> bool {
    let mut hit = false;
    for_each_spanned_cell(grid, rect, |r, c| {
        if !hit && grid.in_bounds(r, c) && pred(grid.cell_at(r, c)) {
            hit = true;
        }
    });
    hit
}

/// Horizontal pass: move by `vx`, then push out of any solid cell.
///
/// Moving right snaps the right edge just left of the nearest wall;
/// moving left snaps the left edge just right of it. `epsilon` keeps the
/// snapped edge off the wall so floating-point equality cannot re-trigger
/// the overlap next frame. Velocity is zeroed on contact.
pub fn sweep_x(grid: &TileGrid, rect: &mut Rect, vx: &mut f32, epsilon: f32) {
    rect.x += *vx;
    let hits = overlapping_solid_cells(grid, rect);
    if hits.is_empty() {
        return;
    }

    if *vx > 0.0 {
        let wall = hits.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        rect.x = wall - rect.w - epsilon;
    } else if *vx < 0.0 {
        let wall = hits.iter().map(|c| c.right()).fold(f32::NEG_INFINITY, f32::max);
        rect.x = wall + epsilon;
    }
    *vx = 0.0;
}

/// Vertical pass: move by `vy`, then push out of any solid cell.
///
/// Returns the new ground-contact flag. Ground contact is only ever
/// established here, by a downward collision; every other outcome
/// (free flight, ceiling bump, no vertical motion) reports `false`.
/// A grounded frame with `vy == 0`, such as the first frame of a dash,
/// therefore reports `false`; the dash charge is only re-armed once
/// gravity brings the actor back down.
pub fn sweep_y(grid: &TileGrid, rect: &mut Rect, vy: &mut f32) -> bool {
    let mut on_ground = false;

    rect.y += *vy;
    let hits = overlapping_solid_cells(grid, rect);
    if hits.is_empty() {
        return on_ground;
    }

    if *vy > 0.0 {
        let floor = hits.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
        rect.y = floor - rect.h;
        on_ground = true;
    } else if *vy < 0.0 {
        let ceiling = hits.iter().map(|c| c.bottom()).fold(f32::NEG_INFINITY, f32::max);
        rect.y = ceiling;
    }
    *vy = 0.0;
    on_ground
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TS: f32 = 32.0;

    fn boxed() -> TileGrid {
        // 6x5, solid border, one interior pillar at (2,3)
        TileGrid::from_digit_rows(
            &["111111", "100001", "100101", "100001", "111111"],
            TS,
        )
    }

    // ── overlapping_solid_cells ──

    #[test]
    fn interior_rect_has_no_overlaps() {
        let g = boxed();
        let r = Rect::new(40.0, 40.0, 22.0, 26.0);
        assert!(overlapping_solid_cells(&g, &r).is_empty());
    }

    #[test]
    fn flush_edges_do_not_overlap() {
        let g = boxed();
        // Bottom edge exactly on the floor row (row 4 top = 128)
        let r = Rect::new(40.0, 128.0 - 26.0, 22.0, 26.0);
        assert!(overlapping_solid_cells(&g, &r).is_empty());
    }

    #[test]
    fn non_solid_tiles_never_block() {
        let g = TileGrid::from_digit_rows(&["0234", "2340", "3402"], TS);
        let r = Rect::new(0.0, 0.0, 4.0 * TS - 1.0, 3.0 * TS - 1.0);
        assert!(overlapping_solid_cells(&g, &r).is_empty());
    }

    #[test]
    fn border_is_solid() {
        let g = TileGrid::from_digit_rows(&["00", "00"], TS);
        let r = Rect::new(-5.0, 10.0, 22.0, 26.0);
        let hits = overlapping_solid_cells(&g, &r);
        assert!(hits.iter().any(|c| c.x == -TS));
    }

    // ── sweep_x ──

    #[test]
    fn sweep_right_snaps_left_of_wall() {
        let g = boxed();
        // Pillar at col 3 spans x 96..128. Start just short of it.
        let mut r = Rect::new(70.0, 70.0, 22.0, 20.0);
        let mut vx = 8.0;
        sweep_x(&g, &mut r, &mut vx, 0.001);
        assert_eq!(vx, 0.0);
        assert!((r.right() - (96.0 - 0.001)).abs() < 1e-3);
        assert!(overlapping_solid_cells(&g, &r).is_empty());
    }

    #[test]
    fn sweep_left_snaps_right_of_wall() {
        let g = boxed();
        let mut r = Rect::new(36.0, 40.0, 22.0, 20.0);
        let mut vx = -10.0;
        sweep_x(&g, &mut r, &mut vx, 0.001);
        assert_eq!(vx, 0.0);
        assert!((r.x - (32.0 + 0.001)).abs() < 1e-3);
    }

    #[test]
    fn free_horizontal_move_keeps_velocity() {
        let g = boxed();
        let mut r = Rect::new(40.0, 40.0, 22.0, 20.0);
        let mut vx = 3.0;
        sweep_x(&g, &mut r, &mut vx, 0.001);
        assert_eq!(vx, 3.0);
        assert_eq!(r.x, 43.0);
    }

    // ── sweep_y ──

    #[test]
    fn falling_lands_on_floor() {
        let g = boxed();
        let mut r = Rect::new(40.0, 100.0, 22.0, 26.0);
        let mut vy = 5.0;
        let grounded = sweep_y(&g, &mut r, &mut vy);
        assert!(grounded);
        assert_eq!(vy, 0.0);
        assert_eq!(r.bottom(), 128.0);
    }

    #[test]
    fn rising_bonks_ceiling_without_ground() {
        let g = boxed();
        let mut r = Rect::new(40.0, 34.0, 22.0, 26.0);
        let mut vy = -9.5;
        let grounded = sweep_y(&g, &mut r, &mut vy);
        assert!(!grounded);
        assert_eq!(vy, 0.0);
        assert_eq!(r.y, 32.0);
    }

    #[test]
    fn airborne_motion_is_not_ground() {
        let g = boxed();
        let mut r = Rect::new(40.0, 40.0, 22.0, 26.0);
        let mut vy = 1.0;
        assert!(!sweep_y(&g, &mut r, &mut vy));
        assert_eq!(vy, 1.0);
    }

    // ── touches ──

    #[test]
    fn touches_ignores_border() {
        let g = TileGrid::from_digit_rows(&["02", "00"], TS);
        let outside = Rect::new(-40.0, 0.0, 22.0, 26.0);
        assert!(!touches(&g, &outside, |t| t.is_solid()));
        let on_spike = Rect::new(40.0, 4.0, 22.0, 26.0);
        assert!(touches(&g, &on_spike, |t| t.is_hazard()));
    }

    #[test]
    fn touching_edge_is_not_contact() {
        let g = TileGrid::from_digit_rows(&["03"], TS);
        let beside = Rect::new(32.0 - 22.0, 0.0, 22.0, 26.0);
        assert!(!touches(&g, &beside, |t| t.is_goal()));
    }

    // ── Properties ──

    fn code_grid() -> impl Strategy<Value = Vec<Vec<u8>>> {
        (1usize..8, 1usize..8).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(prop::collection::vec(0u8..5, cols), rows)
        })
    }

    proptest! {
        #[test]
        fn collision_set_excludes_non_solid(
            codes in code_grid(),
            x in 0.0f32..200.0,
            y in 0.0f32..200.0,
        ) {
            let g = TileGrid::from_codes(&codes, TS);
            let r = Rect::new(x, y, 22.0, 26.0);
            for cell in overlapping_solid_cells(&g, &r) {
                let row = (cell.y / TS).round() as i64;
                let col = (cell.x / TS).round() as i64;
                prop_assert!(g.cell_at(row, col).is_solid());
                if g.in_bounds(row, col) {
                    prop_assert_eq!(codes[row as usize][col as usize], 1);
                }
            }
        }

        #[test]
        fn outside_world_always_blocks(
            codes in code_grid(),
            dx in 1.0f32..1.0e7,
            dy in -1.0e7f32..1.0e7,
            side in 0u8..4,
        ) {
            let g = TileGrid::from_codes(&codes, TS);
            let (ww, wh) = g.world_size();
            let (x, y) = match side {
                0 => (-dx - 22.0, dy),
                1 => (ww + dx, dy),
                2 => (dy, -dx - 26.0),
                _ => (dy, wh + dx),
            };
            let r = Rect::new(x, y, 22.0, 26.0);
            prop_assert!(!overlapping_solid_cells(&g, &r).is_empty());
        }

        #[test]
        fn sweeps_never_leave_bordered_world(
            vx in -40.0f32..40.0,
            vy in -40.0f32..40.0,
        ) {
            let g = boxed();
            let mut r = Rect::new(40.0, 40.0, 22.0, 26.0);
            let (mut vx, mut vy) = (vx, vy);
            sweep_x(&g, &mut r, &mut vx, 0.001);
            sweep_y(&g, &mut r, &mut vy);
            prop_assert!(r.x >= 0.0 && r.right() <= 6.0 * TS);
            prop_assert!(r.y >= 0.0 && r.bottom() <= 5.0 * TS);
        }
    }
}
