/// TileGrid: the immutable terrain of one level.
///
/// ## Border containment
///
/// The world is enclosed by an implicit wall. `cell_at` answers `Tile::Solid`
/// for every (row, col) outside the grid, so a collision sweep can never
/// carry the actor past the edge of the map, however far it is displaced.
///
/// ## Coordinates
///
/// Cells are addressed as (row, col) with signed indices so callers can ask
/// about cells beyond the border. World units are pixels of the original
/// game: cell (r, c) covers `[c*ts, (c+1)*ts) x [r*ts, (r+1)*ts)`.

use super::collision::Rect;
use super::tile::Tile;

#[derive(Clone, Debug)]
pub struct TileGrid {
    tiles: Vec<Vec<Tile>>,
    rows: usize,
    cols: usize,
    tile_size: f32,
}

// ── Construction ──

impl TileGrid {
    /// Build a grid from raw level codes.
    ///
    /// Ragged input is made rectangular by padding short rows with empty
    /// cells up to the widest row.
    pub fn from_codes(codes: &[Vec<u8>], tile_size: f32) -> Self {
        let tiles = codes
            .iter()
            .map(|row| row.iter().map(|&c| Tile::from_code(c)).collect())
            .collect();
        Self::from_tiles(tiles, tile_size)
    }

    pub fn from_tiles(mut tiles: Vec<Vec<Tile>>, tile_size: f32) -> Self {
        let cols = tiles.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut tiles {
            row.resize(cols, Tile::Empty);
        }
        let rows = tiles.len();
        TileGrid { tiles, rows, cols, tile_size }
    }

    /// Test helper: one string per row, one digit per cell.
    #[cfg(test)]
    pub fn from_digit_rows(rows: &[&str], tile_size: f32) -> Self {
        let codes: Vec<Vec<u8>> = rows
            .iter()
            .map(|r| r.bytes().map(|b| b.wrapping_sub(b'0')).collect())
            .collect();
        Self::from_codes(&codes, tile_size)
    }
}

// ── Queries ──

impl TileGrid {
    /// Tile at (row, col). Anything outside the grid is solid wall.
    #[inline]
    pub fn cell_at(&self, row: i64, col: i64) -> Tile {
        if self.in_bounds(row, col) {
            self.tiles[row as usize][col as usize]
        } else {
            Tile::Solid
        }
    }

    #[inline]
    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as u64) < self.rows as u64 && (col as u64) < self.cols as u64
    }

    /// (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World size in world units: (cols * ts, rows * ts).
    pub fn world_size(&self) -> (f32, f32) {
        (self.cols as f32 * self.tile_size, self.rows as f32 * self.tile_size)
    }

    /// World-space rectangle covered by cell (row, col), in range or not.
    pub fn cell_rect(&self, row: i64, col: i64) -> Rect {
        Rect {
            x: col as f32 * self.tile_size,
            y: row as f32 * self.tile_size,
            w: self.tile_size,
            h: self.tile_size,
        }
    }

    /// All cells in row-major order (top-to-bottom, left-to-right).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &t)| (r, c, t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_solid() {
        let g = TileGrid::from_digit_rows(&["00", "00"], 32.0);
        assert_eq!(g.cell_at(0, 0), Tile::Empty);
        assert_eq!(g.cell_at(-1, 0), Tile::Solid);
        assert_eq!(g.cell_at(0, -1), Tile::Solid);
        assert_eq!(g.cell_at(2, 0), Tile::Solid);
        assert_eq!(g.cell_at(0, 2), Tile::Solid);
        assert_eq!(g.cell_at(i64::MAX, i64::MIN), Tile::Solid);
    }

    #[test]
    fn ragged_rows_are_padded_with_empty() {
        let g = TileGrid::from_digit_rows(&["111", "1", "11"], 32.0);
        assert_eq!(g.dimensions(), (3, 3));
        assert_eq!(g.cell_at(1, 1), Tile::Empty);
        assert_eq!(g.cell_at(1, 2), Tile::Empty);
        assert_eq!(g.cell_at(2, 2), Tile::Empty);
        assert_eq!(g.cell_at(2, 1), Tile::Solid);
    }

    #[test]
    fn world_size_scales_by_tile() {
        let g = TileGrid::from_digit_rows(&["0000", "0000", "0000"], 32.0);
        assert_eq!(g.world_size(), (128.0, 96.0));
    }

    #[test]
    fn cells_iterate_row_major() {
        let g = TileGrid::from_digit_rows(&["12", "34"], 32.0);
        let order: Vec<_> = g.cells().collect();
        assert_eq!(order, vec![
            (0, 0, Tile::Solid), (0, 1, Tile::Hazard),
            (1, 0, Tile::Goal), (1, 1, Tile::Spawn),
        ]);
    }

    #[test]
    fn empty_grid_is_all_wall() {
        let g = TileGrid::from_codes(&[], 32.0);
        assert_eq!(g.dimensions(), (0, 0));
        assert_eq!(g.cell_at(0, 0), Tile::Solid);
    }
}
