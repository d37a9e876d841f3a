//! Tile map: a fixed grid of tile codes with spatial queries.
//!
//! The grid is allocated once per level and mutated in place by
//! [`TileMap::set`] and [`TileMap::fill`]. All queries are bounds-checked:
//! reads outside the grid return [`VOID_TILE`], writes outside the grid are
//! ignored.
//!
//! # Coordinate Spaces
//!
//! - **Grid space**: integer cell coordinates `(x, y)`, `0 <= x < width`
//! - **Pixel space**: cell `(x, y)` covers `tile_size × tile_size` pixels at
//!   `(x * tile_size, y * tile_size)`
//!
//! # Example
//!
//! ```
//! use cobble::{Rect, TileClass, TileClassTable, TileMap, VOID_TILE};
//! use glam::IVec2;
//!
//! let classes = TileClassTable::new(TileClass::Passable).with(1, TileClass::Obstacle);
//! let mut map = TileMap::new(10, 10, 16, classes).unwrap();
//!
//! map.fill(1, Rect::new(2, 2, 3, 1));
//! assert_eq!(map.get(4, 2), 1);
//! assert_eq!(map.get(-1, 0), VOID_TILE);
//!
//! assert_eq!(map.coord_to_map(IVec2::new(40, 56)), IVec2::new(2, 3));
//! assert_eq!(map.map_to_coord(IVec2::new(2, 3)), Rect::new(32, 48, 16, 16));
//! ```

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::geom::Rect;
use crate::tile::{TileClass, TileClassTable, TileCode, VOID_TILE};

/// Errors raised when constructing a tile map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileMapError {
    /// Width or height is not positive.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width in cells
        width: i32,
        /// Requested height in cells
        height: i32,
    },
    /// Tile size is not positive.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
    /// A row passed to [`TileMap::from_rows`] has the wrong length.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Index of the offending row
        row: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        actual: usize,
    },
    /// Cell storage does not match the grid dimensions.
    #[error("expected {expected} cells, got {actual}")]
    CellCount {
        /// `width * height`
        expected: usize,
        /// Number of cells supplied
        actual: usize,
    },
}

/// Fixed-size grid of tile codes.
///
/// Deserialization runs the same checks as [`TileMap::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TileMapRepr")]
pub struct TileMap {
    /// Edge length of a tile in pixels
    tile_size: i32,
    /// Grid width in cells
    width: i32,
    /// Grid height in cells
    height: i32,
    /// Row-major cell codes
    cells: Vec<TileCode>,
    /// Passability classification
    classes: TileClassTable,
}

/// Unchecked serialized form of a [`TileMap`].
#[derive(Deserialize)]
struct TileMapRepr {
    tile_size: i32,
    width: i32,
    height: i32,
    cells: Vec<TileCode>,
    classes: TileClassTable,
}

impl TryFrom<TileMapRepr> for TileMap {
    type Error = TileMapError;

    fn try_from(repr: TileMapRepr) -> Result<Self, Self::Error> {
        let mut map = Self::new(repr.width, repr.height, repr.tile_size, repr.classes)?;
        if repr.cells.len() != map.cells.len() {
            return Err(TileMapError::CellCount {
                expected: map.cells.len(),
                actual: repr.cells.len(),
            });
        }
        map.cells = repr.cells;
        Ok(map)
    }
}

impl TileMap {
    /// Create a map filled with code `0`.
    ///
    /// # Errors
    ///
    /// Returns [`TileMapError`] if a dimension or the tile size is not positive.
    pub fn new(
        width: i32,
        height: i32,
        tile_size: i32,
        classes: TileClassTable,
    ) -> Result<Self, TileMapError> {
        if width <= 0 || height <= 0 {
            return Err(TileMapError::InvalidDimensions { width, height });
        }
        if tile_size <= 0 {
            return Err(TileMapError::InvalidTileSize(tile_size));
        }
        // Both dimensions are positive, so the casts are lossless.
        #[allow(clippy::cast_sign_loss)]
        let len = width as usize * height as usize;
        Ok(Self {
            tile_size,
            width,
            height,
            cells: vec![0; len],
            classes,
        })
    }

    /// Create a map from rows of codes, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`TileMapError`] if there are no rows, the rows are empty or
    /// ragged, or the tile size is not positive.
    pub fn from_rows(
        rows: &[Vec<TileCode>],
        tile_size: i32,
        classes: TileClassTable,
    ) -> Result<Self, TileMapError> {
        let expected = rows.first().map_or(0, Vec::len);
        if let Some((row, actual)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(TileMapError::RaggedRow {
                row,
                expected,
                actual,
            });
        }
        let width = i32::try_from(expected).unwrap_or(i32::MAX);
        let height = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        let mut map = Self::new(width, height, tile_size, classes)?;
        map.cells = rows.iter().flatten().copied().collect();
        Ok(map)
    }

    /// Edge length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// The classification table attached at construction.
    #[must_use]
    pub fn classes(&self) -> &TileClassTable {
        &self.classes
    }

    /// Pixel rectangle covering the whole grid.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.width * self.tile_size,
            self.height * self.tile_size,
        )
    }

    /// True if `(x, y)` is a cell of the grid.
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        0 <= x && x < self.width && 0 <= y && y < self.height
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Code at `(x, y)`, or [`VOID_TILE`] outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> TileCode {
        self.index(x, y).map_or(VOID_TILE, |i| self.cells[i])
    }

    /// Write a code at `(x, y)`. Ignored outside the grid.
    pub fn set(&mut self, x: i32, y: i32, code: TileCode) {
        match self.index(x, y) {
            Some(i) => self.cells[i] = code,
            None => trace!(x, y, code, "ignoring out-of-bounds tile write"),
        }
    }

    /// Write `code` into every cell whose grid coordinate lies in `rect`.
    ///
    /// `rect` is in grid units. Cells outside the grid are skipped.
    pub fn fill(&mut self, code: TileCode, rect: Rect) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(self.width);
        let y1 = rect.bottom().min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, code);
            }
        }
    }

    /// Pixel rectangle of the tile at a grid coordinate.
    #[must_use]
    pub fn map_to_coord(&self, grid: IVec2) -> Rect {
        Rect::new(
            grid.x * self.tile_size,
            grid.y * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Grid coordinate containing a pixel position (floor division).
    #[must_use]
    pub fn coord_to_map(&self, pixel: IVec2) -> IVec2 {
        IVec2::new(
            pixel.x.div_euclid(self.tile_size),
            pixel.y.div_euclid(self.tile_size),
        )
    }

    /// Grid cells (clamped to the map) whose pixel rects overlap `range`.
    ///
    /// Returned in grid units; empty if nothing overlaps.
    #[must_use]
    pub fn grid_range(&self, range: Rect) -> Rect {
        if range.is_empty() {
            return Rect::default();
        }
        let min = self.coord_to_map(range.min()).max(IVec2::ZERO);
        // max is exclusive, so the last covered pixel is max - 1
        let max = (self.coord_to_map(range.max() - IVec2::ONE) + IVec2::ONE)
            .min(IVec2::new(self.width, self.height));
        if min.x >= max.x || min.y >= max.y {
            return Rect::default();
        }
        Rect::from_min_max(min, max)
    }

    /// Passability class of a code.
    #[must_use]
    pub fn classify(&self, code: TileCode) -> TileClass {
        self.classes.classify(code)
    }

    /// True if the cell at `(x, y)` blocks movement. Void cells block.
    #[must_use]
    pub fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.classify(self.get(x, y)).is_obstacle()
    }

    /// Pixel rects of every obstacle tile overlapping `range`, row-major.
    ///
    /// Only in-bounds tiles are reported; the map edge is a fence concern.
    /// Callers resolving a move must pass a range covering both the current
    /// and the next collider (see [`Rect::expanded`]).
    #[must_use]
    pub fn obstacle_rects(&self, range: Rect) -> Vec<Rect> {
        let cells = self.grid_range(range);
        let mut rects = Vec::new();
        for y in cells.y..cells.bottom() {
            for x in cells.x..cells.right() {
                if self.is_obstacle(x, y) {
                    rects.push(self.map_to_coord(IVec2::new(x, y)));
                }
            }
        }
        rects
    }

    /// First cell in row-major order whose code satisfies `predicate`.
    ///
    /// `region` is a pixel rect restricting the scan to the tiles it
    /// overlaps; `None` scans the whole grid.
    pub fn first_match<P>(&self, mut predicate: P, region: Option<Rect>) -> Option<IVec2>
    where
        P: FnMut(TileCode) -> bool,
    {
        let cells = match region {
            Some(region) => self.grid_range(region),
            None => Rect::new(0, 0, self.width, self.height),
        };
        for y in cells.y..cells.bottom() {
            for x in cells.x..cells.right() {
                if predicate(self.get(x, y)) {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }

    /// Visit every tile overlapping `viewport` as `callback(x, y, code)`.
    ///
    /// Rows are visited bottom to top, cells within a row left to right,
    /// matching ground-plane draw order.
    pub fn for_each_visible<F>(&self, viewport: Rect, mut callback: F)
    where
        F: FnMut(i32, i32, TileCode),
    {
        let cells = self.grid_range(viewport);
        for y in (cells.y..cells.bottom()).rev() {
            for x in cells.x..cells.right() {
                callback(x, y, self.get(x, y));
            }
        }
    }

    /// Number of cells whose code satisfies `predicate`.
    pub fn count_matching<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(TileCode) -> bool,
    {
        self.cells.iter().filter(|code| predicate(**code)).count()
    }

    /// Row-major iterator over `(grid, code)`.
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, TileCode)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, code)| {
            // Index fits: cells.len() == width * height, both i32.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let i = i as i32;
            (IVec2::new(i % width, i / width), *code)
        })
    }

    /// Export as rows of codes, top row first.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<TileCode>> {
        #[allow(clippy::cast_sign_loss)]
        let width = self.width as usize;
        self.cells.chunks(width).map(<[TileCode]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WALL: TileCode = 1;

    fn classes() -> TileClassTable {
        TileClassTable::new(TileClass::Passable).with(WALL, TileClass::Obstacle)
    }

    fn map_10x10() -> TileMap {
        TileMap::new(10, 10, 16, classes()).unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn new_fills_with_zero() {
            let map = map_10x10();
            assert_eq!(map.width(), 10);
            assert_eq!(map.height(), 10);
            assert_eq!(map.tile_size(), 16);
            assert_eq!(map.count_matching(|c| c == 0), 100);
            assert_eq!(map.bounds(), Rect::new(0, 0, 160, 160));
        }

        #[test]
        fn rejects_invalid_dimensions() {
            assert_eq!(
                TileMap::new(0, 5, 16, classes()),
                Err(TileMapError::InvalidDimensions {
                    width: 0,
                    height: 5
                })
            );
            assert_eq!(
                TileMap::new(5, 5, 0, classes()),
                Err(TileMapError::InvalidTileSize(0))
            );
        }

        #[test]
        fn from_rows_preserves_layout() {
            let rows = vec![vec![0, 1, 2], vec![3, 4, 5]];
            let map = TileMap::from_rows(&rows, 8, classes()).unwrap();
            assert_eq!(map.width(), 3);
            assert_eq!(map.height(), 2);
            assert_eq!(map.get(2, 0), 2);
            assert_eq!(map.get(0, 1), 3);
            assert_eq!(map.rows(), rows);
        }

        #[test]
        fn from_rows_rejects_ragged_rows() {
            let rows = vec![vec![0, 1, 2], vec![3, 4]];
            assert_eq!(
                TileMap::from_rows(&rows, 8, classes()),
                Err(TileMapError::RaggedRow {
                    row: 1,
                    expected: 3,
                    actual: 2
                })
            );
        }

        #[test]
        fn from_rows_rejects_empty_input() {
            assert!(TileMap::from_rows(&[], 8, classes()).is_err());
        }
    }

    mod access_tests {
        use super::*;

        #[test]
        fn set_then_get() {
            let mut map = map_10x10();
            map.set(3, 3, WALL);
            assert_eq!(map.get(3, 3), WALL);
            assert!(map.is_obstacle(3, 3));
            assert!(!map.is_obstacle(3, 4));
        }

        #[test]
        fn out_of_bounds_reads_void_and_writes_are_ignored() {
            let mut map = map_10x10();
            let before = map.clone();
            map.set(-1, 0, WALL);
            map.set(10, 0, WALL);
            map.set(0, 10, WALL);
            assert_eq!(map, before);
            assert_eq!(map.get(-1, 0), VOID_TILE);
            assert_eq!(map.get(10, 0), VOID_TILE);
            assert!(map.is_obstacle(-1, -1));
        }

        #[test]
        fn fill_clips_to_grid() {
            let mut map = map_10x10();
            map.fill(WALL, Rect::new(8, 8, 5, 5));
            assert_eq!(map.count_matching(|c| c == WALL), 4);
            assert_eq!(map.get(9, 9), WALL);
        }
    }

    mod coordinate_tests {
        use super::*;

        #[test]
        fn coord_to_map_floors_negative_pixels() {
            let map = map_10x10();
            assert_eq!(map.coord_to_map(IVec2::new(15, 16)), IVec2::new(0, 1));
            assert_eq!(map.coord_to_map(IVec2::new(-1, -16)), IVec2::new(-1, -1));
            assert_eq!(map.coord_to_map(IVec2::new(-17, 0)), IVec2::new(-2, 0));
        }

        #[test]
        fn grid_range_is_clamped_and_exclusive() {
            let map = map_10x10();
            assert_eq!(map.grid_range(Rect::new(16, 16, 16, 16)), Rect::new(1, 1, 1, 1));
            assert_eq!(map.grid_range(Rect::new(15, 15, 2, 2)), Rect::new(0, 0, 2, 2));
            assert_eq!(map.grid_range(Rect::new(-50, -50, 60, 60)), Rect::new(0, 0, 1, 1));
            assert!(map.grid_range(Rect::new(200, 200, 10, 10)).is_empty());
            assert!(map.grid_range(Rect::new(0, 0, 0, 10)).is_empty());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn obstacle_rects_only_reports_overlapping_obstacles() {
            let mut map = map_10x10();
            map.set(3, 3, WALL);
            map.set(5, 3, WALL);

            let rects = map.obstacle_rects(Rect::new(36, 52, 24, 8));
            assert_eq!(rects, vec![Rect::new(48, 48, 16, 16)]);

            // Touching the tile edge is not an overlap
            assert!(map.obstacle_rects(Rect::new(40, 52, 8, 8)).is_empty());
        }

        #[test]
        fn obstacle_rects_are_row_major() {
            let mut map = map_10x10();
            map.set(1, 1, WALL);
            map.set(0, 1, WALL);
            map.set(1, 0, WALL);
            let rects = map.obstacle_rects(map.bounds());
            assert_eq!(
                rects,
                vec![
                    Rect::new(16, 0, 16, 16),
                    Rect::new(0, 16, 16, 16),
                    Rect::new(16, 16, 16, 16),
                ]
            );
        }

        #[test]
        fn first_match_scans_row_major() {
            let mut map = map_10x10();
            map.set(7, 1, 5);
            map.set(2, 4, 5);
            assert_eq!(map.first_match(|c| c == 5, None), Some(IVec2::new(7, 1)));
            assert_eq!(map.first_match(|c| c == 9, None), None);
        }

        #[test]
        fn first_match_respects_region() {
            let mut map = map_10x10();
            map.set(7, 1, 5);
            map.set(2, 4, 5);
            let region = Rect::new(0, 48, 64, 32);
            assert_eq!(
                map.first_match(|c| c == 5, Some(region)),
                Some(IVec2::new(2, 4))
            );
            assert_eq!(map.first_match(|c| c == 5, Some(Rect::new(0, 0, 16, 16))), None);
        }

        #[test]
        fn for_each_visible_runs_bottom_to_top() {
            let map = map_10x10();
            let mut seen = Vec::new();
            map.for_each_visible(Rect::new(8, 8, 16, 16), |x, y, _| seen.push((x, y)));
            assert_eq!(seen, vec![(0, 1), (1, 1), (0, 0), (1, 0)]);
        }

        #[test]
        fn for_each_visible_reports_codes() {
            let mut map = map_10x10();
            map.set(9, 9, 4);
            let mut codes = Vec::new();
            map.for_each_visible(Rect::new(150, 150, 100, 100), |_, _, c| codes.push(c));
            assert_eq!(codes, vec![4]);
        }

        #[test]
        fn cells_iterates_row_major() {
            let map = TileMap::from_rows(&[vec![1, 2], vec![3, 4]], 8, classes()).unwrap();
            let cells: Vec<_> = map.cells().collect();
            assert_eq!(
                cells,
                vec![
                    (IVec2::new(0, 0), 1),
                    (IVec2::new(1, 0), 2),
                    (IVec2::new(0, 1), 3),
                    (IVec2::new(1, 1), 4),
                ]
            );
        }
    }

    mod serde_tests {
        use super::*;

        fn json(tile_size: i32, width: i32, height: i32, cells: &[TileCode]) -> String {
            format!(
                r#"{{"tile_size":{tile_size},"width":{width},"height":{height},"cells":{cells:?},"classes":{{"default":"Passable","entries":{{}}}}}}"#
            )
        }

        #[test]
        fn round_trips_through_json() {
            let mut map = map_10x10();
            map.fill(WALL, Rect::new(2, 2, 3, 1));
            let text = serde_json::to_string(&map).unwrap();
            let back: TileMap = serde_json::from_str(&text).unwrap();
            assert_eq!(back, map);
            assert!(back.is_obstacle(4, 2));
        }

        #[test]
        fn accepts_well_formed_json() {
            let map: TileMap = serde_json::from_str(&json(16, 2, 2, &[0, 1, 2, 3])).unwrap();
            assert_eq!(map.get(1, 1), 3);
            assert_eq!(map.coord_to_map(IVec2::new(20, 5)), IVec2::new(1, 0));
        }

        #[test]
        fn rejects_short_cell_storage() {
            let err = serde_json::from_str::<TileMap>(&json(16, 4, 4, &[])).unwrap_err();
            assert!(err.to_string().contains("expected 16 cells, got 0"), "{err}");
        }

        #[test]
        fn rejects_zero_tile_size() {
            let err = serde_json::from_str::<TileMap>(&json(0, 1, 1, &[0])).unwrap_err();
            assert!(err.to_string().contains("tile size"), "{err}");
        }

        #[test]
        fn rejects_negative_dimensions() {
            assert!(serde_json::from_str::<TileMap>(&json(16, -2, 2, &[])).is_err());
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn set_get_round_trip(x in -5i32..15, y in -5i32..15, code in 0i32..100) {
                let mut map = map_10x10();
                map.set(x, y, code);
                if map.in_bounds(x, y) {
                    prop_assert_eq!(map.get(x, y), code);
                } else {
                    prop_assert_eq!(map.get(x, y), VOID_TILE);
                }
            }

            #[test]
            fn fill_changes_exactly_the_rect(
                x in -4i32..12,
                y in -4i32..12,
                w in 0i32..8,
                h in 0i32..8,
                code in 2i32..50,
            ) {
                let before = map_10x10();
                let mut after = before.clone();
                let rect = Rect::new(x, y, w, h);
                after.fill(code, rect);

                for cy in 0..10 {
                    for cx in 0..10 {
                        let inside = rect.contains_point(IVec2::new(cx, cy));
                        let expected = if inside { code } else { before.get(cx, cy) };
                        prop_assert_eq!(after.get(cx, cy), expected);
                    }
                }
            }
        }
    }
}
