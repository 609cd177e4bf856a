//! What a heuristic sees when it scores a placement.
//!
//! [`PlacementContext`] pairs the grid as it was *before* the piece landed with the
//! bucket-local cells the piece would occupy at rest. The grid is never modified;
//! heuristics ask questions such as "is the cell below this piece cell empty?" and the
//! context answers them while treating the piece's own cells as transparent.
//!
//! ```rust,ignore
//! let context = PlacementContext::new(&map, &shape, resting);
//! let mean_row = context.mean_row();
//! let gaps: usize = context.column_gaps().map(|(_, gap)| gap).sum();
//! ```

use arrayvec::ArrayVec;
use rotris_engine::{GridMap, MAX_PIECE_CELLS, PiecePlacement, PieceShape};

/// Offsets of the four edge-sharing neighbours.
const NEIGHBORS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Debug, Clone)]
pub struct PlacementContext<'a> {
    map: &'a GridMap,
    placement: PiecePlacement,
    cells: ArrayVec<(i32, i32), MAX_PIECE_CELLS>,
}

impl<'a> PlacementContext<'a> {
    #[must_use]
    pub fn new(map: &'a GridMap, shape: &PieceShape, placement: PiecePlacement) -> Self {
        Self {
            map,
            placement,
            cells: shape.cells_at(placement).collect(),
        }
    }

    /// Grid before placement.
    #[must_use]
    pub fn map(&self) -> &'a GridMap {
        self.map
    }

    #[must_use]
    pub fn placement(&self) -> PiecePlacement {
        self.placement
    }

    /// Bucket-local cells of the resting piece.
    #[must_use]
    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    #[must_use]
    pub fn bucket_height(&self) -> f32 {
        self.map.bucket_height() as f32
    }

    #[must_use]
    pub fn occupies(&self, x: i32, y: i32) -> bool {
        self.cells.contains(&(x, y))
    }

    /// Mean row index of the piece cells. Rows grow toward the floor, so deeper is larger.
    #[must_use]
    pub fn mean_row(&self) -> f32 {
        let sum: i32 = self.cells.iter().map(|&(_, y)| y).sum();
        sum as f32 / self.cells.len() as f32
    }

    /// Row index of the piece cell closest to the floor.
    #[must_use]
    pub fn lowest_row(&self) -> i32 {
        self.cells.iter().map(|&(_, y)| y).max().unwrap_or(0)
    }

    /// Distinct rows the piece occupies, in ascending order.
    #[must_use]
    pub fn distinct_rows(&self) -> ArrayVec<i32, MAX_PIECE_CELLS> {
        let mut sorted: ArrayVec<i32, MAX_PIECE_CELLS> =
            self.cells.iter().map(|&(_, y)| y).collect();
        sorted.sort_unstable();
        let mut rows = ArrayVec::new();
        for y in sorted {
            if rows.last() != Some(&y) {
                rows.push(y);
            }
        }
        rows
    }

    /// For each column the piece touches, the number of empty cells between its lowest
    /// piece cell and the first solid cell or the floor below it.
    ///
    /// Columns are yielded in ascending order.
    pub fn column_gaps(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        let mut columns: ArrayVec<(i32, i32), MAX_PIECE_CELLS> = ArrayVec::new();
        for &(x, y) in &self.cells {
            match columns.iter_mut().find(|(cx, _)| *cx == x) {
                Some((_, bottom)) => *bottom = (*bottom).max(y),
                None => columns.push((x, y)),
            }
        }
        columns.sort_unstable();
        columns.into_iter().map(move |(x, bottom)| {
            let gap = (bottom + 1..)
                .take_while(|&y| self.map.cell_at(x, y).is_some_and(|cell| cell.is_interior()))
                .count();
            (x, gap)
        })
    }

    /// Row of the topmost solid cell in column `x` with the piece in place, or the
    /// bucket height for an empty column. `None` outside the bucket.
    #[must_use]
    pub fn surface_row(&self, x: i32) -> Option<i32> {
        let width = i32::try_from(self.map.bucket_width()).ok()?;
        let height = i32::try_from(self.map.bucket_height()).ok()?;
        if !(0..width).contains(&x) {
            return None;
        }
        let top = (0..height).find(|&y| {
            self.occupies(x, y)
                || self
                    .map
                    .cell_at(x, y)
                    .is_some_and(|cell| !cell.is_interior())
        });
        Some(top.unwrap_or(height))
    }

    /// Total step between the surfaces of neighbouring columns, from one column left of
    /// the piece to one column right of it.
    #[must_use]
    pub fn surface_roughness(&self) -> u32 {
        let (left, right) = self
            .cells
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
        let rows: ArrayVec<i32, { MAX_PIECE_CELLS + 2 }> = (left - 1..=right + 1)
            .filter_map(|x| self.surface_row(x))
            .collect();
        rows.windows(2).map(|pair| pair[0].abs_diff(pair[1])).sum()
    }

    /// Number of (piece cell, neighbour) pairs where the neighbour is solid.
    ///
    /// Settled blocks and in-bucket barriers always count. With `count_walls`, positions
    /// outside the bucket to the sides or below count as well. The open space above the
    /// bucket and the piece's own cells never count.
    #[must_use]
    pub fn solid_neighbors(&self, count_walls: bool) -> usize {
        self.cells
            .iter()
            .flat_map(|&(x, y)| NEIGHBORS.iter().map(move |&(dx, dy)| (x + dx, y + dy)))
            .filter(|&(nx, ny)| !self.occupies(nx, ny))
            .filter(|&(nx, ny)| match self.map.cell_at(nx, ny) {
                Some(cell) => cell.is_block() || cell.is_any_barrier(),
                None => count_walls && ny >= 0,
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rotris_engine::{Rotation, Topology, TopologyConfig};

    use super::*;

    fn map(art: &str, width: usize, height: usize) -> GridMap {
        let topology = Arc::new(Topology::new(TopologyConfig::framed(width, height)).unwrap());
        GridMap::from_ascii(topology, art)
    }

    fn bar() -> PieceShape {
        PieceShape::new("I2", &[(0, 0), (1, 0)], (0, 0)).unwrap()
    }

    fn at(x: i32, y: i32) -> PiecePlacement {
        PiecePlacement::new(Rotation::default(), x, y)
    }

    #[test]
    fn test_rows_and_means() {
        let map = map("....\n....\n....", 4, 3);
        let shape = PieceShape::new("L", &[(0, 0), (0, 1), (1, 1)], (0, 0)).unwrap();
        let context = PlacementContext::new(&map, &shape, at(1, 1));

        assert_eq!(context.cells(), &[(1, 1), (1, 2), (2, 2)]);
        assert!((context.mean_row() - 5.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(context.lowest_row(), 2);
        assert_eq!(context.distinct_rows().as_slice(), &[1, 2]);
    }

    #[test]
    fn test_column_gaps_stop_at_first_solid_cell() {
        let map = map(
            "
            ....
            ....
            ..@.
            ....
            ",
            4,
            4,
        );
        let context = PlacementContext::new(&map, &bar(), at(1, 0));
        let gaps: Vec<_> = context.column_gaps().collect();
        assert_eq!(gaps, vec![(1, 3), (2, 1)]);
    }

    #[test]
    fn test_column_gaps_stop_at_barriers_and_floor() {
        let map = map(
            "
            ....
            .#..
            ....
            ",
            4,
            3,
        );
        let context = PlacementContext::new(&map, &bar(), at(0, 0));
        let gaps: Vec<_> = context.column_gaps().collect();
        assert_eq!(gaps, vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn test_surface_rows_and_roughness() {
        let map = map(
            "
            ....
            @...
            @.#.
            ",
            4,
            3,
        );
        let dot = PieceShape::new("O1", &[(0, 0)], (0, 0)).unwrap();
        let context = PlacementContext::new(&map, &dot, at(1, 2));
        assert_eq!(context.surface_row(0), Some(1));
        assert_eq!(context.surface_row(1), Some(2));
        assert_eq!(context.surface_row(2), Some(2));
        assert_eq!(context.surface_row(3), Some(3));
        assert_eq!(context.surface_row(4), None);
        // Columns 0 to 2 only.
        assert_eq!(context.surface_roughness(), 1);
    }

    #[test]
    fn test_solid_neighbors_with_and_without_walls() {
        let map = map(
            "
            ....
            @...
            ",
            4,
            2,
        );
        // Bar resting at the top-left corner: wall on the left, block below the left cell.
        let context = PlacementContext::new(&map, &bar(), at(0, 0));
        assert_eq!(context.solid_neighbors(true), 2);
        assert_eq!(context.solid_neighbors(false), 1);
    }

    #[test]
    fn test_piece_cells_are_not_their_own_neighbors() {
        let map = map("....", 4, 1);
        let context = PlacementContext::new(&map, &bar(), at(1, 0));
        // Only the floor below each cell counts.
        assert_eq!(context.solid_neighbors(true), 2);
        assert_eq!(context.solid_neighbors(false), 0);
    }
}
