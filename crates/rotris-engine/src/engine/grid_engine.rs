use std::{fmt, sync::Arc};

use crate::core::{
    BucketContents, Cell, GridMap, PiecePlacement, PieceShape, RotationDirection, Topology,
};

use super::event::{GridEvent, GridObserver};

/// Single owner of the live [`GridMap`].
///
/// Every mutation goes through the engine, which applies it to the map and then
/// notifies the subscribed observers. Readers get a `&GridMap` from [`Self::map`];
/// nobody else holds a mutable handle to the grid.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rotris_engine::{Cell, GridMapEngine, Topology, TopologyConfig};
///
/// let topology = Arc::new(Topology::new(TopologyConfig::framed(4, 2)).unwrap());
/// let mut engine = GridMapEngine::new(topology);
/// for x in 0..4 {
///     engine.set_cell(x, 1, Cell::Block);
/// }
/// assert_eq!(engine.collapse_full_rows(1, false), vec![1]);
/// assert_eq!(engine.map().bucket_dump(), "....\n....\n");
/// ```
pub struct GridMapEngine {
    map: GridMap,
    observers: Vec<Box<dyn GridObserver>>,
}

impl fmt::Debug for GridMapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridMapEngine")
            .field("map", &self.map)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GridMapEngine {
    #[must_use]
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            map: GridMap::new(topology),
            observers: vec![],
        }
    }

    /// Takes ownership of an existing grid, e.g. one built with [`GridMap::from_ascii`].
    #[must_use]
    pub fn from_map(map: GridMap) -> Self {
        Self {
            map,
            observers: vec![],
        }
    }

    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: GridObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: &GridEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }

    /// Emits a `CellChanged` for every bucket cell that differs from `before`.
    fn emit_bucket_diff(&mut self, before: &BucketContents) {
        let after = self.map.bucket_contents();
        let changes: Vec<_> = after
            .rows()
            .zip(before.rows())
            .enumerate()
            .flat_map(|(y, (new_row, old_row))| {
                new_row
                    .iter()
                    .zip(old_row)
                    .enumerate()
                    .filter(|(_, (new, old))| new != old)
                    .map(move |(x, (&cell, _))| GridEvent::CellChanged { x, y, cell })
            })
            .collect();
        for event in &changes {
            self.emit(event);
        }
    }

    /// Read-only view of the grid.
    #[must_use]
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    #[must_use]
    pub fn topology(&self) -> &Arc<Topology> {
        self.map.topology()
    }

    /// Rebuilds the grid from the topology and zeroes the rotation counter.
    pub fn reset_map(&mut self) {
        self.map.reset();
        log::debug!("grid reset for a {} topology", self.map.topology().class());
        self.emit(&GridEvent::MapReset);
    }

    /// Copy of the bucket region.
    #[must_use]
    pub fn get_bucket_map(&self) -> BucketContents {
        self.map.bucket_contents()
    }

    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        self.map.cell_at(x, y)
    }

    /// Writes a bucket-local cell. Returns `false` outside the bucket.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        let Some(previous) = self.map.set_cell(x, y, cell) else {
            return false;
        };
        if previous != cell
            && let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
        {
            self.emit(&GridEvent::CellChanged { x, y, cell });
        }
        true
    }

    #[must_use]
    pub fn is_contained(&self, shape: &PieceShape, placement: PiecePlacement) -> bool {
        self.map.is_contained(shape, placement)
    }

    #[must_use]
    pub fn drop_distance(&self, shape: &PieceShape, placement: PiecePlacement) -> Option<usize> {
        self.map.drop_distance(shape, placement)
    }

    /// Stamps a contained piece into the grid. Returns `false` if it is not contained.
    pub fn settle_piece(&mut self, shape: &PieceShape, placement: PiecePlacement) -> bool {
        if !self.map.settle_piece(shape, placement) {
            return false;
        }
        let events: Vec<_> = shape
            .cells_at(placement)
            .filter_map(|(x, y)| {
                Some(GridEvent::CellChanged {
                    x: usize::try_from(x).ok()?,
                    y: usize::try_from(y).ok()?,
                    cell: Cell::Block,
                })
            })
            .collect();
        for event in &events {
            self.emit(event);
        }
        true
    }

    #[must_use]
    pub fn row_is_full(&self, row: usize, ignore_barriers: bool) -> Option<bool> {
        self.map.row_is_full(row, ignore_barriers)
    }

    pub fn clear_row(&mut self, row: usize) -> bool {
        let before = self.map.bucket_contents();
        if !self.map.clear_row(row) {
            return false;
        }
        self.emit_bucket_diff(&before);
        true
    }

    pub fn shift_rows(&mut self, from: usize, to: usize) -> bool {
        let before = self.map.bucket_contents();
        if !self.map.shift_rows(from, to) {
            return false;
        }
        self.emit_bucket_diff(&before);
        true
    }

    /// Collapses full rows and emits one `RowDeleted` per clearance, followed by a
    /// `CellChanged` for every bucket cell whose content moved or vanished.
    ///
    /// See [`GridMap::collapse_full_rows`].
    pub fn collapse_full_rows(&mut self, start_row: usize, ignore_barriers: bool) -> Vec<usize> {
        let before = self.map.bucket_contents();
        let cleared = self.map.collapse_full_rows(start_row, ignore_barriers);
        if cleared.is_empty() {
            return cleared;
        }
        for &row in &cleared {
            log::trace!("row {row} deleted");
            self.emit(&GridEvent::RowDeleted { row });
        }
        self.emit_bucket_diff(&before);
        cleared
    }

    /// Collapses full rows with the topology's start row and barrier policy.
    pub fn collapse_with_policy(&mut self) -> Vec<usize> {
        let topology = self.map.topology();
        let start_row = topology.collapse_start_row();
        let ignore_barriers = topology.collapse_policy().ignore_barriers;
        self.collapse_full_rows(start_row, ignore_barriers)
    }

    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate_left(&mut self) {
        self.rotate(RotationDirection::Left);
    }

    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate_right(&mut self) {
        self.rotate(RotationDirection::Right);
    }

    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate(&mut self, direction: RotationDirection) {
        self.map.rotate(direction);
        log::trace!(
            "grid rotated {direction}, rotation count {}",
            self.map.rotation_count()
        );
        self.emit(&GridEvent::GridRotated { direction });
    }

    /// Flips the bucket contents, then emits `BucketContentsRotated` and the cell diff.
    pub fn rotate_bucket_contents_180(&mut self) {
        let before = self.map.bucket_contents();
        self.map.rotate_bucket_contents_180();
        self.emit(&GridEvent::BucketContentsRotated);
        self.emit_bucket_diff(&before);
    }
}
