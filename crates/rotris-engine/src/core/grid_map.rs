use std::{fmt, sync::Arc};

use super::{
    piece::{PiecePlacement, PieceShape},
    topology::Topology,
};

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::IsVariant)]
#[repr(u8)]
pub enum Cell {
    /// Empty, playable bucket cell.
    #[default]
    Interior,
    /// Board cell outside the playable area.
    Exterior,
    /// Fixed obstruction. Never cleared, never moved.
    Barrier,
    /// Board-edge obstruction; behaves like [`Cell::Barrier`] but is not drawn.
    InvisibleBarrier,
    /// Cell of a settled piece.
    Block,
}

impl Cell {
    #[must_use]
    pub fn is_any_barrier(self) -> bool {
        matches!(self, Cell::Barrier | Cell::InvisibleBarrier)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Interior => '.',
            Cell::Exterior => ' ',
            Cell::Barrier => '#',
            Cell::InvisibleBarrier => ':',
            Cell::Block => '@',
        }
    }

    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Cell::Interior),
            ' ' => Some(Cell::Exterior),
            '#' => Some(Cell::Barrier),
            ':' => Some(Cell::InvisibleBarrier),
            '@' => Some(Cell::Block),
            _ => None,
        }
    }
}

/// Direction of a whole-grid quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RotationDirection {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

/// A detached copy of the bucket region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketContents {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl BucketContents {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// The same contents turned by two quarter turns.
    #[must_use]
    pub fn rotated_180(&self) -> Self {
        let mut cells = self.cells.clone();
        cells.reverse();
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }
}

/// The full-board cell grid for one game session.
///
/// Coordinates used by the public methods are bucket-local: `(0, 0)` is the top-left
/// bucket cell and `y` grows toward the bucket floor. Out-of-range coordinates are
/// answered with `None` / `false`, never a panic, because search code tries
/// positions speculatively.
///
/// `GridMap` is a plain value. The [`GridMapEngine`](crate::GridMapEngine) owns the
/// live instance and adds change notifications; search code works on `&GridMap`
/// views or clones.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rotris_engine::{Cell, GridMap, Topology, TopologyConfig};
///
/// let topology = Arc::new(Topology::new(TopologyConfig::framed(4, 3)).unwrap());
/// let mut map = GridMap::new(topology);
/// map.set_cell(0, 2, Cell::Block);
/// assert_eq!(map.bucket_dump(), "....\n....\n@...\n");
/// assert_eq!(map.cell_at(9, 9), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    topology: Arc<Topology>,
    cells: Vec<Cell>,
    rotation: i32,
}

impl GridMap {
    #[must_use]
    pub fn new(topology: Arc<Topology>) -> Self {
        let cells = populate(&topology);
        Self {
            topology,
            cells,
            rotation: 0,
        }
    }

    /// Re-derives every cell from the topology and zeroes the rotation counter.
    pub fn reset(&mut self) {
        self.cells = populate(&self.topology);
        self.rotation = 0;
    }

    /// Builds a grid whose bucket rows are given as glyphs (see [`Cell::from_char`]).
    ///
    /// The last line is the bucket floor; missing rows above are left empty. Blank
    /// lines are ignored. Intended for tests and fixtures.
    ///
    /// # Panics
    ///
    /// Panics if a line is not exactly bucket-width glyphs long, contains an unknown
    /// glyph, or there are more lines than bucket rows.
    #[must_use]
    pub fn from_ascii(topology: Arc<Topology>, art: &str) -> Self {
        let mut map = Self::new(topology);
        let (width, height) = (map.bucket_width(), map.bucket_height());
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(
            lines.len() <= height,
            "got {} rows for a bucket of height {height}",
            lines.len()
        );
        let top = height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<Cell> = line
                .chars()
                .map(|ch| Cell::from_char(ch).unwrap_or_else(|| panic!("unknown glyph {ch:?}")))
                .collect();
            assert_eq!(
                cells.len(),
                width,
                "each row must have exactly {width} cells, got {} at row {i}",
                cells.len()
            );
            for (x, cell) in cells.into_iter().enumerate() {
                *map.bucket_cell_mut(x, top + i) = cell;
            }
        }
        map
    }

    #[must_use]
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    #[must_use]
    pub fn board_width(&self) -> usize {
        self.topology.board_width()
    }

    #[must_use]
    pub fn board_height(&self) -> usize {
        self.topology.board_height()
    }

    #[must_use]
    pub fn bucket_width(&self) -> usize {
        self.topology.bucket().width
    }

    #[must_use]
    pub fn bucket_height(&self) -> usize {
        self.topology.bucket().height
    }

    /// Cumulative quarter turns applied since the last reset (right = +1, left = -1).
    #[must_use]
    pub fn rotation_count(&self) -> i32 {
        self.rotation
    }

    /// The rotation counter reduced to `0..4`.
    #[must_use]
    pub fn quarter_turns(&self) -> u8 {
        u8::try_from(self.rotation.rem_euclid(4)).unwrap_or_default()
    }

    /// Cell at board-absolute coordinates.
    #[must_use]
    pub fn board_cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.board_width() && y < self.board_height())
            .then(|| self.cells[y * self.board_width() + x])
    }

    pub fn board_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.board_width())
    }

    fn bucket_index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.bucket_width() || y >= self.bucket_height() {
            return None;
        }
        let bucket = self.topology.bucket();
        Some((bucket.y + y) * self.board_width() + bucket.x + x)
    }

    fn bucket_cell(&self, x: usize, y: usize) -> Cell {
        let bucket = self.topology.bucket();
        self.cells[(bucket.y + y) * self.board_width() + bucket.x + x]
    }

    fn bucket_cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        let bucket = self.topology.bucket();
        let width = self.board_width();
        &mut self.cells[(bucket.y + y) * width + bucket.x + x]
    }

    /// Cell at bucket-local coordinates, or `None` outside the bucket.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        self.bucket_index(x, y).map(|i| self.cells[i])
    }

    /// Writes a cell at bucket-local coordinates and returns the previous state.
    ///
    /// Returns `None`, leaving the grid untouched, outside the bucket.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> Option<Cell> {
        let i = self.bucket_index(x, y)?;
        Some(std::mem::replace(&mut self.cells[i], cell))
    }

    /// Returns `true` when every cell of the piece lies on an empty bucket cell.
    #[must_use]
    pub fn is_contained(&self, shape: &PieceShape, placement: PiecePlacement) -> bool {
        shape
            .cells_at(placement)
            .all(|(x, y)| self.cell_at(x, y).is_some_and(|cell| cell.is_interior()))
    }

    /// Rows a contained piece can fall before it hits a block, a barrier or the floor.
    ///
    /// Returns `None` if the piece is not contained to begin with.
    #[must_use]
    pub fn drop_distance(&self, shape: &PieceShape, placement: PiecePlacement) -> Option<usize> {
        if !self.is_contained(shape, placement) {
            return None;
        }
        let mut distance = 0;
        let mut current = placement;
        while self.is_contained(shape, current.down()) {
            current = current.down();
            distance += 1;
        }
        Some(distance)
    }

    /// Stamps the piece into the grid as [`Cell::Block`] cells.
    ///
    /// Returns `false`, leaving the grid untouched, if the piece is not contained.
    pub fn settle_piece(&mut self, shape: &PieceShape, placement: PiecePlacement) -> bool {
        if !self.is_contained(shape, placement) {
            return false;
        }
        for (x, y) in shape.cells_at(placement) {
            self.set_cell(x, y, Cell::Block);
        }
        true
    }

    /// Whether bucket row `row` can be cleared.
    ///
    /// With `ignore_barriers == false` every cell must be a block, so a single barrier
    /// pins the row forever. With `ignore_barriers == true` barrier cells count as
    /// filled, but at least one block is still required. Returns `None` for a row
    /// outside the bucket.
    #[must_use]
    pub fn row_is_full(&self, row: usize, ignore_barriers: bool) -> Option<bool> {
        if row >= self.bucket_height() {
            return None;
        }
        let mut has_block = false;
        for x in 0..self.bucket_width() {
            match self.bucket_cell(x, row) {
                Cell::Block => has_block = true,
                cell if ignore_barriers && cell.is_any_barrier() => {}
                _ => return Some(false),
            }
        }
        Some(has_block)
    }

    /// Empties every block in bucket row `row`; barriers stay.
    ///
    /// Returns `false` for a row outside the bucket.
    pub fn clear_row(&mut self, row: usize) -> bool {
        if row >= self.bucket_height() {
            return false;
        }
        for x in 0..self.bucket_width() {
            let cell = self.bucket_cell_mut(x, row);
            if cell.is_block() {
                *cell = Cell::Interior;
            }
        }
        true
    }

    /// Moves the cells of bucket rows `from..=to` one row toward the floor, overwriting
    /// row `to + 1`.
    ///
    /// Barriers never move and are never overwritten: a cell whose source or
    /// destination is a barrier is skipped. The cells stacked directly on a barrier
    /// stay where they are, and the cell just below a barrier is vacated. Returns
    /// `false`, leaving the grid untouched, unless `from <= to` and row `to + 1`
    /// exists.
    pub fn shift_rows(&mut self, from: usize, to: usize) -> bool {
        if from > to || to + 1 >= self.bucket_height() {
            return false;
        }
        for x in 0..self.bucket_width() {
            // Whether the cell below the current one stayed in place.
            let mut pinned = false;
            for y in (from..=to).rev() {
                let src = self.bucket_cell(x, y);
                let dst = self.bucket_cell_mut(x, y + 1);
                if src.is_any_barrier() {
                    if !pinned && !dst.is_any_barrier() {
                        *dst = Cell::Interior;
                    }
                    pinned = true;
                    continue;
                }
                if pinned || dst.is_any_barrier() {
                    pinned = true;
                    continue;
                }
                *dst = src;
            }
            if !pinned {
                *self.bucket_cell_mut(x, from) = Cell::Interior;
            }
        }
        true
    }

    /// Clears full rows scanning from `start_row` toward row 0.
    ///
    /// A full row is cleared, everything above it drops by one row and the same row
    /// index is examined again; otherwise the scan moves one row up. Returns the index
    /// of every clearance in order (an index repeats when a cascade refills it).
    /// Returns an empty list when `start_row` lies outside the bucket.
    pub fn collapse_full_rows(&mut self, start_row: usize, ignore_barriers: bool) -> Vec<usize> {
        let mut cleared = vec![];
        if start_row >= self.bucket_height() {
            return cleared;
        }
        let mut row = start_row;
        loop {
            if self.row_is_full(row, ignore_barriers) == Some(true) {
                self.clear_row(row);
                if row > 0 {
                    self.shift_rows(0, row - 1);
                }
                cleared.push(row);
                continue;
            }
            if row == 0 {
                break;
            }
            row -= 1;
        }
        cleared
    }

    /// Collapses full rows with the topology's start row and barrier policy.
    pub fn collapse_with_policy(&mut self) -> Vec<usize> {
        let start_row = self.topology.collapse_start_row();
        let ignore_barriers = self.topology.collapse_policy().ignore_barriers;
        self.collapse_full_rows(start_row, ignore_barriers)
    }

    /// Turns the whole grid a quarter turn counterclockwise.
    ///
    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate_left(&mut self) {
        self.rotate(RotationDirection::Left);
    }

    /// Turns the whole grid a quarter turn clockwise.
    ///
    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate_right(&mut self) {
        self.rotate(RotationDirection::Right);
    }

    /// Turns the whole grid a quarter turn in `direction`.
    ///
    /// # Panics
    ///
    /// Panics if the board is not square.
    pub fn rotate(&mut self, direction: RotationDirection) {
        assert!(
            self.topology.is_square(),
            "cannot rotate a {}x{} board in place",
            self.board_width(),
            self.board_height()
        );
        let n = self.board_width();
        let mut scratch = vec![Cell::default(); self.cells.len()];
        for y in 0..n {
            for x in 0..n {
                scratch[y * n + x] = match direction {
                    RotationDirection::Right => self.cells[(n - 1 - x) * n + y],
                    RotationDirection::Left => self.cells[x * n + (n - 1 - y)],
                };
            }
        }
        self.cells = scratch;
        self.rotation += match direction {
            RotationDirection::Right => 1,
            RotationDirection::Left => -1,
        };
    }

    /// Copy of the bucket region.
    #[must_use]
    pub fn bucket_contents(&self) -> BucketContents {
        let (width, height) = (self.bucket_width(), self.bucket_height());
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(self.bucket_cell(x, y));
            }
        }
        BucketContents {
            width,
            height,
            cells,
        }
    }

    /// Writes `contents` back over the bucket region.
    ///
    /// # Panics
    ///
    /// Panics if the contents do not have exactly the bucket's dimensions.
    pub fn merge_bucket_contents(&mut self, contents: &BucketContents) {
        assert_eq!(
            (contents.width, contents.height),
            (self.bucket_width(), self.bucket_height()),
            "bucket contents dimensions must match the bucket"
        );
        for y in 0..contents.height {
            for x in 0..contents.width {
                *self.bucket_cell_mut(x, y) = contents.cells[y * contents.width + x];
            }
        }
    }

    /// Turns only the bucket contents by 180°, leaving the rest of the board alone.
    pub fn rotate_bucket_contents_180(&mut self) {
        let rotated = self.bucket_contents().rotated_180();
        self.merge_bucket_contents(&rotated);
    }

    /// One glyph per bucket cell, one line per bucket row.
    #[must_use]
    pub fn bucket_dump(&self) -> String {
        let mut out = String::with_capacity((self.bucket_width() + 1) * self.bucket_height());
        for y in 0..self.bucket_height() {
            out.extend((0..self.bucket_width()).map(|x| self.bucket_cell(x, y).as_char()));
            out.push('\n');
        }
        out
    }
}

/// One glyph per board cell, one line per board row.
impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board_rows() {
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn populate(topology: &Topology) -> Vec<Cell> {
    let (width, height) = (topology.board_width(), topology.board_height());
    let bucket = topology.bucket();
    let mut cells = vec![Cell::Exterior; width * height];
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                cells[y * width + x] = Cell::InvisibleBarrier;
            }
        }
    }

    // Visible frame touching the bucket sides and floor; a rotating bucket is framed
    // on all four sides.
    let frame_top = if topology.bucket_rotates() {
        bucket.y.checked_sub(1)
    } else {
        None
    };
    let left = bucket.x.checked_sub(1);
    let right = Some(bucket.x + bucket.width).filter(|&x| x < width);
    let bottom = Some(bucket.y + bucket.height).filter(|&y| y < height);
    let row_span =
        frame_top.unwrap_or(bucket.y)..bottom.map_or(bucket.y + bucket.height, |y| y + 1);
    for y in row_span {
        for x in left.into_iter().chain(right) {
            cells[y * width + x] = Cell::Barrier;
        }
    }
    let col_span = left.unwrap_or(bucket.x)..right.map_or(bucket.x + bucket.width, |x| x + 1);
    for y in frame_top.into_iter().chain(bottom) {
        for x in col_span.clone() {
            cells[y * width + x] = Cell::Barrier;
        }
    }

    for y in bucket.y..bucket.y + bucket.height {
        cells[y * width + bucket.x..][..bucket.width].fill(Cell::Interior);
    }
    for position in topology.barriers() {
        cells[position.y * width + position.x] = Cell::Barrier;
    }
    cells
}
