use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of cells in one piece shape.
pub const MAX_PIECE_CELLS: usize = 16;

/// Rotation state of a piece, in clockwise quarter turns from its configured shape.
///
/// - `0`: as configured
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rotation(u8);

impl Rotation {
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    /// Number of clockwise quarter turns needed to go from `self` to `target`.
    #[must_use]
    pub const fn clockwise_steps_to(self, target: Self) -> u8 {
        (target.0 + 4 - self.0) % 4
    }
}

/// Position and orientation of a piece's pivot, in bucket-local coordinates.
///
/// Placements are plain values: moving or rotating returns a new placement and never
/// consults the grid. Whether a placement is legal is decided by
/// [`GridMap::is_contained`](super::grid_map::GridMap::is_contained).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PiecePlacement {
    rotation: Rotation,
    x: i32,
    y: i32,
}

impl PiecePlacement {
    #[must_use]
    pub const fn new(rotation: Rotation, x: i32, y: i32) -> Self {
        Self { rotation, x, y }
    }

    #[must_use]
    pub fn rotation(self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn left(self) -> Self {
        Self {
            x: self.x - 1,
            ..self
        }
    }

    #[must_use]
    pub fn right(self) -> Self {
        Self {
            x: self.x + 1,
            ..self
        }
    }

    #[must_use]
    pub fn down(self) -> Self {
        Self {
            y: self.y + 1,
            ..self
        }
    }

    #[must_use]
    pub fn shifted_x(self, dx: i32) -> Self {
        Self {
            x: self.x + dx,
            ..self
        }
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..self
        }
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        Self {
            rotation: self.rotation.rotated_left(),
            ..self
        }
    }

    #[must_use]
    pub fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PieceShapeError {
    #[display("piece shape {name:?} has no cells")]
    NoCells { name: String },
    #[display("piece shape {name:?} has {count} cells, at most {MAX_PIECE_CELLS} are allowed")]
    TooManyCells { name: String, count: usize },
    #[display("piece shape {name:?} lists cell ({x}, {y}) twice")]
    DuplicateCell { name: String, x: i32, y: i32 },
}

/// Serialized form of a [`PieceShape`]: cell coordinates plus the pivot cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PieceShapeConfig {
    name: String,
    cells: Vec<[i32; 2]>,
    #[serde(default)]
    pivot: [i32; 2],
}

/// A piece shape: a small set of cells rotating around a pivot.
///
/// Cells are stored as offsets from the pivot. Rotating clockwise maps an offset
/// `(dx, dy)` to `(-dy, dx)` (y grows toward the bucket floor).
///
/// # Example
///
/// ```
/// use rotris_engine::{PieceShape, Rotation};
///
/// // An L tromino pivoting on its corner.
/// let shape = PieceShape::new("L3", &[(0, 0), (1, 0), (0, 1)], (0, 0)).unwrap();
/// let cells: Vec<_> = shape.offsets(Rotation::new(1)).collect();
/// assert_eq!(cells, vec![(0, 0), (0, 1), (-1, 0)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceShapeConfig", into = "PieceShapeConfig")]
pub struct PieceShape {
    name: String,
    offsets: ArrayVec<(i32, i32), MAX_PIECE_CELLS>,
}

impl TryFrom<PieceShapeConfig> for PieceShape {
    type Error = PieceShapeError;

    fn try_from(config: PieceShapeConfig) -> Result<Self, Self::Error> {
        let cells = config
            .cells
            .iter()
            .map(|&[x, y]| (x, y))
            .collect::<Vec<_>>();
        let [px, py] = config.pivot;
        Self::new(config.name, &cells, (px, py))
    }
}

impl From<PieceShape> for PieceShapeConfig {
    fn from(shape: PieceShape) -> Self {
        Self {
            name: shape.name,
            cells: shape.offsets.iter().map(|&(dx, dy)| [dx, dy]).collect(),
            pivot: [0, 0],
        }
    }
}

fn rotate_offset((dx, dy): (i32, i32), rotation: Rotation) -> (i32, i32) {
    match rotation.quarter_turns() {
        0 => (dx, dy),
        1 => (-dy, dx),
        2 => (-dx, -dy),
        _ => (dy, -dx),
    }
}

impl PieceShape {
    pub fn new(
        name: impl Into<String>,
        cells: &[(i32, i32)],
        pivot: (i32, i32),
    ) -> Result<Self, PieceShapeError> {
        let name = name.into();
        if cells.is_empty() {
            return Err(PieceShapeError::NoCells { name });
        }
        if cells.len() > MAX_PIECE_CELLS {
            return Err(PieceShapeError::TooManyCells {
                name,
                count: cells.len(),
            });
        }
        let mut offsets = ArrayVec::new();
        for &(x, y) in cells {
            let offset = (x - pivot.0, y - pivot.1);
            if offsets.contains(&offset) {
                return Err(PieceShapeError::DuplicateCell { name, x, y });
            }
            offsets.push(offset);
        }
        Ok(Self { name, offsets })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.offsets.len()
    }

    /// Cell offsets from the pivot after applying `rotation`.
    pub fn offsets(&self, rotation: Rotation) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets
            .iter()
            .map(move |&offset| rotate_offset(offset, rotation))
    }

    /// Bucket-local cells covered by the piece at `placement`.
    pub fn cells_at(&self, placement: PiecePlacement) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.offsets(placement.rotation())
            .map(move |(dx, dy)| (placement.x() + dx, placement.y() + dy))
    }

    /// Bounding box of the rotated offsets as `(min_dx, min_dy, max_dx, max_dy)`.
    #[must_use]
    pub fn bounds(&self, rotation: Rotation) -> (i32, i32, i32, i32) {
        self.offsets(rotation).fold(
            (i32::MAX, i32::MAX, i32::MIN, i32::MIN),
            |(min_x, min_y, max_x, max_y), (dx, dy)| {
                (min_x.min(dx), min_y.min(dy), max_x.max(dx), max_y.max(dy))
            },
        )
    }

    /// Placement a fresh piece enters with: unrotated, horizontally centered, its top
    /// cell on bucket row 0.
    #[must_use]
    pub fn spawn_placement(&self, bucket_width: usize) -> PiecePlacement {
        let (min_dx, min_dy, max_dx, _) = self.bounds(Rotation::default());
        let width = max_dx - min_dx + 1;
        let bucket_width = i32::try_from(bucket_width).unwrap_or(i32::MAX);
        let left = (bucket_width - width).max(0) / 2;
        PiecePlacement::new(Rotation::default(), left - min_dx, -min_dy)
    }

    /// Rotations that produce distinct cell patterns, in ascending order.
    ///
    /// A rotation whose pattern equals an earlier one up to translation is dropped, so
    /// an O tetromino yields only `[0]` and an I tetromino `[0, 1]`.
    #[must_use]
    pub fn distinct_rotations(&self) -> ArrayVec<Rotation, 4> {
        let mut seen: ArrayVec<ArrayVec<(i32, i32), MAX_PIECE_CELLS>, 4> = ArrayVec::new();
        let mut rotations = ArrayVec::new();
        for rotation in Rotation::ALL {
            let pattern = self.normalized_pattern(rotation);
            if !seen.contains(&pattern) {
                seen.push(pattern);
                rotations.push(rotation);
            }
        }
        rotations
    }

    fn normalized_pattern(&self, rotation: Rotation) -> ArrayVec<(i32, i32), MAX_PIECE_CELLS> {
        let (min_dx, min_dy, _, _) = self.bounds(rotation);
        let mut pattern = self
            .offsets(rotation)
            .map(|(dx, dy)| (dx - min_dx, dy - min_dy))
            .collect::<ArrayVec<_, MAX_PIECE_CELLS>>();
        pattern.sort_unstable();
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t_piece() -> PieceShape {
        PieceShape::new("T", &[(0, 0), (1, 0), (2, 0), (1, 1)], (1, 0)).unwrap()
    }

    #[test]
    fn test_rotation_wraps() {
        let r = Rotation::new(3);
        assert_eq!(r.rotated_right(), Rotation::new(0));
        assert_eq!(Rotation::new(0).rotated_left(), r);
        assert_eq!(Rotation::new(5), Rotation::new(1));
    }

    #[test]
    fn test_clockwise_steps() {
        assert_eq!(Rotation::new(0).clockwise_steps_to(Rotation::new(3)), 3);
        assert_eq!(Rotation::new(3).clockwise_steps_to(Rotation::new(0)), 1);
        assert_eq!(Rotation::new(2).clockwise_steps_to(Rotation::new(2)), 0);
    }

    #[test]
    fn test_offsets_are_relative_to_pivot() {
        let shape = t_piece();
        let cells: Vec<_> = shape.offsets(Rotation::default()).collect();
        assert_eq!(cells, vec![(-1, 0), (0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        let shape = t_piece();
        let start: Vec<_> = shape.offsets(Rotation::default()).collect();
        let mut rotation = Rotation::default();
        for _ in 0..4 {
            rotation = rotation.rotated_right();
        }
        assert_eq!(shape.offsets(rotation).collect::<Vec<_>>(), start);
    }

    #[test]
    fn test_spawn_placement_is_centered_at_top() {
        let shape = t_piece();
        let spawn = shape.spawn_placement(10);
        let cells: Vec<_> = shape.cells_at(spawn).collect();
        assert_eq!(cells, vec![(3, 0), (4, 0), (5, 0), (4, 1)]);
    }

    #[test]
    fn test_distinct_rotations() {
        let o = PieceShape::new("O", &[(0, 0), (1, 0), (0, 1), (1, 1)], (0, 0)).unwrap();
        assert_eq!(o.distinct_rotations().as_slice(), &[Rotation::new(0)]);

        let i = PieceShape::new("I", &[(0, 0), (1, 0), (2, 0), (3, 0)], (1, 0)).unwrap();
        assert_eq!(
            i.distinct_rotations().as_slice(),
            &[Rotation::new(0), Rotation::new(1)]
        );

        assert_eq!(t_piece().distinct_rotations().len(), 4);
    }

    #[test]
    fn test_invalid_shapes_are_rejected() {
        assert!(matches!(
            PieceShape::new("empty", &[], (0, 0)),
            Err(PieceShapeError::NoCells { .. })
        ));
        assert!(matches!(
            PieceShape::new("dup", &[(0, 0), (0, 0)], (0, 0)),
            Err(PieceShapeError::DuplicateCell { x: 0, y: 0, .. })
        ));
        let many: Vec<_> = (0..17).map(|x| (x, 0)).collect();
        assert!(matches!(
            PieceShape::new("long", &many, (0, 0)),
            Err(PieceShapeError::TooManyCells { count: 17, .. })
        ));
    }

    #[test]
    fn test_shape_deserialization() {
        let json = r#"{ "name": "S", "cells": [[1, 0], [2, 0], [0, 1], [1, 1]], "pivot": [1, 1] }"#;
        let shape: PieceShape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.name(), "S");
        assert_eq!(
            shape.offsets(Rotation::default()).collect::<Vec<_>>(),
            vec![(0, -1), (1, -1), (-1, 0), (0, 0)]
        );

        let bad = r#"{ "name": "X", "cells": [] }"#;
        assert!(serde_json::from_str::<PieceShape>(bad).is_err());
    }
}
