//! Discrete motion commands and the queue the search hands to the game loop.

use std::collections::VecDeque;

use rotris_engine::{GridMapEngine, PiecePlacement, PieceShape, Rotation, RotationDirection};

use crate::search::Candidate;

/// One command consumed per game tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Motion {
    #[display("rotate piece right")]
    RotatePieceRight,
    #[display("rotate piece left")]
    RotatePieceLeft,
    #[display("rotate bucket right")]
    RotateBucketRight,
    #[display("rotate bucket left")]
    RotateBucketLeft,
    #[display("move left")]
    MoveLeft,
    #[display("move right")]
    MoveRight,
    #[display("move down")]
    MoveDown,
}

impl Motion {
    /// Applies the command to the live grid and the falling piece.
    ///
    /// Piece commands move `placement` only when the result stays contained. Bucket
    /// commands turn the whole grid and are refused on topologies whose bucket does not
    /// rotate. Returns `false` when the command was refused.
    pub fn apply(
        self,
        engine: &mut GridMapEngine,
        shape: &PieceShape,
        placement: &mut PiecePlacement,
    ) -> bool {
        let next = match self {
            Self::RotateBucketRight | Self::RotateBucketLeft => {
                if !engine.topology().bucket_rotates() {
                    return false;
                }
                engine.rotate(if self.is_rotate_bucket_right() {
                    RotationDirection::Right
                } else {
                    RotationDirection::Left
                });
                return true;
            }
            Self::RotatePieceRight => placement.rotated_right(),
            Self::RotatePieceLeft => placement.rotated_left(),
            Self::MoveLeft => placement.left(),
            Self::MoveRight => placement.right(),
            Self::MoveDown => placement.down(),
        };
        if !engine.is_contained(shape, next) {
            return false;
        }
        *placement = next;
        true
    }
}

/// Direction and number of quarter turns on the shortest path from `from` to `to`.
///
/// A half turn is reached clockwise.
#[must_use]
pub fn shortest_turn(from: Rotation, to: Rotation) -> (RotationDirection, u8) {
    match from.clockwise_steps_to(to) {
        steps @ 0..=2 => (RotationDirection::Right, steps),
        steps => (RotationDirection::Left, 4 - steps),
    }
}

/// Ordered motion commands, drained front to back.
///
/// A queue is produced fresh for every search and cannot be rewound.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MotionQueue {
    motions: VecDeque<Motion>,
}

impl MotionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands that bring a piece from `current` to the candidate's resting placement.
    ///
    /// Bucket turns come first, then piece rotations, then horizontal moves at the
    /// current row, then the drop.
    #[must_use]
    pub fn plan(current: PiecePlacement, candidate: &Candidate) -> Self {
        let mut queue = Self::new();

        let (direction, steps) =
            shortest_turn(Rotation::default(), Rotation::new(candidate.bucket_turns()));
        let bucket_motion = match direction {
            RotationDirection::Right => Motion::RotateBucketRight,
            RotationDirection::Left => Motion::RotateBucketLeft,
        };
        queue.push_repeated(bucket_motion, steps.into());

        let (direction, steps) = shortest_turn(current.rotation(), candidate.rotation());
        let piece_motion = match direction {
            RotationDirection::Right => Motion::RotatePieceRight,
            RotationDirection::Left => Motion::RotatePieceLeft,
        };
        queue.push_repeated(piece_motion, steps.into());

        let horizontal = if candidate.offset() < 0 {
            Motion::MoveLeft
        } else {
            Motion::MoveRight
        };
        queue.push_repeated(horizontal, candidate.offset().unsigned_abs());

        for _ in 0..candidate.drop_distance() {
            queue.push(Motion::MoveDown);
        }
        queue
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.motions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    pub fn pop_next(&mut self) -> Option<Motion> {
        self.motions.pop_front()
    }

    pub fn push(&mut self, motion: Motion) {
        self.motions.push_back(motion);
    }

    fn push_repeated(&mut self, motion: Motion, count: u32) {
        for _ in 0..count {
            self.push(motion);
        }
    }
}

impl Iterator for MotionQueue {
    type Item = Motion;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl FromIterator<Motion> for MotionQueue {
    fn from_iter<T: IntoIterator<Item = Motion>>(iter: T) -> Self {
        Self {
            motions: iter.into_iter().collect(),
        }
    }
}
