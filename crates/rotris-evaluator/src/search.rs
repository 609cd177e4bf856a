//! Best-fit search: enumerate reachable placements, score them, keep the best.
//!
//! # Enumeration
//!
//! Candidates are visited in a fixed order, which makes the search deterministic:
//!
//! 1. **Bucket turns** - `0` only for [`SearchStrategy::FixedFrame`]; `0..4` for
//!    [`SearchStrategy::SpinningBucket`], each on a turned copy of the grid. A turn is
//!    usable only if the piece stays contained in every frame on the way (shortest path,
//!    clockwise on ties), since the bucket turns under the falling piece
//! 2. **Piece rotation** - ascending over the shape's distinct rotations, or only the
//!    current rotation when the topology forbids piece rotation
//! 3. **Column offset** - ascending over the columns the piece can slide to from its
//!    current position
//!
//! A rotation is usable only if every orientation on the way to it (shortest path,
//! clockwise on ties) is contained at the current position. Each candidate is dropped to
//! rest and scored by a [`PlacementHeuristic`]. A later candidate replaces the best one
//! only if it scores strictly higher, so ties go to the earliest candidate.
//!
//! # Step-wise search
//!
//! [`BestFitStepper`] evaluates one candidate per [`BestFitStepper::step`] call.
//! [`BestFitStepper::run`] simply steps until done, so the monolithic and step-wise
//! searches always agree. A stepper holds only borrowed inputs and local state; dropping
//! it halfway needs no cleanup.

use std::{borrow::Cow, collections::VecDeque, iter, ops::Range};

use arrayvec::ArrayVec;
use rotris_engine::{
    GridMap, PiecePlacement, PieceShape, Rotation, RotationDirection, TopologyClass,
};

use crate::{
    heuristic::PlacementHeuristic,
    motion::{MotionQueue, shortest_turn},
    placement_context::PlacementContext,
};

/// How the search treats the bucket frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum SearchStrategy {
    /// The bucket never turns during a move. Used by static, semi-rotatable and
    /// three-dimensional boards; the latter are searched on their 2D grid.
    FixedFrame,
    /// The whole grid can be turned before the piece moves.
    SpinningBucket,
}

impl SearchStrategy {
    #[must_use]
    pub fn for_class(class: TopologyClass) -> Self {
        match class {
            TopologyClass::Static
            | TopologyClass::SemiRotatable
            | TopologyClass::ThreeDimensional => Self::FixedFrame,
            TopologyClass::Rotatable => Self::SpinningBucket,
        }
    }

    fn bucket_turns(self) -> Range<u8> {
        match self {
            Self::FixedFrame => 0..1,
            Self::SpinningBucket => 0..4,
        }
    }
}

/// A reachable resting placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    bucket_turns: u8,
    rotation: Rotation,
    offset: i32,
    drop_distance: usize,
    resting: PiecePlacement,
}

impl Candidate {
    /// Clockwise quarter turns of the bucket before the piece moves (`0..4`).
    #[must_use]
    pub fn bucket_turns(&self) -> u8 {
        self.bucket_turns
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Column delta from the piece's current pivot column.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[must_use]
    pub fn drop_distance(&self) -> usize {
        self.drop_distance
    }

    /// Where the piece comes to rest, in the (possibly turned) bucket frame.
    #[must_use]
    pub fn resting(&self) -> PiecePlacement {
        self.resting
    }
}

/// The winning candidate, its score and the commands that realize it.
#[derive(Debug, Clone, PartialEq)]
pub struct FitPlan {
    candidate: Candidate,
    score: f32,
    motions: MotionQueue,
}

impl FitPlan {
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[must_use]
    pub fn motions(&self) -> &MotionQueue {
        &self.motions
    }
}

/// Outcome of a best-fit search.
///
/// `NoPlacement` is the normal result when the bucket has no room for the piece, which
/// happens near game over.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum BestFit {
    Found(FitPlan),
    NoPlacement,
}

impl BestFit {
    #[must_use]
    pub fn plan(&self) -> Option<&FitPlan> {
        match self {
            Self::Found(plan) => Some(plan),
            Self::NoPlacement => None,
        }
    }

    /// The motion queue to drain; empty when no placement was found.
    #[must_use]
    pub fn into_motions(self) -> MotionQueue {
        match self {
            Self::Found(plan) => plan.motions,
            Self::NoPlacement => MotionQueue::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum SearchStep {
    Pending,
    Done(BestFit),
}

#[derive(Debug)]
struct Frame<'a> {
    bucket_turns: u8,
    map: Cow<'a, GridMap>,
}

#[derive(Debug, Clone, Copy)]
struct Seed {
    frame: usize,
    rotation: Rotation,
    offset: i32,
}

/// Incremental best-fit search.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rotris_engine::{GridMap, PieceShape, Topology, TopologyConfig};
/// use rotris_evaluator::{BestFitStepper, HeuristicKind, SearchStep, SearchStrategy};
///
/// let topology = Arc::new(Topology::new(TopologyConfig::framed(5, 5)).unwrap());
/// let map = GridMap::new(topology);
/// let shape = PieceShape::new("I2", &[(0, 0), (1, 0)], (0, 0)).unwrap();
/// let heuristic = HeuristicKind::MeanRowHeight.build();
/// let current = shape.spawn_placement(map.bucket_width());
///
/// let mut stepper =
///     BestFitStepper::new(SearchStrategy::FixedFrame, &heuristic, &map, &shape, current);
/// let mut steps = 1;
/// while let SearchStep::Pending = stepper.step() {
///     steps += 1;
/// }
/// // Four horizontal columns plus five vertical ones.
/// assert_eq!(steps, 9);
/// ```
#[derive(Debug)]
pub struct BestFitStepper<'a> {
    heuristic: &'a dyn PlacementHeuristic,
    shape: &'a PieceShape,
    current: PiecePlacement,
    frames: Vec<Frame<'a>>,
    seeds: VecDeque<Seed>,
    best: Option<(Candidate, f32)>,
}

impl<'a> BestFitStepper<'a> {
    /// Prepares a search for `shape`, currently at `current` on `map`.
    ///
    /// # Panics
    ///
    /// Panics if `strategy` is [`SearchStrategy::SpinningBucket`] and the board is not
    /// square.
    #[must_use]
    pub fn new(
        strategy: SearchStrategy,
        heuristic: &'a dyn PlacementHeuristic,
        map: &'a GridMap,
        shape: &'a PieceShape,
        current: PiecePlacement,
    ) -> Self {
        let frames = frames(strategy, map);
        let seeds = frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| turn_path_clear(&frames, frame.bucket_turns, shape, current))
            .flat_map(|(index, frame)| seeds_in_frame(index, &frame.map, shape, current))
            .collect();
        Self {
            heuristic,
            shape,
            current,
            frames,
            seeds,
            best: None,
        }
    }

    /// Candidates not evaluated yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.seeds.len()
    }

    /// Evaluates the next candidate.
    ///
    /// Returns [`SearchStep::Done`] once every candidate has been evaluated; further
    /// calls keep returning the same result.
    pub fn step(&mut self) -> SearchStep {
        if let Some(seed) = self.seeds.pop_front() {
            self.evaluate(seed);
        }
        if !self.seeds.is_empty() {
            return SearchStep::Pending;
        }
        let result = self.result();
        match &result {
            BestFit::Found(plan) => log::debug!(
                "best fit for {}: {:?} scoring {} ({} motions)",
                self.shape.name(),
                plan.candidate,
                plan.score,
                plan.motions.len()
            ),
            BestFit::NoPlacement => log::debug!("no placement for {}", self.shape.name()),
        }
        SearchStep::Done(result)
    }

    /// Steps until the search is done.
    #[must_use]
    pub fn run(mut self) -> BestFit {
        loop {
            if let SearchStep::Done(result) = self.step() {
                return result;
            }
        }
    }

    fn evaluate(&mut self, seed: Seed) {
        let frame = &self.frames[seed.frame];
        let start = self
            .current
            .with_rotation(seed.rotation)
            .shifted_x(seed.offset);
        let Some(drop_distance) = frame.map.drop_distance(self.shape, start) else {
            return;
        };
        let resting = (0..drop_distance).fold(start, |placement, _| placement.down());
        let score = self
            .heuristic
            .score(&PlacementContext::new(&frame.map, self.shape, resting));
        let candidate = Candidate {
            bucket_turns: frame.bucket_turns,
            rotation: seed.rotation,
            offset: seed.offset,
            drop_distance,
            resting,
        };
        log::trace!("{}: {candidate:?} scores {score}", self.heuristic.id());
        if self.best.is_none_or(|(_, best)| score > best) {
            self.best = Some((candidate, score));
        }
    }

    fn result(&self) -> BestFit {
        match self.best {
            Some((candidate, score)) => BestFit::Found(FitPlan {
                candidate,
                score,
                motions: MotionQueue::plan(self.current, &candidate),
            }),
            None => BestFit::NoPlacement,
        }
    }
}

/// The grid as seen after each bucket turn, each frame one quarter turn right of the
/// previous one. Frame `k` has `bucket_turns == k`.
fn frames(strategy: SearchStrategy, map: &GridMap) -> Vec<Frame<'_>> {
    let mut frames = vec![Frame {
        bucket_turns: 0,
        map: Cow::Borrowed(map),
    }];
    for bucket_turns in strategy.bucket_turns().skip(1) {
        let mut next = GridMap::clone(&frames[frames.len() - 1].map);
        next.rotate_right();
        frames.push(Frame {
            bucket_turns,
            map: Cow::Owned(next),
        });
    }
    frames
}

/// Whether the piece stays contained in every frame the bucket passes through on the
/// way to `bucket_turns`, the target frame included.
fn turn_path_clear(
    frames: &[Frame<'_>],
    bucket_turns: u8,
    shape: &PieceShape,
    current: PiecePlacement,
) -> bool {
    let (direction, steps) = shortest_turn(Rotation::default(), Rotation::new(bucket_turns));
    let mut rotation = Rotation::default();
    (0..steps).all(|_| {
        rotation = match direction {
            RotationDirection::Right => rotation.rotated_right(),
            RotationDirection::Left => rotation.rotated_left(),
        };
        frames[usize::from(rotation.quarter_turns())]
            .map
            .is_contained(shape, current)
    })
}

fn seeds_in_frame(
    frame: usize,
    map: &GridMap,
    shape: &PieceShape,
    current: PiecePlacement,
) -> Vec<Seed> {
    if !map.is_contained(shape, current) {
        return vec![];
    }
    let rotations: ArrayVec<Rotation, 4> = if map.topology().pieces_rotate() {
        shape.distinct_rotations()
    } else {
        iter::once(current.rotation()).collect()
    };

    let mut seeds = vec![];
    for rotation in rotations {
        if !rotation_reachable(map, shape, current, rotation) {
            continue;
        }
        let origin = current.with_rotation(rotation);
        let mut leftmost = 0;
        while map.is_contained(shape, origin.shifted_x(leftmost - 1)) {
            leftmost -= 1;
        }
        let mut rightmost = 0;
        while map.is_contained(shape, origin.shifted_x(rightmost + 1)) {
            rightmost += 1;
        }
        seeds.extend((leftmost..=rightmost).map(|offset| Seed {
            frame,
            rotation,
            offset,
        }));
    }
    seeds
}

/// Whether every orientation between `current` and `target` fits in place.
fn rotation_reachable(
    map: &GridMap,
    shape: &PieceShape,
    current: PiecePlacement,
    target: Rotation,
) -> bool {
    let (direction, steps) = shortest_turn(current.rotation(), target);
    let mut placement = current;
    (0..steps).all(|_| {
        placement = match direction {
            RotationDirection::Right => placement.rotated_right(),
            RotationDirection::Left => placement.rotated_left(),
        };
        map.is_contained(shape, placement)
    })
}
