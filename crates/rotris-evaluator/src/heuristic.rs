//! Interchangeable placement heuristics.
//!
//! Every heuristic implements [`PlacementHeuristic`] and maps a [`PlacementContext`] to a
//! score where higher is better. Heuristics are pure: they read the grid before
//! placement and the resting piece cells, and never modify anything.
//!
//! Heuristics are selected by [`HeuristicKind`], which is what configuration files and
//! the command line name:
//!
//! ```
//! use rotris_evaluator::HeuristicKind;
//!
//! let kind: HeuristicKind = "mean-height-gaps".parse().unwrap();
//! assert_eq!(kind, HeuristicKind::MeanHeightGaps);
//! assert_eq!(kind.build().id(), "mean-height-gaps");
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::placement_context::PlacementContext;

/// Weight of one enclosed empty cell in [`MeanHeightGaps`].
pub const GAP_PENALTY: f32 = 2.0;

pub trait PlacementHeuristic: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &str;
    #[must_use]
    fn name(&self) -> &str;
    #[must_use]
    fn clone_boxed(&self) -> BoxedPlacementHeuristic;
    /// Scores one resting placement (higher is better).
    #[must_use]
    fn score(&self, context: &PlacementContext) -> f32;
}

pub type BoxedPlacementHeuristic = Box<dyn PlacementHeuristic>;

impl Clone for BoxedPlacementHeuristic {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl PlacementHeuristic for BoxedPlacementHeuristic {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        self.as_ref().clone_boxed()
    }

    fn score(&self, context: &PlacementContext) -> f32 {
        self.as_ref().score(context)
    }
}

/// Configuration name of a heuristic.
///
/// Serialized, parsed and displayed in kebab-case (`"neighbor-adjacency-no-walls"`).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    #[display("mean-row-height")]
    MeanRowHeight,
    #[display("distance-to-bottom")]
    DistanceToBottom,
    #[display("unique-row-mean")]
    UniqueRowMean,
    #[display("neighbor-adjacency")]
    NeighborAdjacency,
    #[display("weighted-bottom")]
    WeightedBottom,
    #[default]
    #[display("mean-height-gaps")]
    MeanHeightGaps,
    #[display("surface-offset")]
    SurfaceOffset,
    #[display("neighbor-adjacency-no-walls")]
    NeighborAdjacencyNoWalls,
}

impl HeuristicKind {
    pub const ALL: [Self; 8] = [
        Self::MeanRowHeight,
        Self::DistanceToBottom,
        Self::UniqueRowMean,
        Self::NeighborAdjacency,
        Self::WeightedBottom,
        Self::MeanHeightGaps,
        Self::SurfaceOffset,
        Self::NeighborAdjacencyNoWalls,
    ];

    #[must_use]
    pub fn build(self) -> BoxedPlacementHeuristic {
        match self {
            Self::MeanRowHeight => Box::new(MeanRowHeight),
            Self::DistanceToBottom => Box::new(DistanceToBottom),
            Self::UniqueRowMean => Box::new(UniqueRowMean),
            Self::NeighborAdjacency => Box::new(NeighborAdjacency),
            Self::WeightedBottom => Box::new(WeightedBottom),
            Self::MeanHeightGaps => Box::new(MeanHeightGaps),
            Self::SurfaceOffset => Box::new(SurfaceOffset),
            Self::NeighborAdjacencyNoWalls => Box::new(NeighborAdjacencyNoWalls),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown heuristic {name:?}")]
pub struct ParseHeuristicKindError {
    name: String,
}

impl FromStr for HeuristicKind {
    type Err = ParseHeuristicKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| ParseHeuristicKindError { name: s.to_owned() })
    }
}

/// Mean row index of the piece cells.
///
/// Rows are counted from the top, so a piece resting lower scores higher.
#[derive(Debug, Clone)]
pub struct MeanRowHeight;

impl PlacementHeuristic for MeanRowHeight {
    fn id(&self) -> &'static str {
        "mean-row-height"
    }
    fn name(&self) -> &'static str {
        "Mean Row Height"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        context.mean_row()
    }
}

/// Negated number of rows between the lowest piece cell and the bucket floor.
///
/// A piece touching the floor scores `0.0`.
#[derive(Debug, Clone)]
pub struct DistanceToBottom;

impl PlacementHeuristic for DistanceToBottom {
    fn id(&self) -> &'static str {
        "distance-to-bottom"
    }
    fn name(&self) -> &'static str {
        "Distance to Bottom"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        let floor = context.bucket_height() - 1.0;
        -(floor - context.lowest_row() as f32)
    }
}

/// Mean of the distinct rows the piece occupies.
///
/// Unlike [`MeanRowHeight`], a row counts once however many cells the piece puts in it,
/// so flat and tall orientations are compared by their vertical extent alone.
#[derive(Debug, Clone)]
pub struct UniqueRowMean;

impl PlacementHeuristic for UniqueRowMean {
    fn id(&self) -> &'static str {
        "unique-row-mean"
    }
    fn name(&self) -> &'static str {
        "Unique Row Mean"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        let rows = context.distinct_rows();
        let sum: i32 = rows.iter().sum();
        sum as f32 / rows.len() as f32
    }
}

/// Number of piece cell sides touching something solid.
///
/// Settled blocks, barriers, the bucket walls and the floor all count.
#[derive(Debug, Clone)]
pub struct NeighborAdjacency;

impl PlacementHeuristic for NeighborAdjacency {
    fn id(&self) -> &'static str {
        "neighbor-adjacency"
    }
    fn name(&self) -> &'static str {
        "Neighbor Adjacency"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        context.solid_neighbors(true) as f32
    }
}

/// Sum over piece cells of `((row + 1) / bucket_height)²`.
///
/// Each cell contributes between `0` and `1`, growing quadratically toward the floor.
#[derive(Debug, Clone)]
pub struct WeightedBottom;

impl PlacementHeuristic for WeightedBottom {
    fn id(&self) -> &'static str {
        "weighted-bottom"
    }
    fn name(&self) -> &'static str {
        "Weighted Bottom"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        let height = context.bucket_height();
        context
            .cells()
            .iter()
            .map(|&(_, y)| ((y + 1) as f32 / height).powi(2))
            .sum()
    }
}

/// Mean row index minus [`GAP_PENALTY`] for every empty cell left enclosed below the
/// piece.
#[derive(Debug, Clone)]
pub struct MeanHeightGaps;

impl PlacementHeuristic for MeanHeightGaps {
    fn id(&self) -> &'static str {
        "mean-height-gaps"
    }
    fn name(&self) -> &'static str {
        "Mean Height and Gaps"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        let gaps: usize = context.column_gaps().map(|(_, gap)| gap).sum();
        context.mean_row() - GAP_PENALTY * gaps as f32
    }
}

/// How well the landed piece lines up with the surface profile around it.
///
/// Two mismatches are counted, one cell each: open cells left between the piece's lower
/// silhouette and the surface below it, and steps between the new surface heights of
/// neighbouring columns, from one column left of the piece to one column right. Unlike
/// [`MeanHeightGaps`], a flat shelf beats a deeper well. Depth only breaks ties:
/// `mean_row / bucket_height` is always below one cell of mismatch.
#[derive(Debug, Clone)]
pub struct SurfaceOffset;

impl PlacementHeuristic for SurfaceOffset {
    fn id(&self) -> &'static str {
        "surface-offset"
    }
    fn name(&self) -> &'static str {
        "Surface Offset"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        let gaps: usize = context.column_gaps().map(|(_, gap)| gap).sum();
        let mismatch = gaps as f32 + context.surface_roughness() as f32;
        -mismatch + context.mean_row() / context.bucket_height()
    }
}

/// Like [`NeighborAdjacency`], but bucket walls and the floor do not count.
#[derive(Debug, Clone)]
pub struct NeighborAdjacencyNoWalls;

impl PlacementHeuristic for NeighborAdjacencyNoWalls {
    fn id(&self) -> &'static str {
        "neighbor-adjacency-no-walls"
    }
    fn name(&self) -> &'static str {
        "Neighbor Adjacency without Walls"
    }
    fn clone_boxed(&self) -> BoxedPlacementHeuristic {
        Box::new(self.clone())
    }
    fn score(&self, context: &PlacementContext) -> f32 {
        context.solid_neighbors(false) as f32
    }
}
