//! Placement search for falling-block games on arbitrary grid topologies.
//!
//! The crate has three layers:
//!
//! 1. **Placement scoring** ([`heuristic`]) - A [`PlacementHeuristic`] assigns a score to
//!    one resting placement, looking at the grid before the piece lands.
//! 2. **Best-fit search** ([`search`], [`dispatcher`]) - Enumerates every reachable
//!    placement for the board's topology class, keeps the best one, and turns it into a
//!    [`MotionQueue`].
//! 3. **Autoplay** ([`autoplay`]) - A small game loop that spawns pieces, drains motion
//!    queues into a [`GridMapEngine`](rotris_engine::GridMapEngine) and collapses rows.
//!
//! ```text
//! Autoplay (spawn, apply motions, settle, collapse)
//!     ↓ uses
//! Dispatcher (strategy per topology class)
//!     ↓ uses
//! PlacementHeuristic (score single placement)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rotris_engine::{GridMap, PieceShape, Topology, TopologyConfig};
//! use rotris_evaluator::{Dispatcher, HeuristicKind, Motion};
//!
//! let topology = Arc::new(Topology::new(TopologyConfig::framed(6, 4)).unwrap());
//! let map = GridMap::new(topology);
//! let bar = PieceShape::new("I2", &[(0, 0), (1, 0)], (0, 0)).unwrap();
//! let spawn = bar.spawn_placement(map.bucket_width());
//!
//! let dispatcher = Dispatcher::new(HeuristicKind::MeanRowHeight.build());
//! let fit = dispatcher.best_fit(&map, &bar, spawn);
//! assert!(fit.is_found());
//! let motions: Vec<_> = fit.into_motions().collect();
//! assert_eq!(motions.last(), Some(&Motion::MoveDown));
//! ```

pub use self::{
    autoplay::*, dispatcher::*, heuristic::*, motion::*, placement_context::*, search::*,
};

pub mod autoplay;
pub mod dispatcher;
pub mod heuristic;
pub mod motion;
pub mod placement_context;
pub mod search;
