//! The live grid owner and the collaborators around it.
//!
//! - [`GridMapEngine`] - Single owner of the live [`GridMap`](crate::GridMap), emitting
//!   notifications for every mutation
//! - [`GridEvent`] / [`GridObserver`] - Fire-and-forget notifications for renderers and
//!   telemetry
//! - [`PieceGenerator`] - Seedable piece source for game loops
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rotris_engine::{GridMapEngine, PieceGenerator, PieceShape, Topology, TopologyConfig};
//!
//! let topology = Arc::new(Topology::new(TopologyConfig::framed(6, 8)).unwrap());
//! let mut engine = GridMapEngine::new(topology);
//! let bar = PieceShape::new("I3", &[(0, 0), (1, 0), (2, 0)], (1, 0)).unwrap();
//! let mut generator = PieceGenerator::with_seed(vec![bar], 1).unwrap();
//!
//! let shape = generator.pop_next().clone();
//! let spawn = shape.spawn_placement(engine.map().bucket_width());
//! let distance = engine.drop_distance(&shape, spawn).unwrap();
//! let mut resting = spawn;
//! for _ in 0..distance {
//!     resting = resting.down();
//! }
//! assert!(engine.settle_piece(&shape, resting));
//! assert!(engine.collapse_with_policy().is_empty());
//! ```

pub use self::{event::*, grid_engine::*, piece_generator::*};

mod event;
mod grid_engine;
mod piece_generator;
