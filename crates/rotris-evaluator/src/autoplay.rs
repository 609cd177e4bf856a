//! A minimal game loop driven by the dispatcher.
//!
//! [`AutoPlayer`] plays pieces from a [`PieceGenerator`] on a [`GridMapEngine`]:
//!
//! 1. Spawn the next piece; a spawn that collides ends the game
//! 2. Ask the [`Dispatcher`] for the best fit; no placement ends the game
//! 3. Drain the motion queue one command at a time into the engine
//! 4. Settle the piece and collapse full rows with the topology's policy
//! 5. On semi-rotatable boards, flip the bucket contents every `flip_interval` pieces
//!
//! ```
//! use std::sync::Arc;
//! use rotris_engine::{GridMapEngine, PieceGenerator, PieceShape, Topology, TopologyConfig};
//! use rotris_evaluator::{AutoPlayer, AutoplayOptions, Dispatcher, HeuristicKind};
//!
//! let topology = Arc::new(Topology::new(TopologyConfig::framed(4, 6)).unwrap());
//! let mut engine = GridMapEngine::new(topology);
//! let bar = PieceShape::new("I2", &[(0, 0), (1, 0)], (0, 0)).unwrap();
//! let mut generator = PieceGenerator::with_seed(vec![bar], 0).unwrap();
//!
//! let options = AutoplayOptions { max_pieces: 10, ..AutoplayOptions::default() };
//! let dispatcher = Dispatcher::new(HeuristicKind::MeanHeightGaps.build());
//! let player = AutoPlayer::new(dispatcher, options);
//! let report = player.play(&mut engine, &mut generator);
//! assert_eq!(report.pieces_placed, 10);
//! assert_eq!(report.rows_cleared, 5);
//! assert!(!report.game_over);
//! ```

use rotris_engine::{GridMapEngine, PieceGenerator, PiecePlacement, PieceShape};

use crate::{
    dispatcher::Dispatcher,
    search::{BestFit, SearchStep},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayOptions {
    /// Stop after this many pieces even if the game could go on.
    pub max_pieces: usize,
    /// Pieces between 180° bucket content flips on semi-rotatable boards.
    pub flip_interval: Option<usize>,
    /// Run the search one candidate per step instead of in one call.
    pub step_wise: bool,
}

impl Default for AutoplayOptions {
    fn default() -> Self {
        Self {
            max_pieces: 1000,
            flip_interval: None,
            step_wise: false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("pieces placed: {pieces_placed}, rows cleared: {rows_cleared}, game over: {game_over}")]
pub struct AutoplayReport {
    pub pieces_placed: usize,
    pub rows_cleared: usize,
    pub game_over: bool,
}

/// What happened to a single piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PieceOutcome {
    Settled { rows_cleared: usize },
    SpawnBlocked,
    NoPlacement,
}

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    dispatcher: Dispatcher,
    options: AutoplayOptions,
}

impl AutoPlayer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher, options: AutoplayOptions) -> Self {
        Self {
            dispatcher,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &AutoplayOptions {
        &self.options
    }

    /// Plays until the game ends or `max_pieces` pieces have been placed.
    pub fn play(
        &self,
        engine: &mut GridMapEngine,
        generator: &mut PieceGenerator,
    ) -> AutoplayReport {
        let mut report = AutoplayReport::default();
        while report.pieces_placed < self.options.max_pieces {
            let shape = generator.pop_next();
            match self.play_piece(engine, shape) {
                PieceOutcome::Settled { rows_cleared } => {
                    report.pieces_placed += 1;
                    report.rows_cleared += rows_cleared;
                }
                PieceOutcome::SpawnBlocked | PieceOutcome::NoPlacement => {
                    report.game_over = true;
                    break;
                }
            }
            self.maybe_flip(engine, report.pieces_placed);
        }
        log::info!("autoplay finished: {report}");
        report
    }

    /// Spawns `shape`, moves it to its best fit, settles it and collapses full rows.
    pub fn play_piece(&self, engine: &mut GridMapEngine, shape: &PieceShape) -> PieceOutcome {
        let mut placement = shape.spawn_placement(engine.map().bucket_width());
        if !engine.is_contained(shape, placement) {
            log::warn!("{} collides at spawn {placement:?}", shape.name());
            return PieceOutcome::SpawnBlocked;
        }

        let fit = self.search(engine, shape, placement);
        if fit.is_no_placement() {
            log::info!("no placement left for {}", shape.name());
            return PieceOutcome::NoPlacement;
        }
        for motion in fit.into_motions() {
            if !motion.apply(engine, shape, &mut placement) {
                log::warn!("{motion} refused for {} at {placement:?}", shape.name());
            }
        }

        if !engine.settle_piece(shape, placement) {
            log::warn!("{} cannot settle at {placement:?}", shape.name());
            return PieceOutcome::SpawnBlocked;
        }
        let cleared = engine.collapse_with_policy();
        if !cleared.is_empty() {
            log::info!("cleared rows {cleared:?}");
        }
        PieceOutcome::Settled {
            rows_cleared: cleared.len(),
        }
    }

    fn search(
        &self,
        engine: &GridMapEngine,
        shape: &PieceShape,
        current: PiecePlacement,
    ) -> BestFit {
        if !self.options.step_wise {
            return self.dispatcher.best_fit(engine.map(), shape, current);
        }
        let mut stepper = self.dispatcher.stepper(engine.map(), shape, current);
        let mut steps = 1;
        loop {
            match stepper.step() {
                SearchStep::Pending => steps += 1,
                SearchStep::Done(result) => {
                    log::trace!("step-wise search finished in {steps} steps");
                    return result;
                }
            }
        }
    }

    fn maybe_flip(&self, engine: &mut GridMapEngine, pieces_placed: usize) {
        let Some(interval) = self.options.flip_interval else {
            return;
        };
        if interval > 0 && pieces_placed % interval == 0 && engine.topology().content_flips() {
            log::info!("flipping bucket contents after {pieces_placed} pieces");
            engine.rotate_bucket_contents_180();
        }
    }
}
