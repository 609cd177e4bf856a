use std::path::PathBuf;

use anyhow::Context as _;
use rotris_engine::{GridMapEngine, PieceGenerator};
use rotris_evaluator::{AutoPlayer, AutoplayOptions, Dispatcher, HeuristicKind};

use crate::model::game_config::GameConfig;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoplayArg {
    /// Path to the game configuration file (JSON format)
    config_path: PathBuf,
    /// Placement heuristic, overriding the one in the configuration
    #[clap(long)]
    heuristic: Option<HeuristicKind>,
    /// Seed for the piece generator (random if omitted)
    #[clap(long)]
    seed: Option<u64>,
    /// Stop after this many pieces
    #[clap(long, default_value_t = 1000)]
    max_pieces: usize,
    /// Search one candidate per step instead of in a single call
    #[clap(long, default_value_t = false)]
    step_wise: bool,
}

pub(crate) fn run(arg: &AutoplayArg) -> anyhow::Result<()> {
    let AutoplayArg {
        config_path,
        heuristic,
        seed,
        max_pieces,
        step_wise,
    } = arg;

    let config = GameConfig::open(config_path)?;
    let mut engine = GridMapEngine::new(config.topology()?);
    let pieces = config.pieces.clone();
    let mut generator = match seed {
        Some(seed) => PieceGenerator::with_seed(pieces, *seed),
        None => PieceGenerator::new(pieces),
    }
    .with_context(|| format!("Invalid piece set in {}", config_path.display()))?;

    let heuristic = heuristic.unwrap_or(config.heuristic);
    log::info!(
        "autoplay on a {} board with {heuristic}",
        engine.topology().class()
    );
    let options = AutoplayOptions {
        max_pieces: *max_pieces,
        flip_interval: config.flip_interval,
        step_wise: *step_wise,
    };
    let player = AutoPlayer::new(Dispatcher::new(heuristic.build()), options);
    let report = player.play(&mut engine, &mut generator);

    print!("{}", engine.map().bucket_dump());
    println!("{report}");
    Ok(())
}
