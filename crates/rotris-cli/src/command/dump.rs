use std::path::PathBuf;

use rotris_engine::GridMap;

use crate::model::game_config::GameConfig;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DumpArg {
    /// Path to the game configuration file (JSON format)
    config_path: PathBuf,
    /// Print only the bucket instead of the whole board
    #[clap(long, default_value_t = false)]
    bucket_only: bool,
}

pub(crate) fn run(arg: &DumpArg) -> anyhow::Result<()> {
    let DumpArg {
        config_path,
        bucket_only,
    } = arg;

    let config = GameConfig::open(config_path)?;
    let topology = config.topology()?;
    log::info!(
        "{} board {}x{}, bucket {}",
        topology.class(),
        topology.board_width(),
        topology.board_height(),
        topology.bucket()
    );

    let map = GridMap::new(topology);
    if *bucket_only {
        print!("{}", map.bucket_dump());
    } else {
        print!("{map}");
    }
    Ok(())
}
