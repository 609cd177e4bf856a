use std::{fs::File, io::BufReader, path::Path, sync::Arc};

use anyhow::Context;
use rotris_engine::{PieceShape, Topology, TopologyConfig};
use rotris_evaluator::HeuristicKind;
use serde::{Deserialize, Serialize};

/// A game session as described by a JSON configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameConfig {
    pub topology: TopologyConfig,
    pub pieces: Vec<PieceShape>,
    /// Pieces between bucket content flips on semi-rotatable boards.
    #[serde(default)]
    pub flip_interval: Option<usize>,
    #[serde(default)]
    pub heuristic: HeuristicKind,
}

impl GameConfig {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open game config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to read game config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn topology(&self) -> anyhow::Result<Arc<Topology>> {
        let topology = Topology::new(self.topology.clone()).context("Invalid board topology")?;
        Ok(Arc::new(topology))
    }
}
