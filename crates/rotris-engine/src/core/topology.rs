use serde::{Deserialize, Serialize};

/// A board-absolute cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("({x}, {y})")]
pub struct CellPosition {
    pub x: usize,
    pub y: usize,
}

impl CellPosition {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// The playable rectangle inside the board, in board-absolute cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{width}x{height} at ({x}, {y})")]
pub struct BucketRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BucketRect {
    #[must_use]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
}

/// Row-collapse parameters supplied by the board shape.
///
/// `start_row` is bucket-local; `None` starts at the bucket floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsePolicy {
    #[serde(default)]
    pub start_row: Option<usize>,
    #[serde(default)]
    pub ignore_barriers: bool,
}

/// Raw board geometry as read from a configuration file.
///
/// Turn it into a [`Topology`] with [`Topology::new`], which is the only place the
/// geometry is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub board_width: usize,
    pub board_height: usize,
    pub bucket: BucketRect,
    #[serde(default)]
    pub bucket_rotates: bool,
    #[serde(default = "default_pieces_rotate")]
    pub pieces_rotate: bool,
    #[serde(default)]
    pub content_flips: bool,
    #[serde(default)]
    pub three_dimensional: bool,
    #[serde(default)]
    pub barriers: Vec<CellPosition>,
    #[serde(default)]
    pub collapse: CollapsePolicy,
}

fn default_pieces_rotate() -> bool {
    true
}

impl TopologyConfig {
    /// A `width`×`height` bucket surrounded by a one-cell frame on every side.
    ///
    /// Pieces rotate, the bucket does not.
    #[must_use]
    pub fn framed(width: usize, height: usize) -> Self {
        Self {
            board_width: width + 2,
            board_height: height + 2,
            bucket: BucketRect {
                x: 1,
                y: 1,
                width,
                height,
            },
            bucket_rotates: false,
            pieces_rotate: true,
            content_flips: false,
            three_dimensional: false,
            barriers: vec![],
            collapse: CollapsePolicy::default(),
        }
    }
}

/// Board shape family, which decides the search strategy and rotation rules.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyClass {
    #[display("static")]
    Static,
    #[display("rotatable")]
    Rotatable,
    #[display("semi-rotatable")]
    SemiRotatable,
    #[display("three-dimensional")]
    ThreeDimensional,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TopologyError {
    #[display("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[display("bucket must be at least 1x1, got {width}x{height}")]
    EmptyBucket { width: usize, height: usize },
    #[display("bucket {bucket} does not fit inside a {board_width}x{board_height} board")]
    BucketOutOfBounds {
        bucket: BucketRect,
        board_width: usize,
        board_height: usize,
    },
    #[display("rotating bucket requires a square board, got {width}x{height}")]
    NonSquareRotatingBoard { width: usize, height: usize },
    #[display("rotating bucket {bucket} must be square and centered on the board")]
    OffCenterRotatingBucket { bucket: BucketRect },
    #[display("barrier {position} lies outside the board")]
    BarrierOutOfBounds { position: CellPosition },
    #[display("collapse start row {row} is outside a bucket of height {height}")]
    CollapseStartOutOfBounds { row: usize, height: usize },
}

/// Validated, immutable description of a board and its bucket.
///
/// Built once per game session and shared (behind an `Arc`) by the grid engine and
/// every grid copy made during search.
///
/// # Example
///
/// ```
/// use rotris_engine::{Topology, TopologyClass, TopologyConfig};
///
/// let topology = Topology::new(TopologyConfig::framed(10, 20)).unwrap();
/// assert_eq!(topology.class(), TopologyClass::Static);
/// assert_eq!(topology.board_width(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    config: TopologyConfig,
}

impl Topology {
    pub fn new(config: TopologyConfig) -> Result<Self, TopologyError> {
        let TopologyConfig {
            board_width,
            board_height,
            bucket,
            ..
        } = config;

        if board_width == 0 || board_height == 0 {
            return Err(TopologyError::EmptyBoard {
                width: board_width,
                height: board_height,
            });
        }
        if bucket.width == 0 || bucket.height == 0 {
            return Err(TopologyError::EmptyBucket {
                width: bucket.width,
                height: bucket.height,
            });
        }
        if bucket.x + bucket.width > board_width || bucket.y + bucket.height > board_height {
            return Err(TopologyError::BucketOutOfBounds {
                bucket,
                board_width,
                board_height,
            });
        }
        if config.bucket_rotates {
            if board_width != board_height {
                return Err(TopologyError::NonSquareRotatingBoard {
                    width: board_width,
                    height: board_height,
                });
            }
            // A quarter turn must map the bucket rectangle onto itself.
            let centered = bucket.x * 2 + bucket.width == board_width
                && bucket.y * 2 + bucket.height == board_height;
            if bucket.width != bucket.height || !centered {
                return Err(TopologyError::OffCenterRotatingBucket { bucket });
            }
        }
        if let Some(&position) = config
            .barriers
            .iter()
            .find(|p| p.x >= board_width || p.y >= board_height)
        {
            return Err(TopologyError::BarrierOutOfBounds { position });
        }
        if let Some(row) = config.collapse.start_row
            && row >= bucket.height
        {
            return Err(TopologyError::CollapseStartOutOfBounds {
                row,
                height: bucket.height,
            });
        }

        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    #[must_use]
    pub fn board_width(&self) -> usize {
        self.config.board_width
    }

    #[must_use]
    pub fn board_height(&self) -> usize {
        self.config.board_height
    }

    #[must_use]
    pub fn is_square(&self) -> bool {
        self.config.board_width == self.config.board_height
    }

    #[must_use]
    pub fn bucket(&self) -> BucketRect {
        self.config.bucket
    }

    #[must_use]
    pub fn bucket_rotates(&self) -> bool {
        self.config.bucket_rotates
    }

    #[must_use]
    pub fn pieces_rotate(&self) -> bool {
        self.config.pieces_rotate
    }

    #[must_use]
    pub fn content_flips(&self) -> bool {
        self.config.content_flips
    }

    #[must_use]
    pub fn barriers(&self) -> &[CellPosition] {
        &self.config.barriers
    }

    #[must_use]
    pub fn collapse_policy(&self) -> CollapsePolicy {
        self.config.collapse
    }

    /// Bucket-local row where row collapse starts scanning.
    #[must_use]
    pub fn collapse_start_row(&self) -> usize {
        self.config
            .collapse
            .start_row
            .unwrap_or(self.config.bucket.height - 1)
    }

    #[must_use]
    pub fn class(&self) -> TopologyClass {
        if self.config.three_dimensional {
            TopologyClass::ThreeDimensional
        } else if self.config.bucket_rotates {
            TopologyClass::Rotatable
        } else if self.config.content_flips {
            TopologyClass::SemiRotatable
        } else {
            TopologyClass::Static
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spinning(size: usize) -> TopologyConfig {
        TopologyConfig {
            bucket_rotates: true,
            ..TopologyConfig::framed(size, size)
        }
    }

    #[test]
    fn test_framed_topology_is_static() {
        let topology = Topology::new(TopologyConfig::framed(10, 20)).unwrap();
        assert_eq!(topology.class(), TopologyClass::Static);
        assert_eq!(topology.board_width(), 12);
        assert_eq!(topology.board_height(), 22);
        assert_eq!(topology.collapse_start_row(), 19);
    }

    #[test]
    fn test_class_derivation() {
        let rotatable = Topology::new(spinning(18)).unwrap();
        assert_eq!(rotatable.class(), TopologyClass::Rotatable);

        let semi = Topology::new(TopologyConfig {
            content_flips: true,
            ..TopologyConfig::framed(10, 20)
        })
        .unwrap();
        assert_eq!(semi.class(), TopologyClass::SemiRotatable);

        let cube = Topology::new(TopologyConfig {
            three_dimensional: true,
            bucket_rotates: true,
            ..TopologyConfig::framed(8, 8)
        })
        .unwrap();
        assert_eq!(cube.class(), TopologyClass::ThreeDimensional);
    }

    #[test]
    fn test_bucket_outside_board_is_rejected() {
        let mut config = TopologyConfig::framed(10, 20);
        config.bucket.x = 3;
        assert!(matches!(
            Topology::new(config),
            Err(TopologyError::BucketOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_rotating_bucket_requires_square_board() {
        let config = TopologyConfig {
            bucket_rotates: true,
            ..TopologyConfig::framed(10, 20)
        };
        assert_eq!(
            Topology::new(config),
            Err(TopologyError::NonSquareRotatingBoard {
                width: 12,
                height: 22
            })
        );
    }

    #[test]
    fn test_rotating_bucket_must_be_centered() {
        let mut config = spinning(10);
        config.board_width += 2;
        config.board_height += 2;
        assert!(matches!(
            Topology::new(config),
            Err(TopologyError::OffCenterRotatingBucket { .. })
        ));
    }

    #[test]
    fn test_barrier_outside_board_is_rejected() {
        let mut config = TopologyConfig::framed(4, 4);
        config.barriers.push(CellPosition::new(6, 0));
        assert_eq!(
            Topology::new(config),
            Err(TopologyError::BarrierOutOfBounds {
                position: CellPosition::new(6, 0)
            })
        );
    }

    #[test]
    fn test_collapse_start_row_must_be_inside_bucket() {
        let mut config = TopologyConfig::framed(4, 4);
        config.collapse.start_row = Some(4);
        assert!(Topology::new(config).is_err());
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let json = r#"{
            "board_width": 6,
            "board_height": 6,
            "bucket": { "x": 1, "y": 1, "width": 4, "height": 4 }
        }"#;
        let config: TopologyConfig = serde_json::from_str(json).unwrap();
        assert!(config.pieces_rotate);
        assert!(!config.bucket_rotates);
        assert!(config.barriers.is_empty());
        assert_eq!(config, TopologyConfig::framed(4, 4));
    }
}
