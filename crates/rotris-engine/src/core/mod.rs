pub use self::{grid_map::*, piece::*, topology::*};

pub(crate) mod grid_map;
pub(crate) mod piece;
pub(crate) mod topology;
