//! Topology-aware grid engine for falling-block games.
//!
//! - [`core`] - Board geometry ([`Topology`]), the cell grid ([`GridMap`]) with
//!   containment, row collapse and rotation, and piece shapes
//! - [`engine`] - The notifying grid owner ([`GridMapEngine`]) and piece generation

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece generator needs at least one piece shape")]
pub struct EmptyShapeSetError;
