//! World module
//!
//! Contains the tile grid, tile records, and map generation.

pub mod generation;
pub mod grid;
pub mod tile;

pub use generation::{default_tile, generate_default, generate_terrain};
pub(crate) use generation::generate_flat;
pub use grid::{GridError, TileGrid};
pub use tile::{Biome, Feature, Features, Tile};
