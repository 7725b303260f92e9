//! Scene materialization
//!
//! The bridge between map data and whatever draws it. The editor only ever
//! hands a finished grid to a `SceneMaterializer`; it never manages visual
//! objects itself.

use thiserror::Error;

use crate::world::{Biome, Features, TileGrid};

/// Name of the root node that owns all materialized tiles
pub const MAP_ROOT: &str = "MapTiles";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene rejected tile ({x}, {y}): {reason}")]
    Rejected { x: u32, y: u32, reason: String },
    #[error("scene unavailable: {0}")]
    Unavailable(String),
}

/// Turns a tile grid into a visible scene
pub trait SceneMaterializer {
    /// Replace everything previously materialized for the map with one
    /// representation per cell of `grid`.
    ///
    /// On error the previously visible set must be left as it was.
    fn replace_all(&mut self, grid: &TileGrid) -> Result<(), SceneError>;
}

/// One materialized tile
#[derive(Debug, Clone, PartialEq)]
pub struct TileNode {
    /// `Tile x,y`
    pub name: String,
    /// World position, `(x, 0, y)`
    pub position: [f32; 3],
    pub tile_type_id: String,
    pub biome: Biome,
    pub features: Features,
    pub building: Option<String>,
}

/// An in-memory scene: a root node with one child per tile
#[derive(Debug, Clone, Default)]
pub struct TileScene {
    nodes: Vec<TileNode>,
    width: u32,
    height: u32,
    rebuilds: u64,
}

impl TileScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialized tiles, row-major
    pub fn nodes(&self) -> &[TileNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimensions of the last materialized grid
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// How many times the scene has been rebuilt
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn node_at(&self, x: u32, y: u32) -> Option<&TileNode> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.nodes.get(y as usize * self.width as usize + x as usize)
    }

    /// Destroy every materialized tile
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.width = 0;
        self.height = 0;
    }
}

impl SceneMaterializer for TileScene {
    fn replace_all(&mut self, grid: &TileGrid) -> Result<(), SceneError> {
        let nodes: Vec<TileNode> = grid
            .iter()
            .map(|(x, y, tile)| TileNode {
                name: format!("Tile {},{}", x, y),
                position: [x as f32, 0.0, y as f32],
                tile_type_id: tile.tile_type_id.clone(),
                biome: tile.biome,
                features: tile.features,
                building: tile.building.clone(),
            })
            .collect();

        let previous = self.nodes.len();
        self.nodes = nodes;
        self.width = grid.width();
        self.height = grid.height();
        self.rebuilds += 1;

        log::info!(
            "Rebuilt {}: {} tiles destroyed, {} created",
            MAP_ROOT,
            previous,
            self.nodes.len()
        );
        Ok(())
    }
}
