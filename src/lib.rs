//! Worldgrid - tile-based world map authoring
//!
//! A rectangular grid of biome tiles, tile templates to paint it with,
//! a JSON map file format, and an editing session that commits maps to
//! storage and to a scene.

pub mod config;
pub mod data;
pub mod editor;
pub mod save;
pub mod scene;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use config::EditorConfig;
pub use data::{TemplateRegistry, TileTemplate};
pub use editor::{EditError, MapEditorSession, SessionState};
pub use save::{MapDirectory, MapLibrary, MapStore};
pub use scene::{SceneMaterializer, TileScene};
pub use world::{Biome, Feature, Features, Tile, TileGrid};
