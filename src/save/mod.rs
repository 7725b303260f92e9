//! Map persistence
//!
//! The JSON map format, storage backends, and named map loading/saving.

pub mod library;
pub mod map_file;
pub mod store;

pub use library::{MapLibrary, DEFAULT_MAP_NAME};
pub use map_file::{decode, decode_named, encode, from_grid, to_grid, MapFileError, MapFileRecord, TileEntry};
pub use store::{MapDirectory, MapStore, MemoryStore};
