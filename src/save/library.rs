//! Named map loading and saving
//!
//! Ties the map file format to a store, with the "Default" map fallback.

use std::num::NonZeroU32;

use super::map_file::{decode_named, encode, from_grid, to_grid, MapFileError};
use super::store::MapStore;
use crate::data::{plain_template, TemplateRegistry};
use crate::world::{generate_flat, GridError, TileGrid};

/// Map that is generated instead of failing when it is not stored
pub const DEFAULT_MAP_NAME: &str = "Default";

/// Loads and saves named maps in a store
#[derive(Debug, Clone)]
pub struct MapLibrary<S: MapStore> {
    store: S,
    default_width: NonZeroU32,
    default_height: NonZeroU32,
}

impl<S: MapStore> MapLibrary<S> {
    /// Create a library; the size is used when "Default" has to be generated
    pub fn new(store: S, default_width: u32, default_height: u32) -> Result<Self, GridError> {
        let (default_width, default_height) = check_size("MapLibrary::new", default_width, default_height)?;
        Ok(Self {
            store,
            default_width,
            default_height,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Size used for a generated "Default" map
    pub fn default_size(&self) -> (u32, u32) {
        (self.default_width.get(), self.default_height.get())
    }

    pub fn set_default_size(&mut self, width: u32, height: u32) -> Result<(), GridError> {
        let (width, height) = check_size("set_default_size", width, height)?;
        self.default_width = width;
        self.default_height = height;
        Ok(())
    }

    /// Load a named map.
    ///
    /// A missing "Default" map is generated as a flat Plain grid of the
    /// default size. Any other missing map is `NotFound`.
    pub fn load(&self, name: &str, registry: &TemplateRegistry) -> Result<TileGrid, MapFileError> {
        match self.store.read(name)? {
            Some(raw) => {
                let record = decode_named(name, &raw)?;
                let grid = to_grid(&record, registry)?;
                log::info!("Loaded map '{}' ({}x{})", name, grid.width(), grid.height());
                Ok(grid)
            }
            None if name == DEFAULT_MAP_NAME => {
                log::info!(
                    "Map '{}' not stored, generating {}x{} plain grid",
                    name,
                    self.default_width,
                    self.default_height
                );
                Ok(self.generate_default())
            }
            None => Err(MapFileError::NotFound(name.to_string())),
        }
    }

    /// Flat Plain grid of the default size
    pub fn generate_default(&self) -> TileGrid {
        generate_flat(self.default_width, self.default_height, &plain_template())
    }

    /// Serialize and store a grid, overwriting any map with the same name
    pub fn save(&mut self, name: &str, grid: &TileGrid) -> Result<(), MapFileError> {
        let text = encode(&from_grid(grid)).map_err(|e| match e {
            MapFileError::Serialize { reason, .. } => MapFileError::Serialize {
                map: name.to_string(),
                reason,
            },
            other => other,
        })?;
        self.store.write(name, &text)?;
        log::info!("Saved map '{}' ({} tiles)", name, grid.len());
        Ok(())
    }

    pub fn exists(&self, name: &str) -> Result<bool, MapFileError> {
        Ok(self.store.read(name)?.is_some())
    }

    pub fn list(&self) -> Result<Vec<String>, MapFileError> {
        self.store.list()
    }

    /// Raw stored text of a map, for restoring it later
    pub fn snapshot(&self, name: &str) -> Result<Option<String>, MapFileError> {
        self.store.read(name)
    }

    /// Put a map back to a snapshot; `None` removes it
    pub fn restore(&mut self, name: &str, snapshot: Option<&str>) -> Result<(), MapFileError> {
        match snapshot {
            Some(text) => self.store.write(name, text),
            None => self.store.remove(name),
        }
    }
}

fn check_size(op: &'static str, width: u32, height: u32) -> Result<(NonZeroU32, NonZeroU32), GridError> {
    TileGrid::check_dimensions(op, width, height)?;
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(GridError::InvalidDimensions { op, width, height }),
    }
}
