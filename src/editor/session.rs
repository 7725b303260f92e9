//! Map editing session
//!
//! Holds the authoritative grid while a map is being edited and drives the
//! store and the scene on commit.
//!
//! ```text
//! Uninitialized --initialize--> Loaded --paint--> Editing --commit--> Committing --> Loaded
//! ```

use thiserror::Error;

use crate::data::{TemplateNotFound, TemplateRegistry, TemplateSource, TileTemplate};
use crate::save::{MapFileError, MapLibrary, MapStore, DEFAULT_MAP_NAME};
use crate::scene::{SceneError, SceneMaterializer};
use crate::world::{default_tile, generate_terrain, Feature, GridError, TileGrid};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No map loaded yet
    Uninitialized,
    /// Grid matches what was loaded or last committed
    Loaded,
    /// Grid has uncommitted changes
    Editing,
    /// A commit is in flight
    Committing,
}

/// Which half of a commit failed
#[derive(Debug, Error)]
pub enum CommitFailure {
    #[error("saving: {0}")]
    Persist(#[source] MapFileError),
    #[error("materializing: {0}")]
    Materialize(#[source] SceneError),
}

/// Errors from session operations
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("select_template: {0}")]
    TemplateNotFound(#[from] TemplateNotFound),
    #[error("open '{map}': {source}")]
    Load {
        map: String,
        #[source]
        source: MapFileError,
    },
    #[error("paint ({x}, {y}): no template selected")]
    NoTemplateSelected { x: u32, y: u32 },
    #[error("{op}: a commit of '{map}' is already in progress")]
    AlreadyCommitting { op: &'static str, map: String },
    #[error("{0}: no map loaded")]
    NotInitialized(&'static str),
    #[error("commit of '{map}' failed while {source}")]
    CommitFailed {
        map: String,
        #[source]
        source: CommitFailure,
    },
}

/// An interactive editing session over one map
pub struct MapEditorSession<S: MapStore, M: SceneMaterializer> {
    registry: TemplateRegistry,
    library: MapLibrary<S>,
    scene: M,
    state: SessionState,
    map_name: String,
    grid: Option<TileGrid>,
    active_template: Option<TileTemplate>,
}

impl<S: MapStore, M: SceneMaterializer> MapEditorSession<S, M> {
    pub fn new(registry: TemplateRegistry, library: MapLibrary<S>, scene: M) -> Self {
        Self {
            registry,
            library,
            scene,
            state: SessionState::Uninitialized,
            map_name: String::new(),
            grid: None,
            active_template: None,
        }
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::debug!("Session state: {:?} -> {:?}", self.state, state);
        }
        self.state = state;
    }

    /// The grid being edited, once a map is loaded
    pub fn grid(&self) -> Option<&TileGrid> {
        self.grid.as_ref()
    }

    /// Name of the loaded map (empty before initialization)
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Loaded grid width and height
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.grid.as_ref().map(|g| (g.width(), g.height()))
    }

    /// True while there are uncommitted edits
    pub fn is_dirty(&self) -> bool {
        self.state == SessionState::Editing
    }

    pub fn active_template(&self) -> Option<&TileTemplate> {
        self.active_template.as_ref()
    }

    /// Templates available for painting, in registry order
    pub fn templates(&self) -> &[TileTemplate] {
        self.registry.all()
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn library(&self) -> &MapLibrary<S> {
        &self.library
    }

    pub fn scene(&self) -> &M {
        &self.scene
    }

    fn ensure_not_committing(&self, op: &'static str) -> Result<(), EditError> {
        if self.state == SessionState::Committing {
            return Err(EditError::AlreadyCommitting {
                op,
                map: self.map_name.clone(),
            });
        }
        Ok(())
    }

    /// Grid for a mutating operation; fails before a map is loaded or mid-commit
    fn editable_grid(&mut self, op: &'static str) -> Result<&mut TileGrid, EditError> {
        self.ensure_not_committing(op)?;
        self.grid.as_mut().ok_or(EditError::NotInitialized(op))
    }

    /// Load `map_name`, replacing the current grid and discarding edits.
    ///
    /// A missing "Default" map is generated. On failure the session keeps
    /// whatever it had before, including no grid at all.
    pub fn initialize(&mut self, map_name: &str) -> Result<&TileGrid, EditError> {
        self.ensure_not_committing("initialize")?;

        let grid = self
            .library
            .load(map_name, &self.registry)
            .map_err(|source| EditError::Load {
                map: map_name.to_string(),
                source,
            })?;

        // The loaded size becomes the size for the next generated default
        self.library.set_default_size(grid.width(), grid.height())?;
        self.map_name = map_name.to_string();
        self.set_state(SessionState::Loaded);
        Ok(self.grid.insert(grid))
    }

    /// Choose the template used by `paint`. Unknown ids leave the current
    /// selection untouched.
    pub fn select_template(&mut self, tile_type_id: &str) -> Result<&TileTemplate, EditError> {
        let template = self.registry.resolve(tile_type_id)?.clone();
        log::debug!("Selected template '{}'", template.id);
        Ok(self.active_template.insert(template))
    }

    /// Set the size used when the "Default" map has to be generated
    pub fn set_default_size(&mut self, width: u32, height: u32) -> Result<(), EditError> {
        self.library.set_default_size(width, height)?;
        Ok(())
    }

    /// Replace the cell at `(x, y)` with a tile from the active template.
    ///
    /// Returns whether the cell changed; repainting with the same template
    /// has no effect on the grid.
    pub fn paint(&mut self, x: u32, y: u32) -> Result<bool, EditError> {
        let template = self.active_template.clone();
        let grid = self.editable_grid("paint")?;
        grid.check_bounds("paint", x, y)?;
        let template = template.ok_or(EditError::NoTemplateSelected { x, y })?;

        let tile = template.instantiate(x, y);
        let changed = grid.get(x, y)? != &tile;
        if changed {
            grid.set(x, y, tile)?;
            log::debug!("Painted ({}, {}) with '{}'", x, y, template.id);
        }
        self.set_state(SessionState::Editing);
        Ok(changed)
    }

    /// Flip one feature on a cell, returning whether it is now present
    pub fn toggle_feature(&mut self, x: u32, y: u32, feature: Feature) -> Result<bool, EditError> {
        let grid = self.editable_grid("toggle_feature")?;
        grid.check_bounds("toggle_feature", x, y)?;

        let mut tile = grid.get(x, y)?.clone();
        let present = tile.features.toggle(feature);
        grid.set(x, y, tile)?;

        self.set_state(SessionState::Editing);
        Ok(present)
    }

    /// Resize the grid, keeping overlapping cells and filling new ones with
    /// the default Plain tile
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EditError> {
        let grid = self.editable_grid("resize")?;
        grid.resize(width, height, default_tile)?;
        self.library.set_default_size(width, height)?;

        log::info!("Resized '{}' to {}x{}", self.map_name, width, height);
        self.set_state(SessionState::Editing);
        Ok(())
    }

    /// Replace the grid with procedurally generated terrain of the same size
    pub fn generate(&mut self, seed: u64) -> Result<&TileGrid, EditError> {
        let (width, height) = {
            let grid = self.editable_grid("generate")?;
            (grid.width(), grid.height())
        };
        let grid = generate_terrain(width, height, seed, &self.registry)?;

        self.set_state(SessionState::Editing);
        Ok(self.grid.insert(grid))
    }

    /// Throw away all edits and load "Default" again.
    ///
    /// Never fails: if a stored "Default" map cannot be read, a flat Plain
    /// grid of the configured size is generated instead.
    pub fn reset_to_default(&mut self) -> &TileGrid {
        let grid = match self.library.load(DEFAULT_MAP_NAME, &self.registry) {
            Ok(grid) => grid,
            Err(e) => {
                log::warn!("Reset could not load '{}' ({}), generating it", DEFAULT_MAP_NAME, e);
                self.library.generate_default()
            }
        };

        // The loaded size becomes the size for the next generated default
        if let Err(e) = self.library.set_default_size(grid.width(), grid.height()) {
            log::warn!("Keeping previous default size: {}", e);
        }
        self.map_name = DEFAULT_MAP_NAME.to_string();
        self.set_state(SessionState::Loaded);
        self.grid.insert(grid)
    }

    /// Swap the template registry. A selection whose id is still registered
    /// picks up the new definition; otherwise it is cleared. Returns the
    /// number of templates loaded.
    pub fn reload_templates(&mut self, source: &dyn TemplateSource) -> usize {
        let count = self.registry.load(source);
        if let Some(active) = &self.active_template {
            match self.registry.resolve(&active.id) {
                Ok(template) => self.active_template = Some(template.clone()),
                Err(e) => {
                    log::warn!("Selection cleared: {}", e);
                    self.active_template = None;
                }
            }
        }
        count
    }

    /// Save the grid under the current map name and push it to the scene.
    ///
    /// Both happen or neither does: if the scene rejects the grid the stored
    /// map is put back the way it was. On failure the session returns to the
    /// state it was in and the grid is untouched.
    pub fn commit(&mut self) -> Result<(), EditError> {
        self.ensure_not_committing("commit")?;
        if self.grid.is_none() {
            return Err(EditError::NotInitialized("commit"));
        }

        let previous = self.state;
        self.set_state(SessionState::Committing);

        match self.run_commit() {
            Ok(()) => {
                log::info!("Committed map '{}'", self.map_name);
                self.set_state(SessionState::Loaded);
                Ok(())
            }
            Err(source) => {
                log::warn!("Commit of '{}' failed: {}", self.map_name, source);
                self.set_state(previous);
                Err(EditError::CommitFailed {
                    map: self.map_name.clone(),
                    source,
                })
            }
        }
    }

    fn run_commit(&mut self) -> Result<(), CommitFailure> {
        let Some(grid) = self.grid.as_ref() else {
            return Ok(());
        };
        let name = self.map_name.as_str();

        let snapshot = self.library.snapshot(name).map_err(CommitFailure::Persist)?;
        self.library.save(name, grid).map_err(CommitFailure::Persist)?;

        if let Err(e) = self.scene.replace_all(grid) {
            if let Err(restore) = self.library.restore(name, snapshot.as_deref()) {
                log::error!("Could not restore map '{}' after failed commit: {}", name, restore);
            }
            return Err(CommitFailure::Materialize(e));
        }
        Ok(())
    }
}
