//! Editor configuration
//!
//! Read from `config.ron` in the platform config directory. Missing files and
//! missing fields fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("serializing config: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Where maps are stored, one JSON file each
    pub maps_dir: PathBuf,
    /// Where tile template RON files are read from
    pub templates_dir: PathBuf,
    pub default_width: u32,
    pub default_height: u32,
    /// Map opened at startup
    pub start_map: String,
    /// Seed for terrain generation; `None` picks a random one each time
    pub terrain_seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            maps_dir: data_directory().join("maps"),
            templates_dir: data_directory().join("tiles"),
            default_width: 10,
            default_height: 10,
            start_map: crate::save::DEFAULT_MAP_NAME.to_string(),
            terrain_seed: None,
        }
    }
}

impl EditorConfig {
    /// Read a config file, failing on unreadable or invalid files
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load from `path`, or defaults if it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Config loaded from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load from the platform config directory
    pub fn load() -> Self {
        Self::load_or_default(&config_path())
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "worldgrid", "Worldgrid") {
        let mut path = proj_dirs.config_dir().to_path_buf();
        path.push("config.ron");
        path
    } else {
        PathBuf::from("./config.ron")
    }
}

fn data_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "worldgrid", "Worldgrid") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        // Fallback to current directory
        PathBuf::from(".")
    }
}
