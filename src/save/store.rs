//! Map storage backends
//!
//! A store maps a map name to its serialized text. `MapDirectory` keeps one
//! JSON file per map on disk; `MemoryStore` keeps them in process.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::map_file::MapFileError;

/// Named storage for serialized maps
pub trait MapStore {
    /// Read a map's text, `None` if no map has that name
    fn read(&self, name: &str) -> Result<Option<String>, MapFileError>;

    /// Create or overwrite a map
    fn write(&mut self, name: &str, contents: &str) -> Result<(), MapFileError>;

    /// Delete a map; removing a missing map is not an error
    fn remove(&mut self, name: &str) -> Result<(), MapFileError>;

    /// Names of all stored maps, sorted
    fn list(&self) -> Result<Vec<String>, MapFileError>;
}

/// Reject names that could escape the store or collide with temp files
fn check_name(name: &str) -> Result<(), MapFileError> {
    let bad = name.is_empty()
        || name.contains(['/', '\\'])
        || name.starts_with('.')
        || name.ends_with(".tmp");
    if bad {
        return Err(MapFileError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn io_error(map: &str, source: io::Error) -> MapFileError {
    MapFileError::Io {
        map: map.to_string(),
        source,
    }
}

/// Maps stored as `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct MapDirectory {
    dir: PathBuf,
}

impl MapDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the path for a map name
    pub fn map_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl MapStore for MapDirectory {
    fn read(&self, name: &str) -> Result<Option<String>, MapFileError> {
        check_name(name)?;
        match fs::read_to_string(self.map_path(name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(name, e)),
        }
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<(), MapFileError> {
        check_name(name)?;
        fs::create_dir_all(&self.dir).map_err(|e| io_error(name, e))?;

        // Write beside the target then rename, so a failed write leaves the old map intact
        let path = self.map_path(name);
        let tmp = self.dir.join(format!("{}.json.tmp", name));
        fs::write(&tmp, contents).map_err(|e| io_error(name, e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_error(name, e)
        })?;

        log::debug!("Wrote map '{}' to {}", name, path.display());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), MapFileError> {
        check_name(name)?;
        match fs::remove_file(self.map_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(name, e)),
        }
    }

    fn list(&self) -> Result<Vec<String>, MapFileError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("*", e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// In-process map store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    maps: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a map
    pub fn with_map(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.maps.insert(name.into(), contents.into());
        self
    }

    /// While read-only, writes and removals fail with `PermissionDenied`
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.maps.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    fn check_writable(&self, name: &str) -> Result<(), MapFileError> {
        if self.read_only {
            return Err(io_error(
                name,
                io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only"),
            ));
        }
        Ok(())
    }
}

impl MapStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<String>, MapFileError> {
        check_name(name)?;
        Ok(self.maps.get(name).cloned())
    }

    fn write(&mut self, name: &str, contents: &str) -> Result<(), MapFileError> {
        check_name(name)?;
        self.check_writable(name)?;
        self.maps.insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), MapFileError> {
        check_name(name)?;
        self.check_writable(name)?;
        self.maps.remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, MapFileError> {
        Ok(self.maps.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_read_write_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MapDirectory::new(dir.path().join("maps"));

        assert!(store.read("World").unwrap().is_none());
        store.write("World", "first").unwrap();
        store.write("World", "second").unwrap();
        assert_eq!(store.read("World").unwrap().as_deref(), Some("second"));
        assert!(store.map_path("World").exists());
        assert!(!dir.path().join("maps").join("World.json.tmp").exists());
    }

    #[test]
    fn test_directory_list_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MapDirectory::new(dir.path());
        assert!(store.list().unwrap().is_empty());

        store.write("Beta", "{}").unwrap();
        store.write("Alpha", "{}").unwrap();
        fs::write(dir.path().join("readme.txt"), "ignore me").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Alpha".to_string(), "Beta".to_string()]);

        store.remove("Alpha").unwrap();
        store.remove("Alpha").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Beta".to_string()]);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MapDirectory::new(dir.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
        assert!(store.read("Default").unwrap().is_none());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut store = MemoryStore::new();
        for name in ["", "../escape", "a/b", "a\\b", ".hidden", "x.tmp"] {
            assert!(
                matches!(store.write(name, "{}"), Err(MapFileError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_memory_read_only() {
        let mut store = MemoryStore::new().with_map("Keep", "old");
        store.set_read_only(true);

        assert!(matches!(store.write("Keep", "new"), Err(MapFileError::Io { .. })));
        assert!(store.remove("Keep").is_err());
        assert_eq!(store.get("Keep"), Some("old"));

        store.set_read_only(false);
        store.write("Keep", "new").unwrap();
        assert_eq!(store.get("Keep"), Some("new"));
    }
}
