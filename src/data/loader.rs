//! Tile template registry
//!
//! Loads tile templates from external RON files and resolves them by id.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::templates::{builtin_templates, TileTemplate};

/// A template id that is not registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no tile template with id '{0}'")]
pub struct TemplateNotFound(pub String);

/// Failure writing template files
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write template files: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize template: {0}")]
    Serialize(#[from] ron::Error),
}

/// Anything that can supply tile templates
pub trait TemplateSource {
    /// Short description for log messages
    fn describe(&self) -> String;

    /// Read all templates. Unreadable entries are skipped with a warning.
    fn read_templates(&self) -> Vec<TileTemplate>;
}

/// A directory of `.ron` template files.
///
/// Each file holds either one template or a list of them. Files are read in
/// file-name order so registration order is stable.
#[derive(Debug, Clone)]
pub struct TemplateDir {
    path: PathBuf,
}

impl TemplateDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn template_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        Ok(files)
    }

    fn read_file(path: &Path) -> Vec<TileTemplate> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read template file {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        if let Ok(template) = ron::from_str::<TileTemplate>(&content) {
            return vec![template];
        }
        match ron::from_str::<Vec<TileTemplate>>(&content) {
            Ok(templates) => templates,
            Err(e) => {
                log::warn!("Failed to parse template file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }
}

impl TemplateSource for TemplateDir {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_templates(&self) -> Vec<TileTemplate> {
        match self.template_files() {
            Ok(files) => files.iter().flat_map(|p| Self::read_file(p)).collect(),
            Err(e) => {
                log::warn!("Failed to list template directory {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

/// The hardcoded builtin templates
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn describe(&self) -> String {
        "builtin templates".to_string()
    }

    fn read_templates(&self) -> Vec<TileTemplate> {
        builtin_templates()
    }
}

impl TemplateSource for Vec<TileTemplate> {
    fn describe(&self) -> String {
        format!("{} in-memory templates", self.len())
    }

    fn read_templates(&self) -> Vec<TileTemplate> {
        self.clone()
    }
}

/// Registry of tile templates keyed by id, in registration order
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<TileTemplate>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the builtin templates
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load(&BuiltinTemplates);
        registry
    }

    /// Replace the registry contents with everything `source` yields.
    ///
    /// Returns the number of templates registered. An empty source leaves an
    /// empty registry and logs a warning.
    pub fn load(&mut self, source: &dyn TemplateSource) -> usize {
        self.templates.clear();
        self.index.clear();

        for template in source.read_templates() {
            self.register(template);
        }

        if self.templates.is_empty() {
            log::warn!("No tile templates found in {}", source.describe());
        } else {
            log::info!("Loaded {} tile templates from {}", self.templates.len(), source.describe());
        }
        self.templates.len()
    }

    /// Add a template. A duplicate id is ignored with a warning; the first
    /// registration wins.
    pub fn register(&mut self, template: TileTemplate) -> bool {
        if self.index.contains_key(&template.id) {
            log::warn!("Duplicate tile template '{}' ignored", template.id);
            return false;
        }
        self.index.insert(template.id.clone(), self.templates.len());
        self.templates.push(template);
        true
    }

    /// Find a template by exact id
    pub fn resolve(&self, id: &str) -> Result<&TileTemplate, TemplateNotFound> {
        self.index
            .get(id)
            .map(|&i| &self.templates[i])
            .ok_or_else(|| TemplateNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All templates in registration order
    pub fn all(&self) -> &[TileTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Export the builtin templates to `dir`, one RON file per template
pub fn export_builtin_templates(dir: &Path) -> Result<usize, ExportError> {
    fs::create_dir_all(dir)?;

    let templates = builtin_templates();
    for template in &templates {
        let text = ron::ser::to_string_pretty(template, ron::ser::PrettyConfig::default())?;
        fs::write(dir.join(format!("{}.ron", template.id)), text)?;
    }

    log::info!("Exported {} builtin templates to {}", templates.len(), dir.display());
    Ok(templates.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Biome;

    #[test]
    fn test_resolve_exact_match() {
        let registry = TemplateRegistry::with_builtins();
        assert_eq!(registry.resolve("Water").unwrap().biome, Biome::Water);
        assert_eq!(
            registry.resolve("water"),
            Err(TemplateNotFound("water".to_string()))
        );
        assert_eq!(
            registry.resolve("Nonexistent"),
            Err(TemplateNotFound("Nonexistent".to_string()))
        );
    }

    #[test]
    fn test_all_preserves_insertion_order() {
        let mut registry = TemplateRegistry::new();
        registry.register(TileTemplate::new("Zeta", Biome::Tundra));
        registry.register(TileTemplate::new("Alpha", Biome::Desert));
        registry.register(TileTemplate::new("Mid", Biome::Plain));

        let ids: Vec<&str> = registry.all().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.register(TileTemplate::new("Plain", Biome::Plain)));
        assert!(!registry.register(TileTemplate::new("Plain", Biome::Desert)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("Plain").unwrap().biome, Biome::Plain);
    }

    #[test]
    fn test_load_empty_source_leaves_empty_registry() {
        let mut registry = TemplateRegistry::with_builtins();
        let count = registry.load(&Vec::<TileTemplate>::new());
        assert_eq!(count, 0);
        assert!(registry.is_empty());
        assert!(registry.resolve("Plain").is_err());
    }

    #[test]
    fn test_load_missing_directory_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = TemplateRegistry::new();
        let count = registry.load(&TemplateDir::new(dir.path().join("missing")));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_export_then_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exported = export_builtin_templates(dir.path()).unwrap();
        assert_eq!(exported, Biome::ALL.len());

        let mut registry = TemplateRegistry::new();
        let count = registry.load(&TemplateDir::new(dir.path()));
        assert_eq!(count, exported);
        assert_eq!(registry.resolve("Mountain").unwrap(), &crate::data::builtin_template(Biome::Mountain));
    }

    #[test]
    fn test_directory_with_lists_and_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_coast.ron"),
            r#"[(id: "Beach", biome: "Desert"), (id: "Reef", biome: "Water", features: [Lake])]"#,
        )
        .unwrap();
        fs::write(dir.path().join("b_broken.ron"), "(id: ").unwrap();
        fs::write(dir.path().join("c_port.ron"), r#"(id: "Port", biome: "Water", building: Some("Harbor"))"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a template").unwrap();

        let mut registry = TemplateRegistry::new();
        registry.load(&TemplateDir::new(dir.path()));

        let ids: Vec<&str> = registry.all().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["Beach", "Reef", "Port"]);
        assert_eq!(registry.resolve("Port").unwrap().building.as_deref(), Some("Harbor"));
    }
}
