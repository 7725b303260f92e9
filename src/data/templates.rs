//! Tile templates
//!
//! Named presets of default tile attributes. Templates are loaded from RON
//! files and resolved by id when maps are loaded or painted.

use serde::{Deserialize, Serialize};

use crate::world::{Biome, Features, Tile};

/// Id of the template used for generated and padding cells
pub const PLAIN_TEMPLATE_ID: &str = "Plain";

/// A template for creating tiles from external data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    /// Unique template ID, stored in map files as `tileTypeId`
    pub id: String,
    pub biome: Biome,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub building: Option<String>,
}

impl TileTemplate {
    pub fn new(id: impl Into<String>, biome: Biome) -> Self {
        Self {
            id: id.into(),
            biome,
            features: Features::NONE,
            building: None,
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    /// Build a tile from this template at the given cell
    pub fn instantiate(&self, x: u32, y: u32) -> Tile {
        Tile::new(x, y, self.id.clone(), self.biome)
            .with_features(self.features)
            .with_building(self.building.clone())
    }
}

/// The plain grassland template generated maps fall back to
pub fn plain_template() -> TileTemplate {
    TileTemplate::new(PLAIN_TEMPLATE_ID, Biome::Plain)
}

/// Builtin template for a biome, named after it
pub fn builtin_template(biome: Biome) -> TileTemplate {
    match biome {
        Biome::Plain => plain_template(),
        Biome::Desert => TileTemplate::new("Desert", Biome::Desert),
        Biome::Mountain => TileTemplate::new("Mountain", Biome::Mountain).with_features(Features::HILL),
        Biome::Water => TileTemplate::new("Water", Biome::Water),
        Biome::Swamp => TileTemplate::new("Swamp", Biome::Swamp).with_features(Features::LAKE),
        Biome::Tundra => TileTemplate::new("Tundra", Biome::Tundra),
        Biome::Unknown => TileTemplate::new("Unknown", Biome::Unknown),
    }
}

/// Create the builtin templates (hardcoded fallback), one per concrete biome
pub fn builtin_templates() -> Vec<TileTemplate> {
    Biome::ALL.into_iter().map(builtin_template).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Feature;

    #[test]
    fn test_instantiate_copies_defaults() {
        let template = TileTemplate::new("Farm", Biome::Plain)
            .with_features(Features::RIVER)
            .with_building("Farmhouse");

        let tile = template.instantiate(4, 7);
        assert_eq!(tile.position(), (4, 7));
        assert_eq!(tile.tile_type_id, "Farm");
        assert_eq!(tile.biome, Biome::Plain);
        assert!(tile.has_feature(Feature::River));
        assert_eq!(tile.building.as_deref(), Some("Farmhouse"));
    }

    #[test]
    fn test_builtin_ids_match_biome_names() {
        let templates = builtin_templates();
        assert_eq!(templates.len(), Biome::ALL.len());
        for template in &templates {
            assert_eq!(template.id, template.biome.name());
        }
    }

    #[test]
    fn test_template_ron_defaults() {
        let template: TileTemplate = ron::from_str(r#"(id: "Oasis", biome: "Desert")"#).unwrap();
        assert_eq!(template.biome, Biome::Desert);
        assert!(template.features.is_empty());
        assert!(template.building.is_none());

        let full: TileTemplate =
            ron::from_str(r#"(id: "Mill", biome: "Plain", features: [River], building: Some("Mill"))"#).unwrap();
        assert!(full.features.contains(Feature::River));
        assert_eq!(full.building.as_deref(), Some("Mill"));
    }
}
