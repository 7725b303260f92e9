//! Map file format
//!
//! Maps are stored as JSON:
//!
//! ```json
//! { "mapSizeX": 3, "mapSizeY": 2,
//!   "tilemap": [ { "x": 0, "y": 0, "tileTypeId": "Plain", "biome": "Plain" }, ... ] }
//! ```
//!
//! Only `(x, y, tileTypeId, biome)` is stored per cell. Feature flags and
//! buildings are not part of the format; on load they come from the template
//! the entry resolves to.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{plain_template, TemplateRegistry};
use crate::world::{generate_default, Biome, GridError, Tile, TileGrid};

/// Map load/save errors
#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("map '{0}' not found")]
    NotFound(String),
    #[error("invalid map name '{0}'")]
    InvalidName(String),
    #[error("malformed map '{map}': {reason}")]
    Malformed { map: String, reason: String },
    #[error("I/O error on map '{map}': {source}")]
    Io {
        map: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize map '{map}': {reason}")]
    Serialize { map: String, reason: String },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Serialized form of a tile grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFileRecord {
    pub map_size_x: u32,
    pub map_size_y: u32,
    pub tilemap: Vec<TileEntry>,
}

/// One stored cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileEntry {
    pub x: u32,
    pub y: u32,
    pub tile_type_id: String,
    pub biome: Biome,
}

/// Name used in errors for text that did not come from a named map
const UNNAMED: &str = "<text>";

impl MapFileRecord {
    /// Check sizes are positive and within the grid cell limit, and every
    /// entry lies inside them
    pub fn validate(&self, map: &str) -> Result<(), MapFileError> {
        if let Err(e) = TileGrid::check_dimensions("decode", self.map_size_x, self.map_size_y) {
            return Err(MapFileError::Malformed {
                map: map.to_string(),
                reason: e.to_string(),
            });
        }
        if let Some((i, entry)) = self
            .tilemap
            .iter()
            .enumerate()
            .find(|(_, e)| e.x >= self.map_size_x || e.y >= self.map_size_y)
        {
            return Err(MapFileError::Malformed {
                map: map.to_string(),
                reason: format!(
                    "tilemap[{}] at ({}, {}) is outside {}x{}",
                    i, entry.x, entry.y, self.map_size_x, self.map_size_y
                ),
            });
        }
        Ok(())
    }
}

/// Parse map text
pub fn decode(raw: &str) -> Result<MapFileRecord, MapFileError> {
    decode_named(UNNAMED, raw)
}

/// Parse map text, naming `map` in any error
pub fn decode_named(map: &str, raw: &str) -> Result<MapFileRecord, MapFileError> {
    let record: MapFileRecord = serde_json::from_str(raw).map_err(|e| MapFileError::Malformed {
        map: map.to_string(),
        reason: e.to_string(),
    })?;
    record.validate(map)?;
    Ok(record)
}

/// Render a record as pretty JSON
pub fn encode(record: &MapFileRecord) -> Result<String, MapFileError> {
    serde_json::to_string_pretty(record).map_err(|e| MapFileError::Serialize {
        map: UNNAMED.to_string(),
        reason: e.to_string(),
    })
}

/// Build a grid from a record.
///
/// Cells missing from the tilemap get the builtin Plain tile. Entries whose
/// template id is unknown still produce a cell with the entry's id and
/// biome but no features or building; one bad entry never aborts the load.
/// Duplicate coordinates: the last entry wins.
pub fn to_grid(record: &MapFileRecord, registry: &TemplateRegistry) -> Result<TileGrid, MapFileError> {
    record.validate(UNNAMED)?;

    let mut grid = generate_default(record.map_size_x, record.map_size_y, &plain_template())?;
    let mut unresolved = 0usize;

    for entry in &record.tilemap {
        let tile = match registry.resolve(&entry.tile_type_id) {
            Ok(template) => {
                let mut tile = template.instantiate(entry.x, entry.y);
                tile.biome = entry.biome;
                tile
            }
            Err(e) => {
                log::warn!("{} at ({}, {}), keeping biome {}", e, entry.x, entry.y, entry.biome);
                unresolved += 1;
                Tile::new(entry.x, entry.y, entry.tile_type_id.clone(), entry.biome)
            }
        };
        grid.set(entry.x, entry.y, tile)?;
    }

    if unresolved > 0 {
        log::warn!("{} of {} map entries used unknown templates", unresolved, record.tilemap.len());
    }
    Ok(grid)
}

/// Project a grid into a record, one entry per cell in row-major order
pub fn from_grid(grid: &TileGrid) -> MapFileRecord {
    MapFileRecord {
        map_size_x: grid.width(),
        map_size_y: grid.height(),
        tilemap: grid
            .iter()
            .map(|(x, y, tile)| TileEntry {
                x,
                y,
                tile_type_id: tile.tile_type_id.clone(),
                biome: tile.biome,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TileTemplate;
    use crate::world::{Feature, Features};

    fn entry(x: u32, y: u32, id: &str, biome: Biome) -> TileEntry {
        TileEntry { x, y, tile_type_id: id.to_string(), biome }
    }

    #[test]
    fn test_decode_field_names() {
        let raw = r#"{
            "mapSizeX": 2,
            "mapSizeY": 1,
            "tilemap": [
                { "x": 0, "y": 0, "tileTypeId": "Plain", "biome": "Plain" },
                { "x": 1, "y": 0, "tileTypeId": "Water", "biome": "Water" }
            ]
        }"#;
        let record = decode(raw).unwrap();
        assert_eq!(record.map_size_x, 2);
        assert_eq!(record.map_size_y, 1);
        assert_eq!(record.tilemap[1], entry(1, 0, "Water", Biome::Water));
    }

    #[test]
    fn test_encode_uses_camel_case() {
        let record = MapFileRecord {
            map_size_x: 1,
            map_size_y: 1,
            tilemap: vec![entry(0, 0, "Desert", Biome::Desert)],
        };
        let text = encode(&record).unwrap();
        assert!(text.contains("\"mapSizeX\""));
        assert!(text.contains("\"mapSizeY\""));
        assert!(text.contains("\"tileTypeId\""));
        assert_eq!(decode(&text).unwrap(), record);
    }

    #[test]
    fn test_decode_malformed() {
        let cases = [
            "",
            "not json",
            r#"{ "mapSizeY": 2, "tilemap": [] }"#,
            r#"{ "mapSizeX": "ten", "mapSizeY": 2, "tilemap": [] }"#,
            r#"{ "mapSizeX": -1, "mapSizeY": 2, "tilemap": [] }"#,
            r#"{ "mapSizeX": 0, "mapSizeY": 2, "tilemap": [] }"#,
            r#"{ "mapSizeX": 2, "mapSizeY": 2 }"#,
            r#"{ "mapSizeX": 2, "mapSizeY": 2, "tilemap": [ { "x": 2, "y": 0, "tileTypeId": "Plain", "biome": "Plain" } ] }"#,
            r#"{ "mapSizeX": 2, "mapSizeY": 2, "tilemap": [ { "x": 0, "y": 0, "biome": "Plain" } ] }"#,
        ];
        for raw in cases {
            assert!(
                matches!(decode(raw), Err(MapFileError::Malformed { .. })),
                "expected malformed: {raw}"
            );
        }
    }

    #[test]
    fn test_oversized_map_is_malformed() {
        for raw in [
            r#"{ "mapSizeX": 4294967295, "mapSizeY": 4294967295, "tilemap": [] }"#,
            r#"{ "mapSizeX": 100000, "mapSizeY": 100000, "tilemap": [] }"#,
        ] {
            let err = decode(raw).unwrap_err();
            assert!(matches!(err, MapFileError::Malformed { .. }), "{raw}");
            assert!(err.to_string().contains("limit"));
        }

        // A record built in code is checked again before allocating
        let record = MapFileRecord {
            map_size_x: u32::MAX,
            map_size_y: 3,
            tilemap: Vec::new(),
        };
        let registry = TemplateRegistry::with_builtins();
        assert!(matches!(to_grid(&record, &registry), Err(MapFileError::Malformed { .. })));
    }

    #[test]
    fn test_unknown_biome_name_is_not_fatal() {
        let raw = r#"{ "mapSizeX": 1, "mapSizeY": 1,
            "tilemap": [ { "x": 0, "y": 0, "tileTypeId": "Lava", "biome": "Volcanic" } ] }"#;
        let record = decode(raw).unwrap();
        assert_eq!(record.tilemap[0].biome, Biome::Unknown);
    }

    #[test]
    fn test_to_grid_resolves_templates_and_keeps_entry_biome() {
        let registry = TemplateRegistry::with_builtins();
        let record = MapFileRecord {
            map_size_x: 2,
            map_size_y: 2,
            tilemap: vec![
                entry(0, 0, "Mountain", Biome::Mountain),
                // Explicit biome wins over the template's
                entry(1, 0, "Mountain", Biome::Tundra),
            ],
        };
        let grid = to_grid(&record, &registry).unwrap();

        let peak = grid.get(0, 0).unwrap();
        assert_eq!(peak.biome, Biome::Mountain);
        assert!(peak.has_feature(Feature::Hill));

        let cold = grid.get(1, 0).unwrap();
        assert_eq!(cold.tile_type_id, "Mountain");
        assert_eq!(cold.biome, Biome::Tundra);

        // Unlisted cells are plain
        assert_eq!(grid.get(0, 1).unwrap().tile_type_id, "Plain");
        assert_eq!(grid.get(1, 1).unwrap().biome, Biome::Plain);
    }

    #[test]
    fn test_to_grid_skips_unresolved_templates() {
        let registry = TemplateRegistry::with_builtins();
        let record = MapFileRecord {
            map_size_x: 2,
            map_size_y: 1,
            tilemap: vec![
                entry(0, 0, "Volcano", Biome::Mountain),
                entry(1, 0, "Water", Biome::Water),
            ],
        };
        let grid = to_grid(&record, &registry).unwrap();

        let odd = grid.get(0, 0).unwrap();
        assert_eq!(odd.tile_type_id, "Volcano");
        assert_eq!(odd.biome, Biome::Mountain);
        assert!(odd.features.is_empty());
        assert_eq!(grid.get(1, 0).unwrap().biome, Biome::Water);
    }

    #[test]
    fn test_duplicate_entries_last_wins() {
        let registry = TemplateRegistry::with_builtins();
        let record = MapFileRecord {
            map_size_x: 1,
            map_size_y: 1,
            tilemap: vec![
                entry(0, 0, "Desert", Biome::Desert),
                entry(0, 0, "Swamp", Biome::Swamp),
            ],
        };
        let grid = to_grid(&record, &registry).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().tile_type_id, "Swamp");
    }

    #[test]
    fn test_round_trip_keeps_id_and_biome() {
        let registry = TemplateRegistry::with_builtins();
        let mut grid = generate_default(4, 3, &plain_template()).unwrap();
        grid.set(1, 1, Tile::new(1, 1, "Water", Biome::Water)).unwrap();
        grid.set(3, 2, Tile::new(3, 2, "Custom", Biome::Desert)).unwrap();
        grid.set(0, 2, Tile::new(0, 2, "Mountain", Biome::Unknown)).unwrap();

        let text = encode(&from_grid(&grid)).unwrap();
        let back = to_grid(&decode(&text).unwrap(), &registry).unwrap();

        assert_eq!(back.len(), grid.len());
        for ((x, y, before), (_, _, after)) in grid.iter().zip(back.iter()) {
            assert_eq!(after.position(), (x, y));
            assert_eq!(after.tile_type_id, before.tile_type_id);
            assert_eq!(after.biome, before.biome);
        }
    }

    #[test]
    fn test_round_trip_drops_features_and_buildings() {
        // The file format has no place for features or buildings. After a
        // round trip those come from the template, not from the saved grid.
        let registry = TemplateRegistry::with_builtins();
        let farm = TileTemplate::new("Plain", Biome::Plain)
            .with_features(Features::FOREST | Features::RIVER)
            .with_building("Farm");
        let mut grid = generate_default(2, 2, &plain_template()).unwrap();
        grid.set(0, 0, farm.instantiate(0, 0)).unwrap();

        let back = to_grid(&from_grid(&grid), &registry).unwrap();
        let tile = back.get(0, 0).unwrap();

        assert_eq!(tile.tile_type_id, "Plain");
        assert_eq!(tile.biome, Biome::Plain);
        assert!(!tile.has_feature(Feature::Forest));
        assert!(!tile.has_feature(Feature::River));
        assert_eq!(tile.building, None);
        assert_ne!(back, grid);
    }

    #[test]
    fn test_from_grid_has_entry_per_cell() {
        let grid = generate_default(3, 3, &plain_template()).unwrap();
        let record = from_grid(&grid);
        assert_eq!(record.tilemap.len(), 9);
        assert_eq!(record.tilemap[4], entry(1, 1, "Plain", Biome::Plain));
    }
}
