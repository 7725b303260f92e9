//! Procedural terrain generator
//!
//! Picks a biome per cell from fractal-noise elevation and moisture fields,
//! then scatters features with a seeded RNG. The same seed always produces
//! the same map.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{builtin_template, TemplateRegistry, TileTemplate};
use crate::world::{Biome, Feature, GridError, TileGrid};

/// Tunables for terrain generation
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    /// Noise sampling step per cell (smaller = larger landmasses)
    pub scale: f64,
    /// Elevation below this is water
    pub sea_level: f64,
    /// Elevation above this is mountain
    pub mountain_level: f64,
    /// Moisture below this is desert
    pub dry_level: f64,
    /// Moisture above this (on low ground) is swamp
    pub wet_level: f64,
    /// Distance from the equator row, 0..1, beyond which land is tundra
    pub polar_band: f64,
    /// Chance of a forest on plains
    pub forest_chance: f64,
    /// Chance of a river on wet plains
    pub river_chance: f64,
    /// Chance of jungle in swamps
    pub jungle_chance: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            scale: 0.08,
            sea_level: -0.15,
            mountain_level: 0.45,
            dry_level: -0.25,
            wet_level: 0.3,
            polar_band: 0.85,
            forest_chance: 0.2,
            river_chance: 0.1,
            jungle_chance: 0.15,
        }
    }
}

impl TerrainConfig {
    /// Choose a biome from sampled values
    pub fn classify(&self, elevation: f64, moisture: f64, latitude: f64) -> Biome {
        if elevation < self.sea_level {
            Biome::Water
        } else if elevation > self.mountain_level {
            Biome::Mountain
        } else if latitude > self.polar_band {
            Biome::Tundra
        } else if moisture < self.dry_level {
            Biome::Desert
        } else if moisture > self.wet_level && elevation < 0.05 {
            Biome::Swamp
        } else {
            Biome::Plain
        }
    }
}

/// Generate terrain with the default configuration
pub fn generate_terrain(
    width: u32,
    height: u32,
    seed: u64,
    registry: &TemplateRegistry,
) -> Result<TileGrid, GridError> {
    generate_terrain_with(width, height, seed, registry, &TerrainConfig::default())
}

/// Generate terrain.
///
/// Each cell uses the registry template named after its biome, or the
/// builtin template for that biome when the registry has none.
pub fn generate_terrain_with(
    width: u32,
    height: u32,
    seed: u64,
    registry: &TemplateRegistry,
    config: &TerrainConfig,
) -> Result<TileGrid, GridError> {
    let noise_seed = (seed ^ (seed >> 32)) as u32;
    let elevation = Fbm::<Perlin>::new(noise_seed).set_octaves(4);
    let moisture = Fbm::<Perlin>::new(noise_seed.wrapping_add(0x9E37_79B9)).set_octaves(3);
    let mut rng = StdRng::seed_from_u64(seed);

    let templates: Vec<TileTemplate> = Biome::ALL
        .iter()
        .map(|&b| registry.resolve(b.name()).cloned().unwrap_or_else(|_| builtin_template(b)))
        .collect();

    let grid = TileGrid::from_fn(width, height, |x, y| {
        let point = [x as f64 * config.scale, y as f64 * config.scale];
        let e = elevation.get(point);
        let m = moisture.get(point);
        let latitude = latitude(y, height);

        let biome = config.classify(e, m, latitude);
        let template = templates
            .iter()
            .find(|t| t.id == biome.name())
            .cloned()
            .unwrap_or_else(|| builtin_template(biome));

        let mut tile = template.instantiate(x, y);
        match biome {
            Biome::Plain => {
                if rng.gen_bool(config.forest_chance) {
                    tile.add_feature(Feature::Forest);
                }
                if m > 0.0 && rng.gen_bool(config.river_chance) {
                    tile.add_feature(Feature::River);
                }
            }
            Biome::Swamp => {
                if rng.gen_bool(config.jungle_chance) {
                    tile.add_feature(Feature::Jungle);
                }
            }
            _ => {}
        }
        tile
    })?;

    log::info!("Generated {}x{} terrain from seed {}", width, height, seed);
    Ok(grid)
}

/// Normalised distance of row `y` from the middle row, 0 at the equator
fn latitude(y: u32, height: u32) -> f64 {
    if height <= 1 {
        return 0.0;
    }
    let t = y as f64 / (height - 1) as f64;
    (t * 2.0 - 1.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_map() {
        let registry = TemplateRegistry::with_builtins();
        let a = generate_terrain(24, 16, 42, &registry).unwrap();
        let b = generate_terrain(24, 16, 42, &registry).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 24 * 16);
    }

    #[test]
    fn test_cells_use_concrete_biomes() {
        let registry = TemplateRegistry::with_builtins();
        let grid = generate_terrain(20, 20, 7, &registry).unwrap();
        for (x, y, tile) in grid.iter() {
            assert_eq!(tile.position(), (x, y));
            assert_ne!(tile.biome, Biome::Unknown);
            assert_eq!(tile.tile_type_id, tile.biome.name());
        }
    }

    #[test]
    fn test_registry_templates_take_priority() {
        let mut registry = TemplateRegistry::new();
        registry.register(TileTemplate::new("Water", Biome::Water).with_building("Buoy"));

        // Everything below sea level
        let config = TerrainConfig { sea_level: 10.0, ..TerrainConfig::default() };
        let grid = generate_terrain_with(5, 5, 1, &registry, &config).unwrap();
        assert!(grid.iter().all(|(_, _, t)| t.building.as_deref() == Some("Buoy")));
    }

    #[test]
    fn test_empty_registry_falls_back_to_builtins() {
        let registry = TemplateRegistry::new();
        let grid = generate_terrain(8, 8, 3, &registry).unwrap();
        assert!(grid.iter().all(|(_, _, t)| t.tile_type_id == t.biome.name()));
    }

    #[test]
    fn test_classify_bands() {
        let config = TerrainConfig::default();
        assert_eq!(config.classify(-0.5, 0.0, 0.0), Biome::Water);
        assert_eq!(config.classify(0.6, 0.0, 0.0), Biome::Mountain);
        assert_eq!(config.classify(0.1, 0.0, 0.95), Biome::Tundra);
        assert_eq!(config.classify(0.1, -0.5, 0.0), Biome::Desert);
        assert_eq!(config.classify(0.0, 0.5, 0.0), Biome::Swamp);
        assert_eq!(config.classify(0.2, 0.0, 0.0), Biome::Plain);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let registry = TemplateRegistry::with_builtins();
        assert!(matches!(
            generate_terrain(0, 4, 1, &registry),
            Err(GridError::InvalidDimensions { .. })
        ));
    }
}
