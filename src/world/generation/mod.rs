//! Map generation
//!
//! The deterministic default generator used when no stored map exists, plus
//! a seeded procedural terrain generator.

pub mod terrain;

pub use terrain::{generate_terrain, generate_terrain_with, TerrainConfig};

use std::num::NonZeroU32;

use super::{GridError, Tile, TileGrid};
use crate::data::{plain_template, TileTemplate};

/// Fill a `width` x `height` grid with tiles built from `template`.
///
/// No randomness is involved: equal inputs always give equal grids.
pub fn generate_default(width: u32, height: u32, template: &TileTemplate) -> Result<TileGrid, GridError> {
    TileGrid::check_dimensions("generate_default", width, height)?;
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(w), Some(h)) => Ok(generate_flat(w, h, template)),
        _ => Err(GridError::InvalidDimensions {
            op: "generate_default",
            width,
            height,
        }),
    }
}

/// Infallible form of [`generate_default`]. Sizes must already have passed
/// `TileGrid::check_dimensions`.
pub(crate) fn generate_flat(width: NonZeroU32, height: NonZeroU32, template: &TileTemplate) -> TileGrid {
    let (width, height) = (width.get(), height.get());
    let mut tiles = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            tiles.push(template.instantiate(x, y));
        }
    }
    log::debug!("Generated {}x{} default grid of '{}'", width, height, template.id);
    TileGrid::from_tiles_unchecked(width, height, tiles)
}

/// The generator's default tile for a cell: builtin Plain
pub fn default_tile(x: u32, y: u32) -> Tile {
    plain_template().instantiate(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Biome, Feature, Features};

    #[test]
    fn test_default_grid_size_and_biome() {
        let template = TileTemplate::new("Tundra", Biome::Tundra).with_features(Features::HILL);
        for (w, h) in [(1, 1), (3, 3), (10, 4), (7, 13)] {
            let grid = generate_default(w, h, &template).unwrap();
            assert_eq!(grid.len(), (w * h) as usize);
            for (x, y, tile) in grid.iter() {
                assert_eq!(tile.position(), (x, y));
                assert_eq!(tile.biome, Biome::Tundra);
                assert_eq!(tile.tile_type_id, "Tundra");
                assert!(tile.has_feature(Feature::Hill));
            }
        }
    }

    #[test]
    fn test_default_is_deterministic() {
        let template = plain_template();
        let a = generate_default(6, 5, &template).unwrap();
        let b = generate_default(6, 5, &template).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_rejects_zero_dimensions() {
        let template = plain_template();
        assert_eq!(
            generate_default(0, 3, &template),
            Err(GridError::InvalidDimensions { op: "generate_default", width: 0, height: 3 })
        );
        assert!(matches!(
            generate_default(u32::MAX, 2, &template),
            Err(GridError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_default_tile_is_plain() {
        let tile = default_tile(2, 9);
        assert_eq!(tile.position(), (2, 9));
        assert_eq!(tile.biome, Biome::Plain);
        assert_eq!(tile.tile_type_id, "Plain");
    }
}
