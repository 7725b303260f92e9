//! Tile colors and glyphs

use ratatui::style::Color;

use crate::world::{Biome, Feature, Features};

/// Background color for a biome
pub fn biome_color(biome: Biome) -> Color {
    let (r, g, b) = match biome {
        Biome::Plain => (0, 128, 0),
        Biome::Desert => (200, 180, 0),
        Biome::Mountain => (150, 74, 0),
        Biome::Water => (0, 0, 200),
        Biome::Swamp => (128, 128, 0),
        Biome::Tundra => (128, 128, 128),
        Biome::Unknown => (200, 0, 200),
    };
    Color::Rgb(r, g, b)
}

/// Glyph for the most prominent feature on a tile
pub fn feature_glyph(features: Features) -> char {
    // Later entries win: a forested hill draws as a hill
    let mut glyph = '.';
    for feature in features.iter() {
        glyph = match feature {
            Feature::Forest => '♣',
            Feature::River => '~',
            Feature::Lake => 'o',
            Feature::Hill => '^',
            Feature::Jungle => '%',
        };
    }
    glyph
}

/// Foreground color that stays readable on top of `biome_color`
pub fn glyph_color(biome: Biome) -> Color {
    match biome {
        Biome::Desert | Biome::Tundra => Color::Black,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_glyph() {
        assert_eq!(feature_glyph(Features::NONE), '.');
        assert_eq!(feature_glyph(Features::RIVER), '~');
        assert_eq!(feature_glyph(Features::FOREST | Features::HILL), '^');
    }

    #[test]
    fn test_every_biome_has_distinct_color() {
        let mut colors: Vec<Color> = Biome::ALL.iter().map(|b| biome_color(*b)).collect();
        colors.push(biome_color(Biome::Unknown));
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
