//! Tile definitions
//!
//! A tile is one grid cell's record: which template it came from, where it
//! sits, its biome, its terrain features and an optional building.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A single cell of the world map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Template identifier this tile was built from
    pub tile_type_id: String,
    pub x: u32,
    pub y: u32,
    pub biome: Biome,
    pub features: Features,
    /// Placed structure, if any
    pub building: Option<String>,
}

impl Tile {
    pub fn new(x: u32, y: u32, tile_type_id: impl Into<String>, biome: Biome) -> Self {
        Self {
            tile_type_id: tile_type_id.into(),
            x,
            y,
            biome,
            features: Features::NONE,
            building: None,
        }
    }

    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn with_building(mut self, building: Option<String>) -> Self {
        self.building = building;
        self
    }

    /// Grid coordinates as a tuple
    #[inline]
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Check if a feature is present on this tile
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.insert(feature);
    }

    pub fn remove_feature(&mut self, feature: Feature) {
        self.features.remove(feature);
    }
}

/// Terrain category of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Biome {
    Plain,
    Desert,
    Mountain,
    Water,
    Swamp,
    Tundra,
    /// Fallback for unrecognised biome names
    #[default]
    Unknown,
}

impl Biome {
    /// Every concrete biome, excluding the `Unknown` fallback
    pub const ALL: [Biome; 6] = [
        Biome::Plain,
        Biome::Desert,
        Biome::Mountain,
        Biome::Water,
        Biome::Swamp,
        Biome::Tundra,
    ];

    /// Name used in map files and as the builtin template id
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Plain => "Plain",
            Biome::Desert => "Desert",
            Biome::Mountain => "Mountain",
            Biome::Water => "Water",
            Biome::Swamp => "Swamp",
            Biome::Tundra => "Tundra",
            Biome::Unknown => "Unknown",
        }
    }

    /// Parse a biome name, returning `None` for anything unrecognised
    pub fn from_name(name: &str) -> Option<Biome> {
        match name {
            "Plain" => Some(Biome::Plain),
            "Desert" => Some(Biome::Desert),
            "Mountain" => Some(Biome::Mountain),
            "Water" => Some(Biome::Water),
            "Swamp" => Some(Biome::Swamp),
            "Tundra" => Some(Biome::Tundra),
            "Unknown" => Some(Biome::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Biome {
    fn from(name: String) -> Self {
        Biome::from_name(&name).unwrap_or_else(|| {
            log::warn!("Unknown biome '{}', using {}", name, Biome::Unknown);
            Biome::Unknown
        })
    }
}

impl From<Biome> for String {
    fn from(biome: Biome) -> Self {
        biome.name().to_string()
    }
}

/// A single terrain feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Forest,
    River,
    Lake,
    Hill,
    Jungle,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Forest,
        Feature::River,
        Feature::Lake,
        Feature::Hill,
        Feature::Jungle,
    ];

    /// Bit this feature occupies in a `Features` mask
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Feature::Forest => 1 << 0,
            Feature::River => 1 << 1,
            Feature::Lake => 1 << 2,
            Feature::Hill => 1 << 3,
            Feature::Jungle => 1 << 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Feature::Forest => "Forest",
            Feature::River => "River",
            Feature::Lake => "Lake",
            Feature::Hill => "Hill",
            Feature::Jungle => "Jungle",
        }
    }
}

/// Combinable set of terrain features, stored as a bitmask
///
/// Serialized as a list of feature names so template files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Feature>", into = "Vec<Feature>")]
pub struct Features(u8);

impl Features {
    pub const NONE: Features = Features(0);
    pub const FOREST: Features = Features(1 << 0);
    pub const RIVER: Features = Features(1 << 1);
    pub const LAKE: Features = Features(1 << 2);
    pub const HILL: Features = Features(1 << 3);
    pub const JUNGLE: Features = Features(1 << 4);

    /// Raw mask value
    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when the feature's bit is set
    #[inline]
    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() == feature.bit()
    }

    #[inline]
    pub fn insert(&mut self, feature: Feature) {
        self.0 |= feature.bit();
    }

    #[inline]
    pub fn remove(&mut self, feature: Feature) {
        self.0 &= !feature.bit();
    }

    /// Flip a feature, returning whether it is now present
    pub fn toggle(&mut self, feature: Feature) -> bool {
        self.0 ^= feature.bit();
        self.contains(feature)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the features present, in declaration order
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<Feature> for Features {
    fn from(feature: Feature) -> Self {
        Features(feature.bit())
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

impl BitOrAssign for Features {
    fn bitor_assign(&mut self, rhs: Features) {
        self.0 |= rhs.0;
    }
}

impl From<Vec<Feature>> for Features {
    fn from(list: Vec<Feature>) -> Self {
        list.into_iter().fold(Features::NONE, |acc, f| acc | f.into())
    }
}

impl From<Features> for Vec<Feature> {
    fn from(features: Features) -> Self {
        features.iter().collect()
    }
}
