//! MapConfig - grid layout plus terrain, stored as JSON

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::HexGrid;
use crate::hex::{Layout, Point};
use crate::terrain::TerrainMap;

const DEFAULT_HEX_SIZE: f64 = 32.0;

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_hex_size() -> f64 {
    DEFAULT_HEX_SIZE
}

/// Everything needed to build a grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Hex radius in pixels
    #[serde(default = "default_hex_size")]
    pub hex_size: f64,
    /// Pixel position of the (0, 0) tile
    #[serde(default)]
    pub origin: Point,
    /// Grid columns; defaults to the terrain width
    #[serde(default)]
    pub width: Option<usize>,
    /// Grid rows; defaults to the terrain height
    #[serde(default)]
    pub height: Option<usize>,
    /// Rows of 0 (ocean) / 1 (grass)
    pub terrain: TerrainMap,
}

impl MapConfig {
    pub fn new(name: &str, terrain: TerrainMap) -> Self {
        Self {
            name: name.to_string(),
            hex_size: DEFAULT_HEX_SIZE,
            origin: Point::default(),
            width: None,
            height: None,
            terrain,
        }
    }

    /// Random map with the given ocean density
    pub fn random<R: Rng>(rng: &mut R, name: &str, width: usize, height: usize, ocean_density: f64) -> Self {
        Self::new(name, TerrainMap::random(rng, width, height, ocean_density))
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.hex_size, self.origin)
    }

    pub fn grid_width(&self) -> usize {
        self.width.unwrap_or_else(|| self.terrain.width())
    }

    pub fn grid_height(&self) -> usize {
        self.height.unwrap_or_else(|| self.terrain.height())
    }

    /// Build the grid this config describes
    pub fn build_grid(&self) -> Result<HexGrid, GridError> {
        HexGrid::build(&self.terrain, self.layout(), self.grid_width(), self.grid_height())
    }

    /// Parse JSON (handles both flat and wrapped formats)
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        if let Ok(config) = serde_json::from_str::<MapConfig>(content) {
            return Ok(config);
        }

        #[derive(Deserialize)]
        struct Wrapped {
            name: Option<String>,
            map: MapConfig,
        }

        if let Ok(wrapped) = serde_json::from_str::<Wrapped>(content) {
            let mut config = wrapped.map;
            if let Some(name) = wrapped.name {
                config.name = name;
            }
            return Ok(config);
        }

        // Fall back to the flat error for debugging
        let config: MapConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
