//! Terrain classification and the terrain-provider seam used at build time

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Map cell value for passable land
pub const GRASS_CELL: u8 = 1;
/// Map cell value for water
pub const OCEAN_CELL: u8 = 0;

/// Terrain classification of a tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    #[default]
    Ocean,
}

impl Terrain {
    /// Whether land units may cross this terrain
    pub fn is_passable(self) -> bool {
        matches!(self, Terrain::Grass)
    }

    /// Any value other than `GRASS_CELL` is ocean
    pub fn from_cell(cell: u8) -> Self {
        if cell == GRASS_CELL {
            Terrain::Grass
        } else {
            Terrain::Ocean
        }
    }

    pub fn to_cell(self) -> u8 {
        match self {
            Terrain::Grass => GRASS_CELL,
            Terrain::Ocean => OCEAN_CELL,
        }
    }
}

/// Source of terrain for grid construction.
///
/// Returning `None` means the cell is outside the map; the grid treats those
/// cells as ocean.
pub trait TerrainProvider {
    fn terrain_at(&self, col: i32, row: i32) -> Option<Terrain>;
}

impl<F> TerrainProvider for F
where
    F: Fn(i32, i32) -> Option<Terrain>,
{
    fn terrain_at(&self, col: i32, row: i32) -> Option<Terrain> {
        self(col, row)
    }
}

/// Rectangular 0/1 terrain map, indexed `cells[row][col]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainMap {
    cells: Vec<Vec<u8>>,
}

impl TerrainMap {
    pub fn new(cells: Vec<Vec<u8>>) -> Self {
        Self { cells }
    }

    /// Map where every cell is grass
    pub fn filled(width: usize, height: usize, terrain: Terrain) -> Self {
        Self::new(vec![vec![terrain.to_cell(); width]; height])
    }

    /// Random map where each cell is ocean with probability `ocean_density`
    pub fn random<R: Rng>(rng: &mut R, width: usize, height: usize, ocean_density: f64) -> Self {
        let density = if ocean_density.is_nan() {
            0.0
        } else {
            ocean_density.clamp(0.0, 1.0)
        };
        let cells = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| if rng.gen_bool(density) { OCEAN_CELL } else { GRASS_CELL })
                    .collect()
            })
            .collect();
        Self::new(cells)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Width of the widest row
    pub fn width(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn set(&mut self, col: usize, row: usize, terrain: Terrain) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = terrain.to_cell();
        }
    }
}

impl TerrainProvider for TerrainMap {
    fn terrain_at(&self, col: i32, row: i32) -> Option<Terrain> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(|&cell| Terrain::from_cell(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_terrain_is_ocean() {
        assert_eq!(Terrain::default(), Terrain::Ocean);
        assert!(!Terrain::default().is_passable());
    }

    #[test]
    fn test_cell_classification() {
        assert_eq!(Terrain::from_cell(1), Terrain::Grass);
        assert_eq!(Terrain::from_cell(0), Terrain::Ocean);
        assert_eq!(Terrain::from_cell(7), Terrain::Ocean);
        assert!(Terrain::Grass.is_passable());
        assert!(!Terrain::Ocean.is_passable());
    }

    #[test]
    fn test_map_lookup_out_of_bounds() {
        let map = TerrainMap::new(vec![vec![1, 0], vec![1]]);
        assert_eq!(map.terrain_at(0, 0), Some(Terrain::Grass));
        assert_eq!(map.terrain_at(1, 0), Some(Terrain::Ocean));
        assert_eq!(map.terrain_at(1, 1), None);
        assert_eq!(map.terrain_at(-1, 0), None);
        assert_eq!(map.terrain_at(0, 5), None);
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |col: i32, _row: i32| Some(if col % 2 == 0 { Terrain::Grass } else { Terrain::Ocean });
        assert_eq!(provider.terrain_at(2, 9), Some(Terrain::Grass));
        assert_eq!(provider.terrain_at(3, 9), Some(Terrain::Ocean));
    }

    #[test]
    fn test_random_map_is_seeded() {
        let a = TerrainMap::random(&mut ChaCha8Rng::seed_from_u64(7), 12, 9, 0.3);
        let b = TerrainMap::random(&mut ChaCha8Rng::seed_from_u64(7), 12, 9, 0.3);
        assert_eq!(a, b);
        assert_eq!(a.width(), 12);
        assert_eq!(a.height(), 9);

        let dry = TerrainMap::random(&mut ChaCha8Rng::seed_from_u64(1), 5, 5, 0.0);
        assert!(dry.rows().iter().flatten().all(|&c| c == GRASS_CELL));
    }
}
