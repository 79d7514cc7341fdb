//! Hex grid: tile ownership, spatial lookup and passability state

use crate::error::GridError;
use crate::hex::{Hex, Layout, OffsetCoord, Point};
use crate::terrain::{Terrain, TerrainProvider};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// TILES
// ============================================================================

/// Handle to something standing on a tile. The grid does not own occupants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: OccupantId,
    /// Whether this occupant obstructs movement through the tile
    pub blocks: bool,
}

/// A single cell of the grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    pub hex: Hex,
    pub offset: OffsetCoord,
    /// Pixel-space center, computed once at build time
    pub center: Point,
    pub terrain: Terrain,
    /// Set through `HexGrid::set_blocked`; occupant blocking is derived on read
    obstructed: bool,
    occupants: Vec<Occupant>,
}

impl Tile {
    fn new(hex: Hex, center: Point, terrain: Terrain) -> Self {
        Self {
            hex,
            offset: OffsetCoord::from_axial(hex),
            center,
            terrain,
            obstructed: false,
            occupants: Vec::new(),
        }
    }

    /// Obstructed by `set_blocked` or by a blocking occupant. Ignores terrain.
    pub fn blocked(&self) -> bool {
        self.obstructed || self.occupants.iter().any(|o| o.blocks)
    }

    /// Blocked by an obstruction or by impassable terrain
    pub fn is_blocked(&self) -> bool {
        self.blocked() || !self.terrain.is_passable()
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }
}

/// How tile adjacency is computed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addressing {
    /// Built from a rectangular (col, row) index; neighbors use the parity tables
    Offset,
    /// Built from an explicit hex set; neighbors use the axial directions
    Axial,
}

// ============================================================================
// GRID
// ============================================================================

/// Owned collection of tiles. Pass it by reference; there is no global grid.
#[derive(Clone, Debug)]
pub struct HexGrid {
    /// Tiles in build order
    tiles: Vec<Tile>,
    index: FxHashMap<Hex, usize>,
    layout: Layout,
    addressing: Addressing,
    width: usize,
    height: usize,
}

impl HexGrid {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Build a `width` x `height` rectangular grid.
    ///
    /// Odd rows are shifted right by half a hex. Cells the provider knows
    /// nothing about become ocean.
    pub fn build<T: TerrainProvider + ?Sized>(
        terrain: &T,
        layout: Layout,
        width: usize,
        height: usize,
    ) -> Result<Self, GridError> {
        validate_layout(&layout)?;
        let invalid = || GridError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        let cols = i32::try_from(width).map_err(|_| invalid())?;
        let rows = i32::try_from(height).map_err(|_| invalid())?;
        let count = width
            .checked_mul(height)
            .filter(|&n| i32::try_from(n).is_ok())
            .ok_or_else(invalid)?;

        let mut grid = Self::empty(layout, Addressing::Offset, count);
        grid.width = width;
        grid.height = height;

        for row in 0..rows {
            for col in 0..cols {
                let hex = OffsetCoord::new(col, row).to_axial();
                let kind = terrain.terrain_at(col, row).unwrap_or_default();
                grid.insert(hex, kind)?;
            }
        }

        tracing::debug!(
            "Built {}x{} grid ({} passable tiles)",
            width,
            height,
            grid.passable_count()
        );
        Ok(grid)
    }

    /// Build an axial-addressed grid from an explicit set of hexes.
    ///
    /// A repeated hex is a caller error and is rejected.
    pub fn from_hexes<I, F>(hexes: I, terrain: F, layout: Layout) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = Hex>,
        F: Fn(Hex) -> Terrain,
    {
        validate_layout(&layout)?;
        let hexes = hexes.into_iter();
        let mut grid = Self::empty(layout, Addressing::Axial, hexes.size_hint().0);

        for hex in hexes {
            grid.insert(hex, terrain(hex))?;
        }

        let (min_row, max_row) = grid
            .tiles
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), t| (lo.min(t.hex.r), hi.max(t.hex.r)));
        let (min_q, max_q) = grid
            .tiles
            .iter()
            .fold((i32::MAX, i32::MIN), |(lo, hi), t| (lo.min(t.hex.q), hi.max(t.hex.q)));
        if !grid.tiles.is_empty() {
            grid.height = (max_row - min_row + 1) as usize;
            grid.width = (max_q - min_q + 1) as usize;
        }

        Ok(grid)
    }

    fn empty(layout: Layout, addressing: Addressing, capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            tiles: Vec::with_capacity(capacity),
            index,
            layout,
            addressing,
            width: 0,
            height: 0,
        }
    }

    fn insert(&mut self, hex: Hex, terrain: Terrain) -> Result<(), GridError> {
        if self.index.contains_key(&hex) {
            return Err(GridError::DuplicateTile(hex));
        }
        let center = self.layout.hex_to_pixel(hex);
        self.index.insert(hex, self.tiles.len());
        self.tiles.push(Tile::new(hex, center, terrain));
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn addressing(&self) -> Addressing {
        self.addressing
    }

    /// Columns (offset grids) or axial q-span (axial grids)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows (offset grids) or axial r-span (axial grids)
    pub fn height(&self) -> usize {
        self.height
    }

    /// All tiles in build order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.index.contains_key(&hex)
    }

    /// Number of tiles passing the default predicate
    pub fn passable_count(&self) -> usize {
        self.tiles.iter().filter(|t| Self::is_passable(t)).count()
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Exact lookup by axial coordinates
    pub fn tile(&self, hex: Hex) -> Option<&Tile> {
        self.index.get(&hex).map(|&i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        match self.index.get(&hex) {
            Some(&i) => Some(&mut self.tiles[i]),
            None => None,
        }
    }

    /// Exact lookup by (col, row) address
    pub fn tile_at_offset(&self, col: i32, row: i32) -> Option<&Tile> {
        self.tile(OffsetCoord::new(col, row).to_axial())
    }

    /// Tile whose hex contains `point`, if it exists
    pub fn tile_at_pixel(&self, point: Point) -> Option<&Tile> {
        self.tile(self.layout.hex_at_pixel(point))
    }

    /// Tile with the closest center to `point` among tiles accepted by `predicate`.
    ///
    /// Linear scan; on equal distance the earlier tile in build order wins.
    pub fn find_nearest_tile<P>(&self, point: Point, predicate: P) -> Option<&Tile>
    where
        P: Fn(&Tile) -> bool,
    {
        let mut best: Option<(&Tile, f64)> = None;
        for tile in self.tiles.iter().filter(|t| predicate(t)) {
            let d = tile.center.distance_squared(point);
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((tile, d)),
            }
        }
        best.map(|(tile, _)| tile)
    }

    /// Nearest tile regardless of passability
    pub fn nearest_tile(&self, point: Point) -> Option<&Tile> {
        self.find_nearest_tile(point, |_| true)
    }

    // ========================================================================
    // ADJACENCY
    // ========================================================================

    /// Default passability: passable terrain and not blocked
    pub fn is_passable(tile: &Tile) -> bool {
        !tile.is_blocked()
    }

    /// Existing neighbors of `hex` accepted by `passable`, in direction order
    pub fn neighbors<P>(&self, hex: Hex, passable: P) -> Vec<&Tile>
    where
        P: Fn(&Tile) -> bool,
    {
        let mut out = Vec::with_capacity(6);
        self.for_each_neighbor(hex, |tile| {
            if passable(tile) {
                out.push(tile);
            }
        });
        out
    }

    /// Neighbors passing the default predicate
    pub fn passable_neighbors(&self, hex: Hex) -> Vec<&Tile> {
        self.neighbors(hex, Self::is_passable)
    }

    /// Visit every existing neighbor of `hex` without allocating
    pub(crate) fn for_each_neighbor<'a, F>(&'a self, hex: Hex, mut visit: F)
    where
        F: FnMut(&'a Tile),
    {
        match self.addressing {
            Addressing::Axial => {
                for n in hex.neighbors() {
                    if let Some(tile) = self.tile(n) {
                        visit(tile);
                    }
                }
            }
            Addressing::Offset => {
                for n in OffsetCoord::from_axial(hex).neighbors() {
                    if let Some(tile) = self.tile_at_offset(n.col, n.row) {
                        visit(tile);
                    }
                }
            }
        }
    }

    // ========================================================================
    // BLOCKING & OCCUPANCY
    // ========================================================================

    /// Set the obstruction flag. Terrain and occupants are untouched.
    ///
    /// Returns `false` if there is no tile at `hex`.
    pub fn set_blocked(&mut self, hex: Hex, blocked: bool) -> bool {
        match self.tile_mut(hex) {
            Some(tile) => {
                tile.obstructed = blocked;
                true
            }
            None => false,
        }
    }

    /// Missing tiles count as blocked
    pub fn is_blocked(&self, hex: Hex) -> bool {
        self.tile(hex).map_or(true, Tile::is_blocked)
    }

    /// Place an occupant on a tile, replacing any earlier entry for `id`.
    /// The tile is blocked while any blocking occupant stands on it.
    pub fn occupy(&mut self, hex: Hex, id: OccupantId, blocks: bool) -> bool {
        let Some(tile) = self.tile_mut(hex) else {
            return false;
        };
        tile.occupants.retain(|o| o.id != id);
        tile.occupants.push(Occupant { id, blocks });
        true
    }

    /// Remove an occupant. Returns `false` if it was not on the tile.
    pub fn vacate(&mut self, hex: Hex, id: OccupantId) -> bool {
        let Some(tile) = self.tile_mut(hex) else {
            return false;
        };
        let before = tile.occupants.len();
        tile.occupants.retain(|o| o.id != id);
        tile.occupants.len() != before
    }
}

fn validate_layout(layout: &Layout) -> Result<(), GridError> {
    if !layout.size.is_finite() || layout.size <= 0.0 {
        return Err(GridError::InvalidHexSize(layout.size));
    }
    Ok(())
}
