//! HEXPATH Core - Hex grid spatial queries and pathfinding
//!
//! This crate provides the pathfinding core of a hex-grid RTS:
//! - Hex geometry (axial coordinates, pixel conversion, cube rounding)
//! - Terrain classification and map input
//! - Grid ownership, nearest-tile lookup, neighbors and blocking
//! - A* search with caller-supplied passability
//! - Path progress tracking and a simple movable agent
//!
//! Rendering is left to the host; it only ever reads the tile sequences
//! produced here.

pub mod hex;
pub mod terrain;
pub mod grid;
pub mod pathfinding;
pub mod progress;
pub mod agent;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use hex::{
    axial_to_pixel, hexagon, pixel_to_axial, round_to_nearest_hex, FractionalHex, Hex, Layout,
    OffsetCoord, Point, DIRECTIONS,
};
pub use terrain::{Terrain, TerrainMap, TerrainProvider};
pub use grid::{Addressing, HexGrid, Occupant, OccupantId, Tile};
pub use pathfinding::{find_path, Path, PathFinder, PathFinderConfig, SearchStats};
pub use progress::{advance_path, remaining_ahead, PathProgress, DEFAULT_ARRIVAL_BUFFER};
pub use agent::{request_move, Agent, MoveOutcome, PassRule};
pub use config::MapConfig;
pub use error::GridError;
