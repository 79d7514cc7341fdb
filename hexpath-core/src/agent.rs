//! Movable agents and the move-request API
//!
//! An agent is a plain struct with a passability rule. The host UI calls
//! [`request_move`], then [`Agent::update`] and [`Agent::sync_occupancy`]
//! once per tick.

use serde::{Deserialize, Serialize};

use crate::grid::{HexGrid, OccupantId, Tile};
use crate::hex::{Hex, Point};
use crate::pathfinding::PathFinder;
use crate::progress::PathProgress;

/// Which tiles an agent may cross
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassRule {
    /// Passable terrain only
    #[default]
    Land,
    /// Any terrain
    Amphibious,
}

impl PassRule {
    /// Blocked tiles are never allowed
    pub fn allows(self, tile: &Tile) -> bool {
        match self {
            PassRule::Land => !tile.is_blocked(),
            PassRule::Amphibious => !tile.blocked(),
        }
    }
}

/// Result of a move request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A path was found; the agent will walk `steps` tiles
    Moving { steps: usize },
    /// The agent already stands on the goal tile
    AlreadyThere,
    /// No tile the agent may enter is connected to the target
    Unreachable,
    /// The grid has no tiles
    OffGrid,
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: OccupantId,
    pub position: Point,
    /// Pixels per second
    pub speed: f64,
    pub rule: PassRule,
    progress: Option<PathProgress>,
    /// Tile holding this agent's occupant entry
    occupied: Option<Hex>,
}

impl Agent {
    pub fn new(id: OccupantId, position: Point, speed: f64, rule: PassRule) -> Self {
        Self {
            id,
            position,
            speed,
            rule,
            progress: None,
            occupied: None,
        }
    }

    pub fn progress(&self) -> Option<&PathProgress> {
        self.progress.as_ref()
    }

    pub fn is_moving(&self) -> bool {
        self.progress.is_some()
    }

    /// Drop the current path; the agent stops where it is
    pub fn cancel(&mut self) {
        self.progress = None;
    }

    /// Tile the agent is standing on (nearest center)
    pub fn current_tile(&self, grid: &HexGrid) -> Option<Hex> {
        grid.nearest_tile(self.position).map(|t| t.hex)
    }

    /// Tile the agent is registered on, if any
    pub fn occupied_tile(&self) -> Option<Hex> {
        self.occupied
    }

    /// Move the agent's occupant entry to the tile it now stands on.
    ///
    /// Agents register as non-blocking occupants so they never obstruct
    /// their own searches.
    pub fn sync_occupancy(&mut self, grid: &mut HexGrid) -> Option<Hex> {
        let here = self.current_tile(grid);
        if here != self.occupied {
            if let Some(old) = self.occupied {
                grid.vacate(old, self.id);
            }
            if let Some(hex) = here {
                grid.occupy(hex, self.id, false);
            }
            self.occupied = here;
        }
        here
    }

    /// Remove the agent's occupant entry from the grid
    pub fn leave(&mut self, grid: &mut HexGrid) {
        if let Some(old) = self.occupied.take() {
            grid.vacate(old, self.id);
        }
    }

    /// Steps a renderer should draw
    pub fn path_to_draw<'a>(&'a self, grid: &HexGrid) -> &'a [Hex] {
        match &self.progress {
            Some(progress) => progress.remaining_ahead(grid, self.position),
            None => &[],
        }
    }

    /// Move toward the next waypoint for `dt` seconds, popping waypoints as
    /// they are reached. Returns `true` while the agent still has a path.
    pub fn update(&mut self, dt: f64, grid: &HexGrid) -> bool {
        let Some(progress) = self.progress.as_mut() else {
            return false;
        };

        let mut budget = self.speed * dt;
        while budget > 0.0 {
            let Some(next) = progress.peek() else {
                break;
            };
            let Some(tile) = grid.tile(next) else {
                tracing::warn!("Agent {:?} skipping waypoint {} missing from grid", self.id, next);
                progress.advance();
                continue;
            };

            let distance = self.position.distance_to(tile.center);
            if distance <= budget {
                self.position = tile.center;
                budget -= distance;
                progress.advance();
            } else {
                let t = budget / distance;
                self.position = Point::new(
                    self.position.x + (tile.center.x - self.position.x) * t,
                    self.position.y + (tile.center.y - self.position.y) * t,
                );
                budget = 0.0;
            }
        }

        let done = progress.is_complete();
        if done {
            self.progress = None;
        }
        !done
    }
}

/// Plan a move for `agent` to the tile nearest `target`.
///
/// The goal is the nearest tile to `target` the agent's rule accepts. On any
/// outcome other than `Moving` the agent is left without a path.
pub fn request_move(
    agent: &mut Agent,
    grid: &HexGrid,
    finder: &mut PathFinder,
    target: Point,
) -> MoveOutcome {
    agent.progress = None;

    let Some(start) = grid.nearest_tile(agent.position) else {
        return MoveOutcome::OffGrid;
    };
    let rule = agent.rule;
    let Some(goal) = grid.find_nearest_tile(target, |t| rule.allows(t)) else {
        tracing::debug!("Agent {:?}: no enterable tile near target", agent.id);
        return MoveOutcome::Unreachable;
    };

    if start.hex == goal.hex {
        return MoveOutcome::AlreadyThere;
    }

    let path = finder.find_path(grid, start.hex, goal.hex, |t| rule.allows(t));
    if path.is_empty() {
        tracing::debug!("Agent {:?}: no path {} -> {}", agent.id, start.hex, goal.hex);
        return MoveOutcome::Unreachable;
    }

    let steps = path.len();
    agent.progress = Some(PathProgress::new(path));
    MoveOutcome::Moving { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{Layout, OffsetCoord};
    use crate::terrain::{Terrain, TerrainMap};

    fn island_grid() -> HexGrid {
        // Two grass banks separated by an ocean column
        let map = TerrainMap::new(vec![
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 0, 1, 1],
            vec![1, 1, 0, 1, 1],
        ]);
        HexGrid::build(&map, Layout::new(10.0, Point::new(10.0, 10.0)), 5, 4).unwrap()
    }

    fn center(grid: &HexGrid, col: i32, row: i32) -> Point {
        grid.tile_at_offset(col, row).unwrap().center
    }

    #[test]
    fn test_request_move_and_walk() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let mut agent = Agent::new(OccupantId(1), center(&grid, 0, 0), 20.0, PassRule::Land);
        let target = center(&grid, 1, 3);

        let outcome = request_move(&mut agent, &grid, &mut finder, target);
        assert!(matches!(outcome, MoveOutcome::Moving { steps: 3 }));
        assert!(agent.is_moving());
        assert_eq!(agent.path_to_draw(&grid).len(), 3);

        let mut ticks = 0;
        while agent.update(0.1, &grid) {
            ticks += 1;
            assert!(ticks < 1000, "agent never arrived");
        }
        assert_eq!(agent.position, target);
        assert_eq!(agent.current_tile(&grid), Some(OffsetCoord::new(1, 3).to_axial()));
        assert!(agent.path_to_draw(&grid).is_empty());
    }

    #[test]
    fn test_default_rule_is_land() {
        assert_eq!(PassRule::default(), PassRule::Land);
    }

    #[test]
    fn test_land_agent_cannot_cross_water() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let mut agent = Agent::new(OccupantId(1), center(&grid, 0, 1), 20.0, PassRule::Land);
        let outcome = request_move(&mut agent, &grid, &mut finder, center(&grid, 4, 1));
        assert_eq!(outcome, MoveOutcome::Unreachable);
        assert!(!agent.is_moving());
        assert!(!agent.update(1.0, &grid));
    }

    #[test]
    fn test_amphibious_agent_swims() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let mut agent = Agent::new(OccupantId(2), center(&grid, 0, 1), 20.0, PassRule::Amphibious);
        let outcome = request_move(&mut agent, &grid, &mut finder, center(&grid, 4, 1));
        assert_eq!(outcome, MoveOutcome::Moving { steps: 4 });
    }

    #[test]
    fn test_target_in_water_snaps_to_shore() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let mut agent = Agent::new(OccupantId(1), center(&grid, 0, 0), 20.0, PassRule::Land);
        let water = center(&grid, 2, 0);
        let near_west_shore = Point::new(water.x - 3.0, water.y);
        let outcome = request_move(&mut agent, &grid, &mut finder, near_west_shore);
        assert_eq!(outcome, MoveOutcome::Moving { steps: 1 });
        assert_eq!(
            agent.progress().unwrap().original(),
            &[OffsetCoord::new(1, 0).to_axial()]
        );
    }

    #[test]
    fn test_already_there_and_off_grid() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let here = center(&grid, 1, 1);
        let mut agent = Agent::new(OccupantId(1), here, 20.0, PassRule::Land);
        let nudged = Point::new(here.x + 1.0, here.y);
        assert_eq!(request_move(&mut agent, &grid, &mut finder, nudged), MoveOutcome::AlreadyThere);

        let empty = HexGrid::from_hexes(Vec::new(), |_| Terrain::Grass, Layout::default()).unwrap();
        assert_eq!(request_move(&mut agent, &empty, &mut finder, here), MoveOutcome::OffGrid);
    }

    #[test]
    fn test_occupancy_follows_agent() {
        let mut grid = island_grid();
        let mut finder = PathFinder::default();
        let start = OffsetCoord::new(0, 0).to_axial();
        let goal = OffsetCoord::new(1, 3).to_axial();
        let mut agent = Agent::new(OccupantId(4), center(&grid, 0, 0), 20.0, PassRule::Land);

        assert_eq!(agent.sync_occupancy(&mut grid), Some(start));
        request_move(&mut agent, &grid, &mut finder, center(&grid, 1, 3));
        while agent.update(0.1, &grid) {
            agent.sync_occupancy(&mut grid);
        }
        agent.sync_occupancy(&mut grid);

        assert_eq!(agent.occupied_tile(), Some(goal));
        assert!(grid.tile(start).unwrap().occupants().is_empty());
        assert_eq!(grid.tile(goal).unwrap().occupants()[0].id, OccupantId(4));
        let occupied = grid.tiles().iter().filter(|t| !t.occupants().is_empty()).count();
        assert_eq!(occupied, 1);
        assert!(!grid.is_blocked(goal));

        agent.leave(&mut grid);
        assert!(grid.tile(goal).unwrap().occupants().is_empty());
        assert_eq!(agent.occupied_tile(), None);
    }

    #[test]
    fn test_cancel_stops_agent() {
        let grid = island_grid();
        let mut finder = PathFinder::default();
        let mut agent = Agent::new(OccupantId(1), center(&grid, 0, 0), 5.0, PassRule::Land);
        request_move(&mut agent, &grid, &mut finder, center(&grid, 1, 3));
        assert!(agent.update(0.5, &grid));
        let stopped_at = agent.position;
        agent.cancel();
        assert!(!agent.update(0.5, &grid));
        assert_eq!(agent.position, stopped_at);
    }
}
