//! A* pathfinding over a hex grid
//!
//! Every step costs 1 and the heuristic is the hex distance, which is
//! admissible and consistent, so returned paths are shortest paths.
//!
//! Open-set ties are broken deterministically: lowest f, then lowest h
//! (closest to the goal), then the entry pushed first.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::grid::{HexGrid, Tile};
use crate::hex::Hex;

// ============================================================================
// PATH
// ============================================================================

/// Ordered steps from (exclusive) start to (inclusive) goal.
///
/// Empty means no path. A single step equal to the start means the caller is
/// already at the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Hex>,
}

impl Path {
    pub fn unreachable() -> Self {
        Self { steps: Vec::new() }
    }

    fn already_there(hex: Hex) -> Self {
        Self { steps: vec![hex] }
    }

    pub fn steps(&self) -> &[Hex] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Hex> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn goal(&self) -> Option<Hex> {
        self.steps.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hex> {
        self.steps.iter()
    }
}

impl From<Vec<Hex>> for Path {
    fn from(steps: Vec<Hex>) -> Self {
        Self { steps }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Hex;
    type IntoIter = std::slice::Iter<'a, Hex>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

// ============================================================================
// CONFIG & STATS
// ============================================================================

/// Pathfinder configuration
#[derive(Clone, Debug, Default)]
pub struct PathFinderConfig {
    /// Give up after expanding this many tiles (None = search the whole grid)
    pub max_expansions: Option<usize>,
}

impl PathFinderConfig {
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }
}

/// Counters from the most recent search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Tiles moved to the closed set
    pub expanded: usize,
    /// Entries pushed onto the open heap
    pub pushed: usize,
    /// Search stopped at `max_expansions`
    pub truncated: bool,
}

// ============================================================================
// OPEN SET
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    h: u32,
    seq: u64,
    hex: Hex,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on every key: BinaryHeap is a max-heap
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy, Debug)]
struct NodeRecord {
    g: u32,
    parent: Option<Hex>,
}

// ============================================================================
// PATHFINDER
// ============================================================================

/// Reusable A* searcher. Scratch buffers are kept between calls.
#[derive(Debug, Default)]
pub struct PathFinder {
    config: PathFinderConfig,
    open: BinaryHeap<OpenEntry>,
    records: FxHashMap<Hex, NodeRecord>,
    closed: FxHashSet<Hex>,
    next_seq: u64,
    stats: SearchStats,
}

impl PathFinder {
    pub fn new(config: PathFinderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Shortest path from `start` to `goal` through tiles accepted by `passable`.
    ///
    /// The start tile itself is never tested against `passable`. A missing
    /// start or goal, a goal rejected by `passable`, or a disconnected goal all
    /// give an empty path.
    pub fn find_path<P>(&mut self, grid: &HexGrid, start: Hex, goal: Hex, passable: P) -> Path
    where
        P: Fn(&Tile) -> bool,
    {
        self.reset();

        if !grid.contains(start) {
            tracing::debug!("Path start {} is not on the grid", start);
            return Path::unreachable();
        }
        let Some(goal_tile) = grid.tile(goal) else {
            tracing::debug!("Path goal {} is not on the grid", goal);
            return Path::unreachable();
        };
        if start == goal {
            return Path::already_there(start);
        }
        if !passable(goal_tile) {
            tracing::debug!("Path goal {} is not passable", goal);
            return Path::unreachable();
        }

        self.records.insert(start, NodeRecord { g: 0, parent: None });
        self.push(start, 0, start.distance_to(goal));

        while let Some(current) = self.open.pop() {
            if self.closed.contains(&current.hex) {
                continue;
            }

            if current.hex == goal {
                let path = self.reconstruct(goal);
                tracing::debug!(
                    "Path {} -> {}: {} steps ({} expanded)",
                    start,
                    goal,
                    path.len(),
                    self.stats.expanded
                );
                return path;
            }

            if let Some(limit) = self.config.max_expansions {
                if self.stats.expanded >= limit {
                    self.stats.truncated = true;
                    tracing::warn!(
                        "Path search {} -> {} gave up after {} expansions",
                        start,
                        goal,
                        limit
                    );
                    return Path::unreachable();
                }
            }

            self.closed.insert(current.hex);
            self.stats.expanded += 1;

            let tentative = current.f - current.h + 1;
            grid.for_each_neighbor(current.hex, |tile| {
                if self.closed.contains(&tile.hex) || !passable(tile) {
                    return;
                }
                let better = self
                    .records
                    .get(&tile.hex)
                    .map_or(true, |record| tentative < record.g);
                if better {
                    self.records.insert(
                        tile.hex,
                        NodeRecord {
                            g: tentative,
                            parent: Some(current.hex),
                        },
                    );
                    self.push(tile.hex, tentative, tile.hex.distance_to(goal));
                }
            });
        }

        tracing::debug!(
            "No path {} -> {} ({} expanded)",
            start,
            goal,
            self.stats.expanded
        );
        Path::unreachable()
    }

    fn reset(&mut self) {
        self.open.clear();
        self.records.clear();
        self.closed.clear();
        self.next_seq = 0;
        self.stats = SearchStats::default();
    }

    fn push(&mut self, hex: Hex, g: u32, h: u32) {
        self.open.push(OpenEntry {
            f: g + h,
            h,
            seq: self.next_seq,
            hex,
        });
        self.next_seq += 1;
        self.stats.pushed += 1;
    }

    /// Follow back-pointers from `goal`; the start is left out
    fn reconstruct(&self, goal: Hex) -> Path {
        let mut steps = Vec::new();
        let mut cursor = goal;
        while let Some(parent) = self.records.get(&cursor).and_then(|r| r.parent) {
            steps.push(cursor);
            cursor = parent;
        }
        steps.reverse();
        Path::from(steps)
    }
}

/// One-off search with a fresh [`PathFinder`]
pub fn find_path<P>(grid: &HexGrid, start: Hex, goal: Hex, passable: P) -> Path
where
    P: Fn(&Tile) -> bool,
{
    PathFinder::default().find_path(grid, start, goal, passable)
}
