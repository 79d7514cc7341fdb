//! Cursor over an active path
//!
//! Holds no grid authority: it only tracks which steps of a computed path are
//! behind the agent and which are still ahead.

use crate::grid::HexGrid;
use crate::hex::{Hex, Point};
use crate::pathfinding::Path;

/// Distance in pixels at which the next waypoint stops being drawn
pub const DEFAULT_ARRIVAL_BUFFER: f64 = 5.0;

/// Per-agent path state: the original path and how far along it the agent is
#[derive(Clone, Debug, PartialEq)]
pub struct PathProgress {
    path: Vec<Hex>,
    cursor: usize,
    arrival_buffer: f64,
}

impl PathProgress {
    pub fn new(path: Path) -> Self {
        Self {
            path: path.into_steps(),
            cursor: 0,
            arrival_buffer: DEFAULT_ARRIVAL_BUFFER,
        }
    }

    pub fn with_arrival_buffer(mut self, buffer: f64) -> Self {
        self.arrival_buffer = buffer.max(0.0);
        self
    }

    pub fn arrival_buffer(&self) -> f64 {
        self.arrival_buffer
    }

    /// The full path as originally computed
    pub fn original(&self) -> &[Hex] {
        &self.path
    }

    /// Steps already popped
    pub fn consumed(&self) -> &[Hex] {
        &self.path[..self.cursor]
    }

    /// Steps not yet popped, next waypoint first
    pub fn remaining(&self) -> &[Hex] {
        &self.path[self.cursor..]
    }

    pub fn peek(&self) -> Option<Hex> {
        self.path.get(self.cursor).copied()
    }

    /// Pop the next waypoint. `None` means the path is complete.
    pub fn advance(&mut self) -> Option<Hex> {
        let next = self.peek()?;
        self.cursor += 1;
        Some(next)
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.path.len()
    }

    /// Part of the path a renderer should draw for an agent at `position`
    pub fn remaining_ahead(&self, grid: &HexGrid, position: Point) -> &[Hex] {
        remaining_ahead(grid, position, self.remaining(), self.arrival_buffer)
    }
}

/// Drop the head of `remaining` once `position` is within `buffer` pixels of
/// its center.
pub fn remaining_ahead<'a>(
    grid: &HexGrid,
    position: Point,
    remaining: &'a [Hex],
    buffer: f64,
) -> &'a [Hex] {
    let Some((head, rest)) = remaining.split_first() else {
        return remaining;
    };
    match grid.tile(*head) {
        Some(tile) if tile.center.distance_to(position) <= buffer => rest,
        _ => remaining,
    }
}

/// Split a path into its next step and the rest. `None` means complete.
pub fn advance_path(path: &[Hex]) -> Option<(Hex, &[Hex])> {
    path.split_first().map(|(head, rest)| (*head, rest))
}
