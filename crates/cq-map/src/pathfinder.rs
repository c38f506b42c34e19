//! Pathfinding trait and the default A* implementation.
//!
//! # Pluggability
//!
//! The AI planner calls pathfinding via the [`Pathfinder`] trait so a test
//! or a richer game can swap in its own search without touching the planner.
//!
//! # Cost model
//!
//! Moving into a cell costs that cell's surface weight.  The heuristic is
//! the Manhattan distance times the map's cheapest walkable weight, so it
//! never overestimates even when some surface is cheaper than 1.0.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use cq_core::GridPos;

use crate::{GridMap, MapError, MapResult};

/// Default cap on node expansions per search.
pub const DEFAULT_MAX_EXPANDED: usize = 8_000;

// ── GridPath ──────────────────────────────────────────────────────────────────

/// The result of a pathfinding query.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    /// Cells from start to goal, both inclusive.
    pub cells: Vec<GridPos>,
    /// Sum of the surface weights of every entered cell.
    pub total_cost: f64,
}

impl GridPath {
    /// Number of moves needed to walk the path.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// `true` if start and goal coincide.
    pub fn is_trivial(&self) -> bool {
        self.cells.len() <= 1
    }

    pub fn start(&self) -> Option<GridPos> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<GridPos> {
        self.cells.last().copied()
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable shortest-path search over a [`GridMap`].
pub trait Pathfinder: Send + Sync {
    /// Least-cost 4-connected path from `from` to `to`.
    ///
    /// `from == to` is a one-cell path of cost 0, not an error.
    fn find_path(&self, map: &GridMap, from: GridPos, to: GridPos) -> MapResult<GridPath>;
}

// ── AStarPathfinder ───────────────────────────────────────────────────────────

/// Bounded A* over the grid.
///
/// Ties on `f` are broken by insertion order, and neighbours are pushed in
/// `Direction::ALL` order, so identical inputs always produce identical
/// paths.
#[derive(Debug, Clone, Copy)]
pub struct AStarPathfinder {
    pub max_expanded: usize,
}

impl Default for AStarPathfinder {
    fn default() -> Self {
        Self { max_expanded: DEFAULT_MAX_EXPANDED }
    }
}

impl AStarPathfinder {
    pub fn new(max_expanded: usize) -> Self {
        Self { max_expanded }
    }
}

impl Pathfinder for AStarPathfinder {
    fn find_path(&self, map: &GridMap, from: GridPos, to: GridPos) -> MapResult<GridPath> {
        astar(map, from, to, self.max_expanded)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Open-set entry.  `Ord` is reversed so `BinaryHeap` pops the smallest `f`,
/// and among equal `f` the earliest-pushed entry.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f:    f64,
    seq:  u64,
    cell: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

const NO_PARENT: usize = usize::MAX;

fn astar(map: &GridMap, from: GridPos, to: GridPos, max_expanded: usize) -> MapResult<GridPath> {
    if from == to {
        return Ok(GridPath { cells: vec![from], total_cost: 0.0 });
    }
    let (Some(start), Some(goal)) = (map.index(from), map.index(to)) else {
        return Err(MapError::NoPath { from, to });
    };
    if map.is_blocked(to) {
        return Err(MapError::NoPath { from, to });
    }

    let n = map.cell_count();
    // g[v] = best known cost to reach v.
    let mut g = vec![f64::INFINITY; n];
    let mut came_from = vec![NO_PARENT; n];
    let mut closed = vec![false; n];

    let unit = map.min_surface_weight();
    let h = |p: GridPos| p.manhattan(to) as f64 * unit;

    let mut seq = 0u64;
    let mut open = BinaryHeap::new();
    g[start] = 0.0;
    open.push(OpenEntry { f: h(from), seq, cell: start });

    let mut expanded = 0usize;
    while let Some(OpenEntry { cell, .. }) = open.pop() {
        if closed[cell] {
            continue;
        }
        if cell == goal {
            return Ok(reconstruct(map, &came_from, start, goal, g[goal]));
        }
        closed[cell] = true;
        expanded += 1;
        if expanded > max_expanded {
            tracing::debug!(%from, %to, expanded, "A* budget exhausted");
            return Err(MapError::BudgetExhausted { from, to, expanded: max_expanded });
        }

        let pos = map.pos_of(cell);
        for next in map.walkable_neighbors(pos) {
            let Some(ni) = map.index(next) else { continue };
            if closed[ni] {
                continue;
            }
            let step = map.surface_weight(next).unwrap_or(f64::INFINITY);
            let tentative = g[cell] + step;
            if tentative < g[ni] {
                g[ni] = tentative;
                came_from[ni] = cell;
                seq += 1;
                open.push(OpenEntry {
                    f: tentative + h(next),
                    seq,
                    cell: ni,
                });
            }
        }
    }

    Err(MapError::NoPath { from, to })
}

fn reconstruct(map: &GridMap, came_from: &[usize], start: usize, goal: usize, cost: f64) -> GridPath {
    let mut cells = vec![map.pos_of(goal)];
    let mut cur = goal;
    while cur != start {
        cur = came_from[cur];
        cells.push(map.pos_of(cur));
    }
    cells.reverse();
    GridPath { cells, total_cost: cost }
}
