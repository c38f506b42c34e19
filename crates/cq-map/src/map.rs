//! City grid representation and builder.
//!
//! # Data layout
//!
//! Tiles are stored row-major.  Given a cell `(x, y)` its index is
//! `y * width + x`, and the walkability and surface-cost lookups are plain
//! parallel `Vec`s indexed by that value:
//!
//! ```text
//! blocked[idx]        : true for buildings and delivery doors
//! surface_weight[idx] : A* edge cost for entering the cell (∞ if blocked)
//! ```
//!
//! The tile symbols and the legend are kept alongside so the map can be
//! rendered and snapshotted without loss.

use std::collections::BTreeMap;

use cq_core::GridPos;

use crate::{MapError, MapResult};

/// Symbol the game uses for delivery doors.  Always impassable regardless of
/// what the legend says.
pub const DOOR_SYMBOL: &str = "D";

// ── TileInfo ──────────────────────────────────────────────────────────────────

/// Legend entry for one tile symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct TileInfo {
    pub name:           String,
    pub blocked:        bool,
    pub surface_weight: f64,
}

impl TileInfo {
    pub fn new(name: impl Into<String>, blocked: bool, surface_weight: f64) -> Self {
        Self { name: name.into(), blocked, surface_weight }
    }

    /// A walkable tile with the given cost.
    pub fn street(name: impl Into<String>, surface_weight: f64) -> Self {
        Self::new(name, false, surface_weight)
    }

    /// An impassable tile.
    pub fn building(name: impl Into<String>) -> Self {
        Self::new(name, true, 1.0)
    }
}

/// A maximal rectangle of blocked cells, as merged by
/// [`GridMap::building_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingBlock {
    pub x:      u32,
    pub y:      u32,
    pub width:  u32,
    pub height: u32,
}

// ── GridMap ───────────────────────────────────────────────────────────────────

/// Read-only walkability and surface-cost lookup over the city grid.
///
/// Construct via [`GridMapBuilder`] or [`crate::load_map_reader`].
#[derive(Debug, Clone)]
pub struct GridMap {
    width:  u32,
    height: u32,

    /// Tile symbol per cell, row-major.
    symbols: Vec<String>,

    /// Legend as delivered by the map provider.
    legend: BTreeMap<String, TileInfo>,

    blocked:        Vec<bool>,
    surface_weight: Vec<f64>,
    /// Cheapest walkable cell, 1.0 on a map with none.
    min_weight:     f64,

    /// Delivery-earnings goal for the session.
    goal: f64,
}

impl GridMap {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn goal(&self) -> f64 {
        self.goal
    }

    pub fn legend(&self) -> &BTreeMap<String, TileInfo> {
        &self.legend
    }

    // ── Cell addressing ───────────────────────────────────────────────────

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Row-major index of `pos`, or `None` if it is off the map.
    #[inline]
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn pos_of(&self, idx: usize) -> GridPos {
        let w = self.width as usize;
        GridPos::new((idx % w) as i32, (idx / w) as i32)
    }

    // ── Tile queries ──────────────────────────────────────────────────────

    /// `true` for blocked tiles and for anything off the map.
    #[inline]
    pub fn is_blocked(&self, pos: GridPos) -> bool {
        self.index(pos).is_none_or(|i| self.blocked[i])
    }

    /// In bounds and not blocked: a legal cell to stand on.
    #[inline]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        !self.is_blocked(pos)
    }

    /// Cost of entering `pos`; `None` off the map, `f64::INFINITY` if blocked.
    #[inline]
    pub fn surface_weight(&self, pos: GridPos) -> Option<f64> {
        self.index(pos).map(|i| self.surface_weight[i])
    }

    /// Lowest surface weight of any walkable cell.
    pub fn min_surface_weight(&self) -> f64 {
        self.min_weight
    }

    pub fn symbol(&self, pos: GridPos) -> Option<&str> {
        self.index(pos).map(|i| self.symbols[i].as_str())
    }

    pub fn tile_info(&self, pos: GridPos) -> Option<&TileInfo> {
        self.symbol(pos).and_then(|s| self.legend.get(s))
    }

    /// Walkable orthogonal neighbours of `pos` in `Direction::ALL` order.
    pub fn walkable_neighbors(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.neighbors().into_iter().filter(|&n| self.is_walkable(n))
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.cell_count())
            .filter(|&i| !self.blocked[i])
            .map(|i| self.pos_of(i))
    }

    /// Rows of tile symbols, as the map provider shaped them.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.symbols
            .chunks(self.width.max(1) as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Merge blocked cells into maximal rectangles, scanning row-major.
    ///
    /// Each block grows right as far as the row stays blocked and unvisited,
    /// then down while every cell of the next row span is too.  Renderers
    /// draw one building sprite per block.
    pub fn building_blocks(&self) -> Vec<BuildingBlock> {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut visited = vec![false; self.cell_count()];
        let mut blocks = Vec::new();
        let solid = |x: usize, y: usize, visited: &[bool]| {
            let i = y * w + x;
            self.blocked[i] && !visited[i]
        };

        for y in 0..h {
            for x in 0..w {
                if !solid(x, y, &visited) {
                    continue;
                }
                let mut bw = 1;
                while x + bw < w && solid(x + bw, y, &visited) {
                    bw += 1;
                }
                let mut bh = 1;
                while y + bh < h && (0..bw).all(|i| solid(x + i, y + bh, &visited)) {
                    bh += 1;
                }
                for yy in y..y + bh {
                    for xx in x..x + bw {
                        visited[yy * w + xx] = true;
                    }
                }
                blocks.push(BuildingBlock {
                    x:      x as u32,
                    y:      y as u32,
                    width:  bw as u32,
                    height: bh as u32,
                });
            }
        }
        blocks
    }
}

// ── GridMapBuilder ────────────────────────────────────────────────────────────

/// Construct a [`GridMap`] from a legend and rows of symbols, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use cq_core::GridPos;
/// use cq_map::{GridMapBuilder, TileInfo};
///
/// let map = GridMapBuilder::new()
///     .legend("C", TileInfo::street("calle", 1.0))
///     .legend("B", TileInfo::building("edificio"))
///     .ascii_row("CCB")
///     .ascii_row("CCC")
///     .goal(1_500.0)
///     .build()
///     .unwrap();
/// assert_eq!(map.width(), 3);
/// assert!(map.is_blocked(GridPos::new(2, 0)));
/// ```
#[derive(Default)]
pub struct GridMapBuilder {
    legend: BTreeMap<String, TileInfo>,
    rows:   Vec<Vec<String>>,
    goal:   f64,
}

impl GridMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a legend entry.
    pub fn legend(mut self, symbol: impl Into<String>, info: TileInfo) -> Self {
        self.legend.insert(symbol.into(), info);
        self
    }

    /// Append a row of symbols.
    pub fn row<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.rows.push(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Append a row where every character is one tile symbol.
    pub fn ascii_row(self, row: &str) -> Self {
        self.row(row.chars().map(String::from))
    }

    pub fn goal(mut self, goal: f64) -> Self {
        self.goal = goal;
        self
    }

    /// Validate that all rows share one width and bake the SoA lookups.
    ///
    /// Symbols missing from the legend are walkable with cost 1.0 (the
    /// provider omits plain street entries on some maps); the door symbol is
    /// always blocked.  A walkable legend entry must have a finite, positive
    /// surface weight; blocked entries ignore theirs.
    pub fn build(self) -> MapResult<GridMap> {
        if let Some((sym, info)) = self
            .legend
            .iter()
            .find(|(_, t)| !t.blocked && !(t.surface_weight.is_finite() && t.surface_weight > 0.0))
        {
            return Err(MapError::Parse(format!(
                "legend entry {sym:?} ({}) has surface weight {}, expected a finite value above zero",
                info.name, info.surface_weight
            )));
        }

        let height = self.rows.len() as u32;
        let width = self.rows.first().map_or(0, |r| r.len()) as u32;

        let mut symbols = Vec::with_capacity((width * height) as usize);
        for row in self.rows {
            if row.len() as u32 != width {
                return Err(MapError::Dimensions {
                    width,
                    height,
                    what: "a tile row",
                    got: row.len(),
                });
            }
            symbols.extend(row);
        }

        let mut blocked = Vec::with_capacity(symbols.len());
        let mut surface_weight = Vec::with_capacity(symbols.len());
        for sym in &symbols {
            let info = self.legend.get(sym);
            let is_blocked = sym == DOOR_SYMBOL || info.is_some_and(|t| t.blocked);
            blocked.push(is_blocked);
            surface_weight.push(if is_blocked {
                f64::INFINITY
            } else {
                info.map_or(1.0, |t| t.surface_weight)
            });
        }

        let min_weight = surface_weight
            .iter()
            .copied()
            .filter(|w| w.is_finite())
            .reduce(f64::min)
            .unwrap_or(1.0);

        Ok(GridMap {
            width,
            height,
            symbols,
            legend: self.legend,
            blocked,
            surface_weight,
            min_weight,
            goal: self.goal,
        })
    }
}
