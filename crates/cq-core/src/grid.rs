//! Integer grid coordinates.
//!
//! `GridPos` is a plain `(x, y)` cell address with `y` growing downwards,
//! matching the row-major tile layout delivered by the map provider.

use crate::Direction;

/// A cell on the city grid.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one step away in `dir`.  Not bounds-checked.
    #[inline]
    pub fn step(self, dir: Direction) -> GridPos {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }

    /// L1 distance: the A* heuristic and the greedy ranking metric.
    #[inline]
    pub fn manhattan(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance, used by "nearest job" queries.
    pub fn euclidean(self, other: GridPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// The four orthogonal neighbours in `Direction::ALL` order.
    pub fn neighbors(self) -> [GridPos; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    /// Direction code for a single step from `self` towards `target`.
    ///
    /// Vertical movement wins over horizontal, so a diagonal target yields
    /// `Up`/`Down`.  Returns `None` when `target == self`.
    pub fn direction_to(self, target: GridPos) -> Option<Direction> {
        if target.y < self.y {
            Some(Direction::Up)
        } else if target.y > self.y {
            Some(Direction::Down)
        } else if target.x < self.x {
            Some(Direction::Left)
        } else if target.x > self.x {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        GridPos::new(x, y)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
