//! Agent identity and movement direction codes.
//!
//! There are exactly two agents per session, so `AgentId` is a closed enum
//! rather than an integer index.  Ownership checks match on it exhaustively.

use std::fmt;

use crate::CoreError;

/// One of the two competing couriers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AgentId {
    /// The player-controlled courier.
    Player,
    /// The autonomous AI courier.
    Ai,
}

impl AgentId {
    /// Both agents in canonical processing order.
    pub const ALL: [AgentId; 2] = [AgentId::Player, AgentId::Ai];

    /// Dense index (`Player = 0`, `Ai = 1`) for per-agent arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            AgentId::Player => 0,
            AgentId::Ai     => 1,
        }
    }

    /// The competing agent.
    #[inline]
    pub fn other(self) -> AgentId {
        match self {
            AgentId::Player => AgentId::Ai,
            AgentId::Ai     => AgentId::Player,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Player => "player",
            AgentId::Ai     => "ai",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// A 4-connected grid step.
///
/// The numeric codes (`Left = 0`, `Right = 1`, `Up = 2`, `Down = 3`) are the
/// ones the view layer uses to pick a sprite, so they are part of the API.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// `(dx, dy)` for this step.  `y` grows downwards.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up    => (0, -1),
            Direction::Down  => (0, 1),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Direction::Left  => 0,
            Direction::Right => 1,
            Direction::Up    => 2,
            Direction::Down  => 3,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up    => Direction::Down,
            Direction::Down  => Direction::Up,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Direction, CoreError> {
        match code {
            0 => Ok(Direction::Left),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Up),
            3 => Ok(Direction::Down),
            n => Err(CoreError::InvalidDirection(n)),
        }
    }
}
