//! Per-agent planner state that survives between ticks.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use cq_core::GridPos;

// ── PathCache ─────────────────────────────────────────────────────────────────

/// A computed path keyed by `(target, generation)`.
///
/// `cursor` indexes the cell the agent is expected to be standing on.  The
/// cache is only consulted through [`PathCache::next_step`], which advances
/// the cursor when the agent took the planned step and reports a miss when
/// the key changed or the agent is somewhere unexpected.
///
/// A key whose search came back empty is remembered in `failed` so the
/// planner does not repeat it every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathCache {
    target:     Option<GridPos>,
    generation: u64,
    path:       Vec<GridPos>,
    cursor:     usize,
    #[serde(default)]
    failed:     Option<(GridPos, u64)>,
}

impl PathCache {
    pub fn store(&mut self, target: GridPos, generation: u64, path: Vec<GridPos>) {
        self.target = Some(target);
        self.generation = generation;
        self.path = path;
        self.cursor = 0;
        self.failed = None;
    }

    /// Record that no path to `target` exists under `generation`.
    pub fn mark_failed(&mut self, target: GridPos, generation: u64) {
        self.clear();
        self.failed = Some((target, generation));
    }

    /// `true` if the search for this exact key already failed.
    pub fn has_failed(&self, target: GridPos, generation: u64) -> bool {
        self.failed == Some((target, generation))
    }

    pub fn clear(&mut self) {
        self.target = None;
        self.path.clear();
        self.cursor = 0;
    }

    pub fn target(&self) -> Option<GridPos> {
        self.target
    }

    pub fn path(&self) -> &[GridPos] {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Next cell on the cached path for an agent at `pos`, or `None` on a
    /// miss (wrong key or desync) or when the path is used up.
    pub fn next_step(&mut self, target: GridPos, generation: u64, pos: GridPos) -> Option<GridPos> {
        if self.target != Some(target) || self.generation != generation {
            return None;
        }
        match (self.path.get(self.cursor), self.path.get(self.cursor + 1)) {
            // The previous step was taken.
            (_, Some(&next)) if next == pos => self.cursor += 1,
            // The previous step was rejected (tired, blocked); stay in sync.
            (Some(&here), _) if here == pos => {}
            _ => return None,
        }
        self.path.get(self.cursor + 1).copied()
    }
}

// ── PlannerMemory ─────────────────────────────────────────────────────────────

/// What the AI remembers between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerMemory {
    /// Job the agent committed to; `None` until one is chosen.
    pub focus: Option<String>,

    /// Cell occupied before the last actual move.
    previous: Option<GridPos>,
    /// Position seen on the last [`observe`](Self::observe).
    last_seen: Option<GridPos>,

    history:     VecDeque<GridPos>,
    history_len: usize,

    /// Bumped by [`invalidate`](Self::invalidate); part of the cache key.
    generation: u64,
    pub cache:  PathCache,
}

impl Default for PlannerMemory {
    fn default() -> Self {
        Self::new(8)
    }
}

impl PlannerMemory {
    pub fn new(history_len: usize) -> Self {
        Self {
            focus: None,
            previous: None,
            last_seen: None,
            history: VecDeque::with_capacity(history_len),
            history_len,
            generation: 0,
            cache: PathCache::default(),
        }
    }

    /// Record the agent's position at the start of a decision.  A change
    /// since the last call counts as a move: the old cell becomes
    /// `previous` and enters the history.
    pub fn observe(&mut self, pos: GridPos) {
        match self.last_seen {
            Some(last) if last != pos => {
                self.previous = Some(last);
                if self.history_len > 0 {
                    if self.history.len() == self.history_len {
                        self.history.pop_front();
                    }
                    self.history.push_back(last);
                }
            }
            _ => {}
        }
        self.last_seen = Some(pos);
    }

    /// The cell the agent just came from.
    pub fn previous(&self) -> Option<GridPos> {
        self.previous
    }

    /// How often `cell` appears in the recent history.
    pub fn visits(&self, cell: GridPos) -> usize {
        self.history.iter().filter(|&&c| c == cell).count()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Force the next A* tick to recompute, including a key that failed.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cache.clear();
        self.cache.failed = None;
    }

    /// Drop the focus job (delivered, lost, or taken by the other agent).
    pub fn release_focus(&mut self) {
        self.focus = None;
        self.invalidate();
    }
}
