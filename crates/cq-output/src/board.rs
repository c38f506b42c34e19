//! Persistent score board: finished sessions, best first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cq_core::AgentId;
use cq_sim::Session;

use crate::OutputResult;

/// One finished session as shown on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name:        String,
    pub total:       f64,
    pub income:      f64,
    pub penalties:   f64,
    pub time_bonus:  f64,
    pub deliveries:  u32,
    pub reputation:  i32,
    /// Terminal status, e.g. `"victory (player)"`.
    pub outcome:     String,
    pub recorded_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Record for `agent` at the session's current state.
    pub fn from_session(session: &Session, agent: AgentId, name: impl Into<String>, at: DateTime<Utc>) -> Self {
        let score = session.score(agent);
        let breakdown = score.breakdown();
        Self {
            name:        name.into(),
            total:       breakdown.total_points(),
            income:      breakdown.base_income,
            penalties:   breakdown.penalty_total,
            time_bonus:  breakdown.time_bonus,
            deliveries:  score.deliveries(),
            reputation:  session.courier(agent).reputation(),
            outcome:     session.status().to_string(),
            recorded_at: at,
        }
    }
}

/// A JSON array of [`ScoreRecord`]s kept sorted by total, descending.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    path:    PathBuf,
    records: Vec<ScoreRecord>,
}

impl ScoreBoard {
    /// Load `path`; a missing file is an empty board.
    pub fn open(path: impl AsRef<Path>) -> OutputResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut records: Vec<ScoreRecord> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        sort(&mut records);
        Ok(Self { path, records })
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record and write the board back to disk.
    pub fn append(&mut self, record: ScoreRecord) -> OutputResult<()> {
        self.records.push(record);
        sort(&mut self.records);
        self.save()
    }

    /// The best `n` records.
    pub fn top(&self, n: usize) -> &[ScoreRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn save(&self) -> OutputResult<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, &self.records)?;
        out.flush()?;
        tracing::debug!(path = %self.path.display(), records = self.records.len(), "score board saved");
        Ok(())
    }
}

/// Highest total first; earlier records first among equals.
fn sort(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.total.total_cmp(&a.total));
}
