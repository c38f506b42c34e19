//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `tick_summaries.csv`
//! - `score_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentColumns, OutputResult, ScoreEventRow, TickSummaryRow};

pub const TICK_HEADER: [&str; 17] = [
    "tick", "elapsed_secs", "weather", "speed_multiplier", "pool_jobs",
    "player_x", "player_y", "player_stamina", "player_reputation", "player_earned", "player_carrying",
    "ai_x", "ai_y", "ai_stamina", "ai_reputation", "ai_earned", "ai_carrying",
];

pub const EVENT_HEADER: [&str; 5] = ["tick", "agent", "kind", "job", "points"];

/// Writes session output to two CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_HEADER)?;

        let mut events = Writer::from_path(dir.join("score_events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        Ok(Self { summaries, events, finished: false })
    }
}

fn agent_fields(a: &AgentColumns) -> [String; 6] {
    [
        a.x.to_string(),
        a.y.to_string(),
        format!("{:.2}", a.stamina),
        a.reputation.to_string(),
        format!("{:.2}", a.earned),
        a.carrying.to_string(),
    ]
}

impl OutputWriter for CsvWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let mut record = vec![
            row.tick.to_string(),
            format!("{:.3}", row.elapsed_secs),
            row.weather.to_string(),
            format!("{:.3}", row.speed_multiplier),
            row.pool_jobs.to_string(),
        ];
        record.extend(agent_fields(&row.player));
        record.extend(agent_fields(&row.ai));
        self.summaries.write_record(&record)?;
        Ok(())
    }

    fn write_score_event(&mut self, row: &ScoreEventRow) -> OutputResult<()> {
        self.events.write_record(&[
            row.tick.to_string(),
            row.agent.to_string(),
            row.kind.to_owned(),
            row.job.clone(),
            format!("{:.2}", row.points),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
