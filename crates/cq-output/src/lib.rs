//! `cq-output`: session output writers and the persistent score board.
//!
//! | Type                     | Files                                       |
//! |--------------------------|---------------------------------------------|
//! | [`CsvWriter`]            | `tick_summaries.csv`, `score_events.csv`    |
//! | [`ScoreBoard`]           | one JSON file of finished-session records   |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SessionOutputObserver`], which implements `cq_sim::SessionObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cq_output::{CsvWriter, SessionOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SessionOutputObserver::new(writer);
//! session.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod board;
pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use board::{ScoreBoard, ScoreRecord};
pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SessionOutputObserver;
pub use row::{AgentColumns, ScoreEventRow, TickSummaryRow};
pub use writer::OutputWriter;
