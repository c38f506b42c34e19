//! The `OutputWriter` trait implemented by backend writers.

use crate::{OutputResult, ScoreEventRow, TickSummaryRow};

/// Errors are stored by the observer and retrieved with
/// [`SessionOutputObserver::take_error`][crate::SessionOutputObserver::take_error].
pub trait OutputWriter {
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    fn write_score_event(&mut self, row: &ScoreEventRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
