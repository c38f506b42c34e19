//! `cq-jobs`: delivery jobs, inventories, and job sources.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`job`]       | `Job`, `Deadline` parsing and session-clock binding        |
//! | [`inventory`] | `Inventory` (insertion order + priority view), `SortBy`    |
//! | [`source`]    | `JobRecord`, `JobSource` trait, `StaticJobSource`, JSON/CSV loaders |
//! | [`error`]     | `JobError`, `JobResult<T>`                                 |
//!
//! # Time model
//!
//! All timestamps are `f64` seconds on the session clock.  A job carries only
//! its raw deadline until [`Job::bind_session_start`] anchors it:
//!
//! ```text
//! numeric deadline  "120"          → session_start + 120
//! wall-clock        "…T10:30:00Z"  → session_start + seconds since midnight
//! unparseable       "soon"         → no deadline (always on time)
//! ```

pub mod error;
pub mod inventory;
pub mod job;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{JobError, JobResult};
pub use inventory::{Inventory, SortBy};
pub use job::{Deadline, Job};
pub use source::{
    DeadlineInput, JobRecord, JobSource, StaticJobSource, load_jobs_csv, load_jobs_csv_reader,
    load_jobs_json, load_jobs_reader,
};
