//! Raw job records and where they come from.
//!
//! # JSON format
//!
//! The job feed is a list of objects, possibly nested inside envelopes such
//! as `{"data": {"jobs": [...]}}`.  The loader takes the first array whose
//! elements are all objects.
//!
//! ```json
//! [{"id": "PED-1", "pickup": [3, 4], "dropoff": [10, 2], "payout": 120,
//!   "deadline": "2025-09-01T12:10:00Z", "weight": 2, "priority": 1,
//!   "release_time": 0}]
//! ```
//!
//! # CSV format
//!
//! ```csv
//! id,pickup_x,pickup_y,dropoff_x,dropoff_y,payout,deadline,weight,priority,release_time
//! PED-1,3,4,10,2,120,2025-09-01T12:10:00Z,2,1,0
//! PED-2,5,5,1,1,80,90,1,0,
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cq_core::GridPos;

use crate::{Job, JobError, JobResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// Deadline as it appears on the wire: text or a number of seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeadlineInput {
    Seconds(f64),
    Text(String),
}

impl Default for DeadlineInput {
    fn default() -> Self {
        DeadlineInput::Text(String::new())
    }
}

impl DeadlineInput {
    fn to_text(&self) -> String {
        match self {
            DeadlineInput::Seconds(s) => s.to_string(),
            DeadlineInput::Text(t) => t.clone(),
        }
    }
}

/// One job as yielded by a [`JobSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id:       String,
    pub pickup:   (i32, i32),
    pub dropoff:  (i32, i32),
    pub payout:   f64,
    #[serde(default)]
    pub deadline: DeadlineInput,
    pub weight:   f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub release_time: Option<f64>,
}

impl JobRecord {
    /// Validate and turn into an unbound, ownerless [`Job`].
    pub fn into_job(self) -> JobResult<Job> {
        if self.payout.is_nan() || self.payout < 0.0 {
            return Err(JobError::Parse(format!("job {:?}: negative payout {}", self.id, self.payout)));
        }
        if self.weight.is_nan() || self.weight <= 0.0 {
            return Err(JobError::Parse(format!("job {:?}: weight must be > 0, got {}", self.id, self.weight)));
        }
        let mut job = Job::new(
            self.id,
            GridPos::from(self.pickup),
            GridPos::from(self.dropoff),
            self.payout,
            self.weight,
            self.priority,
            &self.deadline.to_text(),
        );
        job.release_offset = self.release_time;
        Ok(job)
    }
}

// ── JobSource ─────────────────────────────────────────────────────────────────

/// Opaque supplier of job records.
///
/// The session calls [`fetch`](Self::fetch) once at start and again whenever
/// the pool runs dry, so implementations may return fresh batches.
pub trait JobSource: Send {
    fn fetch(&mut self) -> JobResult<Vec<JobRecord>>;
}

/// A fixed list of records, returned in full on every fetch.
#[derive(Debug, Clone, Default)]
pub struct StaticJobSource {
    records: Vec<JobRecord>,
}

impl StaticJobSource {
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self { records }
    }
}

impl JobSource for StaticJobSource {
    fn fetch(&mut self) -> JobResult<Vec<JobRecord>> {
        Ok(self.records.clone())
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Parse job records from a JSON document.
pub fn load_jobs_reader<R: Read>(reader: R) -> JobResult<Vec<JobRecord>> {
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| JobError::Parse(e.to_string()))?;
    let list = find_record_list(&value).ok_or(JobError::NoJobList)?;
    let records = list
        .iter()
        .map(|v| JobRecord::deserialize(v).map_err(|e| JobError::Parse(e.to_string())))
        .collect::<JobResult<Vec<_>>>()?;
    tracing::debug!(count = records.len(), "job records parsed");
    Ok(records)
}

pub fn load_jobs_json(path: impl AsRef<Path>) -> JobResult<Vec<JobRecord>> {
    let file = std::fs::File::open(path)?;
    load_jobs_reader(std::io::BufReader::new(file))
}

/// Depth-first search for the first non-empty array of objects.
fn find_record_list(value: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => {
            if !items.is_empty() && items.iter().all(serde_json::Value::is_object) {
                return Some(items);
            }
            items.iter().find_map(find_record_list)
        }
        serde_json::Value::Object(map) => map.values().find_map(find_record_list),
        _ => None,
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CsvJobRecord {
    id:           String,
    pickup_x:     i32,
    pickup_y:     i32,
    dropoff_x:    i32,
    dropoff_y:    i32,
    payout:       f64,
    #[serde(default)]
    deadline:     String,
    weight:       f64,
    #[serde(default)]
    priority:     i32,
    #[serde(default)]
    release_time: Option<f64>,
}

/// Parse job records from CSV with the header shown in the module docs.
pub fn load_jobs_csv_reader<R: Read>(reader: R) -> JobResult<Vec<JobRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for result in csv_reader.deserialize::<CsvJobRecord>() {
        let row = result.map_err(|e| JobError::Parse(e.to_string()))?;
        out.push(JobRecord {
            id:           row.id,
            pickup:       (row.pickup_x, row.pickup_y),
            dropoff:      (row.dropoff_x, row.dropoff_y),
            payout:       row.payout,
            deadline:     DeadlineInput::Text(row.deadline),
            weight:       row.weight,
            priority:     row.priority,
            release_time: row.release_time,
        });
    }
    Ok(out)
}

pub fn load_jobs_csv(path: impl AsRef<Path>) -> JobResult<Vec<JobRecord>> {
    let file = std::fs::File::open(path)?;
    load_jobs_csv_reader(file)
}
