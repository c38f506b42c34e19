//! Jobs lying on the map, waiting to be picked up.

use serde::{Deserialize, Serialize};

use cq_jobs::{Job, JobRecord};

#[cfg(feature = "fx-hash")]
type IdSet = rustc_hash::FxHashSet<String>;
#[cfg(not(feature = "fx-hash"))]
type IdSet = std::collections::HashSet<String>;

/// Ownerless jobs in arrival order.
///
/// `ids` mirrors `jobs` for O(1) membership.  Only the job list is
/// serialized; the id set is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Job>", into = "Vec<Job>")]
pub struct JobPool {
    jobs: Vec<Job>,
    ids:  IdSet,
}

impl From<Vec<Job>> for JobPool {
    fn from(jobs: Vec<Job>) -> Self {
        let ids = jobs.iter().map(|j| j.id.clone()).collect();
        Self { jobs, ids }
    }
}

impl From<JobPool> for Vec<Job> {
    fn from(pool: JobPool) -> Self {
        pool.jobs
    }
}

impl JobPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.jobs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        if !self.ids.contains(id) {
            return None;
        }
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Remove a job for pickup.  Pool order is preserved.
    pub fn take(&mut self, id: &str) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.id == id)?;
        self.ids.remove(id);
        Some(self.jobs.remove(idx))
    }

    /// Return a dropped or lost job, ownerless.
    pub fn put_back(&mut self, mut job: Job) {
        job.owner = None;
        self.ids.insert(job.id.clone());
        self.jobs.push(job);
    }

    /// Add fresh records bound to `epoch`.  Returns how many were added.
    ///
    /// Records whose id is still in circulation (lying in the pool, or
    /// `in_hand` for a courier) are skipped, as are invalid records.
    /// Delivered ids are out of circulation and may come back.
    pub fn refill(&mut self, records: Vec<JobRecord>, epoch: f64, in_hand: impl Fn(&str) -> bool) -> usize {
        let mut added = 0;
        for record in records {
            if self.ids.contains(&record.id) || in_hand(&record.id) {
                tracing::debug!(job = %record.id, "job id still in circulation, skipping");
                continue;
            }
            let mut job = match record.into_job() {
                Ok(job) => job,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping invalid job record");
                    continue;
                }
            };
            job.bind_session_start(epoch);
            self.ids.insert(job.id.clone());
            self.jobs.push(job);
            added += 1;
        }
        added
    }
}
