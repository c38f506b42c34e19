//! Capacity-bounded job container.
//!
//! # Two views
//!
//! | View            | Backing                          | Order                                   |
//! |-----------------|----------------------------------|-----------------------------------------|
//! | `iter()`        | `Vec<Job>`                       | insertion (FIFO)                        |
//! | `peek/pop_next` | `BTreeSet<PriorityKey>`          | priority desc, deadline asc, insertion  |
//!
//! A `HashMap<id, PriorityKey>` ties the two together so `contains` is O(1)
//! and removing a job can drop its key from the ordered set in O(log n).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Job;

/// Requested ordering for [`Inventory::ordered_jobs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Priority descending, then deadline ascending.
    #[default]
    Priority,
    /// Deadline ascending, then priority descending.
    Deadline,
}

// ── PriorityKey ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct PriorityKey {
    priority: i32,
    deadline: f64,
    seq:      u64,
    id:       String,
}

impl PriorityKey {
    fn of(job: &Job, seq: u64) -> Self {
        Self {
            priority: job.priority,
            deadline: job.deadline_sort_key(),
            seq,
            id: job.id.clone(),
        }
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.deadline.total_cmp(&other.deadline))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PriorityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriorityKey {}

// ── Inventory ─────────────────────────────────────────────────────────────────

/// Jobs carried by one agent, bounded by `max_weight`.
///
/// Capacity failures are reported by handing the job back, never by
/// panicking.
#[derive(Debug, Clone)]
pub struct Inventory {
    max_weight:   f64,
    items:        Vec<Job>,
    keys:         HashMap<String, PriorityKey>,
    queue:        BTreeSet<PriorityKey>,
    total_weight: f64,
    next_seq:     u64,
}

impl Inventory {
    pub fn new(max_weight: f64) -> Self {
        Self {
            max_weight,
            items: Vec::new(),
            keys: HashMap::new(),
            queue: BTreeSet::new(),
            total_weight: 0.0,
            next_seq: 0,
        }
    }

    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weight that can still be added.
    pub fn free_capacity(&self) -> f64 {
        (self.max_weight - self.total_weight).max(0.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Jobs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().find(|j| j.id == id)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// `true` iff `job` fits under `max_weight`.
    pub fn can_add(&self, job: &Job) -> bool {
        self.total_weight + job.weight <= self.max_weight
    }

    /// Append `job`.  Over capacity, or already held, the job is handed back
    /// and nothing changes.
    pub fn add_job(&mut self, job: Job) -> Result<(), Job> {
        if !self.can_add(&job) || self.contains(&job.id) {
            return Err(job);
        }
        let key = PriorityKey::of(&job, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key.clone());
        self.keys.insert(job.id.clone(), key);
        self.items.push(job);
        self.recompute_weight();
        Ok(())
    }

    /// Remove the job with `id` from both views.
    pub fn remove_job(&mut self, id: &str) -> Option<Job> {
        let key = self.keys.remove(id)?;
        self.queue.remove(&key);
        let pos = self.items.iter().position(|j| j.id == id)?;
        let job = self.items.remove(pos);
        self.recompute_weight();
        Some(job)
    }

    /// Highest-priority job, without removing it.
    pub fn peek_next(&self) -> Option<&Job> {
        let key = self.queue.first()?;
        self.items.iter().find(|j| j.id == key.id)
    }

    /// Remove and return the highest-priority job.
    pub fn pop_next(&mut self) -> Option<Job> {
        let id = self.queue.first()?.id.clone();
        self.remove_job(&id)
    }

    /// Remove every job, in insertion order.
    pub fn drain(&mut self) -> Vec<Job> {
        self.keys.clear();
        self.queue.clear();
        self.total_weight = 0.0;
        std::mem::take(&mut self.items)
    }

    /// Jobs sorted by `by`; equal keys keep insertion order.
    pub fn ordered_jobs(&self, by: SortBy) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.items.iter().collect();
        match by {
            SortBy::Priority => jobs.sort_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| a.deadline_sort_key().total_cmp(&b.deadline_sort_key()))
            }),
            SortBy::Deadline => jobs.sort_by(|a, b| {
                a.deadline_sort_key()
                    .total_cmp(&b.deadline_sort_key())
                    .then_with(|| b.priority.cmp(&a.priority))
            }),
        }
        jobs
    }

    /// Sum from scratch so repeated add/remove cannot accumulate drift.
    fn recompute_weight(&mut self) {
        self.total_weight = self.items.iter().map(|j| j.weight).sum();
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────────
//
// Snapshots store only the capacity and the jobs in insertion order; the
// priority view is rebuilt on load.

#[derive(Serialize)]
struct InventoryRef<'a> {
    max_weight: f64,
    items:      &'a [Job],
}

#[derive(Deserialize)]
struct InventoryRecord {
    max_weight: f64,
    items:      Vec<Job>,
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        InventoryRef { max_weight: self.max_weight, items: &self.items }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rec = InventoryRecord::deserialize(deserializer)?;
        let mut inv = Inventory::new(rec.max_weight);
        for job in rec.items {
            if let Err(job) = inv.add_job(job) {
                return Err(serde::de::Error::custom(format!(
                    "job {:?} does not fit in inventory of capacity {}",
                    job.id, rec.max_weight
                )));
            }
        }
        Ok(inv)
    }
}
