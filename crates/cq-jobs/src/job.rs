//! The `Job` value entity and deadline resolution.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use cq_core::{AgentId, GridPos};

// ── Deadline ──────────────────────────────────────────────────────────────────

/// A parsed deadline expression, not yet anchored to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deadline {
    /// Seconds after session start.
    Offset { secs: f64 },
    /// A wall-clock timestamp.  Only its time of day matters: it resolves to
    /// `session_start + seconds_of_day`.
    WallClock {
        seconds_of_day: f64,
        /// Full UTC timestamp when the input carried a date.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        at: Option<DateTime<Utc>>,
    },
    /// Missing or unparseable.  Deliveries are always on time.
    Unresolved,
}

impl Deadline {
    /// Parse an ISO-8601-like timestamp, a bare time of day, or a number of
    /// seconds.  Anything else is [`Deadline::Unresolved`].
    pub fn parse(text: &str) -> Deadline {
        let text = text.trim();
        if text.is_empty() {
            return Deadline::Unresolved;
        }
        if let Ok(secs) = text.parse::<f64>() {
            return if secs.is_finite() { Deadline::Offset { secs } } else { Deadline::Unresolved };
        }
        if let Some(at) = parse_timestamp(text) {
            return Deadline::WallClock { seconds_of_day: seconds_of_day(at.time()), at: Some(at) };
        }
        for fmt in ["%H:%M:%S", "%H:%M"] {
            if let Ok(t) = NaiveTime::parse_from_str(text, fmt) {
                return Deadline::WallClock { seconds_of_day: seconds_of_day(t), at: None };
            }
        }
        tracing::warn!(deadline = text, "unparseable deadline, treating as none");
        Deadline::Unresolved
    }

    /// Seconds after session start this deadline resolves to.
    pub fn offset_secs(&self) -> Option<f64> {
        match *self {
            Deadline::Offset { secs } => Some(secs),
            Deadline::WallClock { seconds_of_day, .. } => Some(seconds_of_day),
            Deadline::Unresolved => None,
        }
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

fn seconds_of_day(t: NaiveTime) -> f64 {
    t.num_seconds_from_midnight() as f64 + t.nanosecond() as f64 * 1e-9
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// A pickup/dropoff delivery request.
///
/// Identity is the `id` string; two `Job`s with the same id are the same job
/// regardless of ownership or binding state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id:       String,
    pub pickup:   GridPos,
    pub dropoff:  GridPos,
    pub payout:   f64,
    pub weight:   f64,
    pub priority: i32,

    /// Deadline text as delivered, kept for display.
    pub deadline_raw: String,
    pub deadline:     Deadline,
    /// Seconds after session start before which the job is not offered.
    pub release_offset: Option<f64>,

    /// `None` while the job is up for grabs.
    pub owner: Option<AgentId>,

    session_start: Option<f64>,
    deadline_ts:   Option<f64>,
    release_ts:    Option<f64>,
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl Job {
    pub fn new(
        id: impl Into<String>,
        pickup: GridPos,
        dropoff: GridPos,
        payout: f64,
        weight: f64,
        priority: i32,
        deadline: &str,
    ) -> Self {
        Self {
            id: id.into(),
            pickup,
            dropoff,
            payout,
            weight,
            priority,
            deadline_raw: deadline.to_owned(),
            deadline: Deadline::parse(deadline),
            release_offset: None,
            owner: None,
            session_start: None,
            deadline_ts: None,
            release_ts: None,
        }
    }

    /// Builder-style release offset.
    pub fn with_release(mut self, offset_secs: f64) -> Self {
        self.release_offset = Some(offset_secs);
        self
    }

    // ── Session binding ───────────────────────────────────────────────────

    /// Anchor deadline and release to `session_start`.
    ///
    /// Calling again recomputes from the latest epoch.
    pub fn bind_session_start(&mut self, session_start: f64) {
        self.session_start = Some(session_start);
        self.deadline_ts = self.deadline.offset_secs().map(|o| session_start + o);
        self.release_ts = self.release_offset.map(|o| session_start + o);
    }

    pub fn session_start(&self) -> Option<f64> {
        self.session_start
    }

    pub fn is_bound(&self) -> bool {
        self.session_start.is_some()
    }

    // ── Deadline queries ──────────────────────────────────────────────────

    /// Absolute deadline; `None` before binding or when unresolved.
    pub fn deadline_timestamp(&self) -> Option<f64> {
        self.deadline_ts
    }

    /// Absolute release time; `None` before binding or if the job has none.
    pub fn release_timestamp(&self) -> Option<f64> {
        self.release_ts
    }

    /// Length of the delivery window: deadline minus release (or minus
    /// session start when there is no release), floored at zero.  `1.0` when
    /// no deadline is resolvable.
    pub fn total_duration(&self) -> f64 {
        let Some(deadline) = self.deadline_ts else {
            return 1.0;
        };
        let start = self.release_ts.or(self.session_start).unwrap_or(deadline);
        (deadline - start).max(0.0)
    }

    /// Signed seconds until the deadline; negative once overdue.
    pub fn time_until_deadline(&self, now: f64) -> Option<f64> {
        self.deadline_ts.map(|d| d - now)
    }

    pub fn is_overdue(&self, now: f64) -> bool {
        self.time_until_deadline(now).is_some_and(|d| d < 0.0)
    }

    /// `true` once the release time has passed (or if there is none).
    pub fn is_released(&self, now: f64) -> bool {
        self.release_ts.is_none_or(|r| now >= r)
    }

    /// Key used to order by deadline: the bound timestamp, else the raw
    /// offset, else `+∞`.
    pub fn deadline_sort_key(&self) -> f64 {
        self.deadline_ts
            .or_else(|| self.deadline.offset_secs())
            .unwrap_or(f64::INFINITY)
    }

    /// ISO-8601 form of a wall-clock deadline, else the raw text.
    pub fn deadline_iso(&self) -> String {
        match &self.deadline {
            Deadline::WallClock { at: Some(at), .. } => at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            _ => self.deadline_raw.clone(),
        }
    }

    /// `true` if `agent` may pick this job up.
    pub fn is_available_to(&self, agent: AgentId) -> bool {
        self.owner.is_none_or(|o| o == agent)
    }
}
