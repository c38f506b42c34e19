//! Unit tests for cq-jobs.

use cq_core::{AgentId, AgentRng, GridPos};

use crate::{Deadline, Inventory, Job, SortBy};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn job(id: &str, weight: f64, priority: i32, deadline: &str) -> Job {
    Job::new(id, GridPos::new(0, 0), GridPos::new(5, 5), 100.0, weight, priority, deadline)
}

fn bound(id: &str, weight: f64, priority: i32, deadline: &str) -> Job {
    let mut j = job(id, weight, priority, deadline);
    j.bind_session_start(1_000.0);
    j
}

// ── Deadline parsing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod deadline {
    use super::*;

    #[test]
    fn numeric_offset() {
        assert_eq!(Deadline::parse("120"), Deadline::Offset { secs: 120.0 });
        assert_eq!(Deadline::parse(" 7.5 "), Deadline::Offset { secs: 7.5 });
    }

    #[test]
    fn iso_with_zulu_resolves_to_time_of_day() {
        let d = Deadline::parse("2025-09-01T00:10:00Z");
        assert_eq!(d.offset_secs(), Some(600.0));
        assert!(matches!(d, Deadline::WallClock { at: Some(_), .. }));
    }

    #[test]
    fn iso_with_offset_is_normalised_to_utc() {
        let d = Deadline::parse("2025-09-01T02:00:30+02:00");
        assert_eq!(d.offset_secs(), Some(30.0));
    }

    #[test]
    fn naive_and_time_only_forms() {
        assert_eq!(Deadline::parse("2025-09-01 01:00:00").offset_secs(), Some(3_600.0));
        assert_eq!(Deadline::parse("2025-09-01 01:30").offset_secs(), Some(5_400.0));
        assert_eq!(Deadline::parse("00:02:00").offset_secs(), Some(120.0));
        assert_eq!(Deadline::parse("01:00").offset_secs(), Some(3_600.0));
    }

    #[test]
    fn garbage_is_unresolved() {
        assert_eq!(Deadline::parse("whenever"), Deadline::Unresolved);
        assert_eq!(Deadline::parse(""), Deadline::Unresolved);
        assert_eq!(Deadline::parse("NaN"), Deadline::Unresolved);
    }
}

// ── Job binding ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod job_binding {
    use super::*;

    #[test]
    fn unbound_has_no_timestamps() {
        let j = job("a", 1.0, 0, "120");
        assert!(!j.is_bound());
        assert_eq!(j.deadline_timestamp(), None);
        assert_eq!(j.total_duration(), 1.0);
        assert!(!j.is_overdue(1e12));
    }

    #[test]
    fn offset_binds_relative_to_session_start() {
        let j = bound("a", 1.0, 0, "120").with_release(0.0);
        // with_release after binding has no effect until rebinding.
        assert_eq!(j.deadline_timestamp(), Some(1_120.0));
        assert_eq!(j.release_timestamp(), None);
        assert_eq!(j.total_duration(), 120.0);
        assert_eq!(j.time_until_deadline(1_100.0), Some(20.0));
        assert!(j.is_overdue(1_121.0));
    }

    #[test]
    fn release_shortens_window_and_gates() {
        let mut j = job("a", 1.0, 0, "120").with_release(30.0);
        j.bind_session_start(0.0);
        assert_eq!(j.release_timestamp(), Some(30.0));
        assert_eq!(j.total_duration(), 90.0);
        assert!(!j.is_released(29.9));
        assert!(j.is_released(30.0));
    }

    #[test]
    fn release_after_deadline_floors_to_zero() {
        let mut j = job("a", 1.0, 0, "10").with_release(50.0);
        j.bind_session_start(0.0);
        assert_eq!(j.total_duration(), 0.0);
    }

    #[test]
    fn rebinding_uses_latest_epoch() {
        let mut j = bound("a", 1.0, 0, "60");
        j.bind_session_start(5_000.0);
        assert_eq!(j.deadline_timestamp(), Some(5_060.0));
        assert_eq!(j.session_start(), Some(5_000.0));
    }

    #[test]
    fn unresolved_deadline_never_overdue() {
        let j = bound("a", 1.0, 0, "??");
        assert_eq!(j.deadline_timestamp(), None);
        assert_eq!(j.time_until_deadline(0.0), None);
        assert_eq!(j.total_duration(), 1.0);
        assert_eq!(j.deadline_iso(), "??");
    }

    #[test]
    fn equality_is_by_id() {
        let mut a = job("same", 1.0, 0, "");
        let b = job("same", 9.0, 3, "60");
        a.owner = Some(cq_core::AgentId::Ai);
        assert_eq!(a, b);
        assert!(!a.is_available_to(cq_core::AgentId::Player));
        assert!(b.is_available_to(cq_core::AgentId::Player));
    }
}

// ── Inventory ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod inventory {
    use super::*;

    #[test]
    fn capacity_exact_fit_then_reject() {
        let mut inv = Inventory::new(10.0);
        assert!(inv.add_job(job("a", 4.0, 0, "")).is_ok());
        assert!(inv.add_job(job("b", 6.0, 0, "")).is_ok());
        assert_eq!(inv.total_weight(), 10.0);
        let back = inv.add_job(job("c", 0.5, 0, "")).unwrap_err();
        assert_eq!(back.id, "c");
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.total_weight(), 10.0);
    }

    #[test]
    fn freed_capacity_is_reusable() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(job("first", 6.0, 0, "")).unwrap();
        assert!(inv.add_job(job("second", 5.0, 0, "")).is_err());
        assert_eq!(inv.remove_job("first").unwrap().id, "first");
        assert_eq!(inv.total_weight(), 0.0);
        assert!(inv.add_job(job("second", 5.0, 0, "")).is_ok());
        assert_eq!(inv.total_weight(), 5.0);
        assert_eq!(inv.peek_next().unwrap().id, "second");
    }

    #[test]
    fn random_churn_keeps_views_in_step() {
        let mut rng = AgentRng::new(7, AgentId::Player);
        let mut inv = Inventory::new(10.0);
        let mut next_id = 0u32;
        for _ in 0..500 {
            if inv.is_empty() || rng.gen_bool(0.6) {
                let weight = f64::from(rng.gen_range(1u32..=8)) * 0.75;
                let priority = rng.gen_range(0i32..4);
                let deadline = match rng.gen_range(0u32..3) {
                    0 => String::new(),
                    _ => rng.gen_range(10u32..300).to_string(),
                };
                let fits = inv.free_capacity() >= weight;
                let added = inv.add_job(bound(&format!("j{next_id}"), weight, priority, &deadline)).is_ok();
                assert_eq!(added, fits);
                next_id += 1;
            } else {
                let ids: Vec<String> = inv.iter().map(|j| j.id.clone()).collect();
                let id = rng.choose(&ids).unwrap().clone();
                assert!(inv.remove_job(&id).is_some());
            }

            assert!(inv.total_weight() <= inv.max_weight() + 1e-9);
            let sum: f64 = inv.iter().map(|j| j.weight).sum();
            assert!((inv.total_weight() - sum).abs() < 1e-9);
            let expected = inv.ordered_jobs(SortBy::Priority).first().map(|j| j.id.clone());
            assert_eq!(inv.peek_next().map(|j| j.id.clone()), expected);
        }
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(job("a", 1.0, 0, "")).unwrap();
        assert!(inv.add_job(job("a", 1.0, 0, "")).is_err());
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn fifo_iteration_preserved() {
        let mut inv = Inventory::new(10.0);
        for (id, p) in [("x", 0), ("y", 5), ("z", 2)] {
            inv.add_job(job(id, 1.0, p, "")).unwrap();
        }
        let ids: Vec<_> = inv.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["x", "y", "z"]);
    }

    #[test]
    fn priority_view_peek_and_pop() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(bound("low", 1.0, 0, "10")).unwrap();
        inv.add_job(bound("late", 1.0, 2, "300")).unwrap();
        inv.add_job(bound("soon", 1.0, 2, "60")).unwrap();
        inv.add_job(bound("soon2", 1.0, 2, "60")).unwrap();

        assert_eq!(inv.peek_next().unwrap().id, "soon");
        assert_eq!(inv.pop_next().unwrap().id, "soon");
        assert_eq!(inv.pop_next().unwrap().id, "soon2");
        assert_eq!(inv.pop_next().unwrap().id, "late");
        let ids: Vec<_> = inv.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["low"]);
        assert_eq!(inv.total_weight(), 1.0);
    }

    #[test]
    fn remove_from_both_views() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(job("a", 2.0, 9, "")).unwrap();
        inv.add_job(job("b", 3.0, 1, "")).unwrap();
        assert_eq!(inv.remove_job("a").map(|j| j.id), Some("a".into()));
        assert!(inv.remove_job("a").is_none());
        assert!(!inv.contains("a"));
        assert_eq!(inv.peek_next().unwrap().id, "b");
        assert_eq!(inv.total_weight(), 3.0);
    }

    #[test]
    fn ordered_jobs_by_priority_and_deadline() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(bound("p1-d300", 1.0, 1, "300")).unwrap();
        inv.add_job(bound("p2-d500", 1.0, 2, "500")).unwrap();
        inv.add_job(bound("p1-d100", 1.0, 1, "100")).unwrap();
        inv.add_job(bound("p0-none", 1.0, 0, "")).unwrap();

        let by_p: Vec<_> = inv.ordered_jobs(SortBy::Priority).iter().map(|j| j.id.clone()).collect();
        assert_eq!(by_p, ["p2-d500", "p1-d100", "p1-d300", "p0-none"]);

        let by_d: Vec<_> = inv.ordered_jobs(SortBy::Deadline).iter().map(|j| j.id.clone()).collect();
        assert_eq!(by_d, ["p1-d100", "p1-d300", "p2-d500", "p0-none"]);
    }

    #[test]
    fn empty_inventory_queries() {
        let mut inv = Inventory::new(5.0);
        assert!(inv.peek_next().is_none());
        assert!(inv.pop_next().is_none());
        assert!(inv.is_empty());
        assert_eq!(inv.free_capacity(), 5.0);
    }

    #[test]
    fn serde_rebuilds_priority_view() {
        let mut inv = Inventory::new(10.0);
        inv.add_job(bound("a", 1.0, 0, "60")).unwrap();
        inv.add_job(bound("b", 1.0, 4, "60")).unwrap();
        let json = serde_json::to_string(&inv).unwrap();
        let back: Inventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.peek_next().unwrap().id, "b");
        assert_eq!(back.get("a").unwrap().deadline_timestamp(), Some(1_060.0));
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod source {
    use crate::{DeadlineInput, JobError, JobSource, StaticJobSource, load_jobs_csv_reader, load_jobs_reader};
    use cq_core::GridPos;

    #[test]
    fn json_nested_envelope() {
        let doc = r#"{"data": {"meta": [1, 2], "jobs": [
            {"id": "PED-1", "pickup": [3, 4], "dropoff": [10, 2], "payout": 120,
             "deadline": "2025-09-01T12:10:00Z", "weight": 2, "priority": 1, "release_time": 15},
            {"id": "PED-2", "pickup": [0, 0], "dropoff": [1, 1], "payout": 50,
             "deadline": 90, "weight": 1}
        ]}}"#;
        let recs = load_jobs_reader(doc.as_bytes()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].deadline, DeadlineInput::Seconds(90.0));
        assert_eq!(recs[1].priority, 0);

        let j = recs[0].clone().into_job().unwrap();
        assert_eq!(j.pickup, GridPos::new(3, 4));
        assert_eq!(j.release_offset, Some(15.0));
        assert_eq!(j.deadline.offset_secs(), Some(12.0 * 3_600.0 + 600.0));

        let j2 = recs[1].clone().into_job().unwrap();
        assert_eq!(j2.deadline.offset_secs(), Some(90.0));
    }

    #[test]
    fn json_without_list() {
        let err = load_jobs_reader(&br#"{"data": {"count": 0}}"#[..]);
        assert!(matches!(err, Err(JobError::NoJobList)));
    }

    #[test]
    fn invalid_weight_rejected() {
        let doc = r#"[{"id": "x", "pickup": [0,0], "dropoff": [1,1], "payout": 1, "weight": 0}]"#;
        let recs = load_jobs_reader(doc.as_bytes()).unwrap();
        assert!(matches!(recs[0].clone().into_job(), Err(JobError::Parse(_))));
    }

    #[test]
    fn csv_rows() {
        let csv = "id,pickup_x,pickup_y,dropoff_x,dropoff_y,payout,deadline,weight,priority,release_time\n\
                   PED-1,3,4,10,2,120,2025-09-01T12:10:00Z,2,1,0\n\
                   PED-2,5,5,1,1,80,90,1,0,\n";
        let recs = load_jobs_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].dropoff, (10, 2));
        assert_eq!(recs[1].release_time, None);
        let j = recs[1].clone().into_job().unwrap();
        assert_eq!(j.deadline.offset_secs(), Some(90.0));
    }

    #[test]
    fn csv_bad_number() {
        let csv = "id,pickup_x,pickup_y,dropoff_x,dropoff_y,payout,deadline,weight,priority,release_time\n\
                   X,a,0,0,0,1,,1,0,\n";
        assert!(matches!(load_jobs_csv_reader(csv.as_bytes()), Err(JobError::Parse(_))));
    }

    #[test]
    fn static_source_repeats() {
        let doc = r#"[{"id": "x", "pickup": [0,0], "dropoff": [1,1], "payout": 1, "weight": 1}]"#;
        let mut src = StaticJobSource::new(load_jobs_reader(doc.as_bytes()).unwrap());
        assert_eq!(src.fetch().unwrap().len(), 1);
        assert_eq!(src.fetch().unwrap().len(), 1);
    }
}
