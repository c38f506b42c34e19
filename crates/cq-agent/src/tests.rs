//! Unit tests for cq-agent.

use cq_core::{AgentId, GridPos};
use cq_jobs::Job;
use cq_map::{GridMap, GridMapBuilder, TileInfo};

use crate::{Courier, CourierConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 5×3 street grid with a single building at (2, 1).
fn map() -> GridMap {
    GridMapBuilder::new()
        .legend("C", TileInfo::street("calle", 1.0))
        .legend("B", TileInfo::building("edificio"))
        .ascii_row("CCCCC")
        .ascii_row("CCBCC")
        .ascii_row("CCCCC")
        .build()
        .unwrap()
}

fn courier_with(config: CourierConfig) -> Courier {
    Courier::new(AgentId::Player, GridPos::new(0, 0), config)
}

fn courier() -> Courier {
    courier_with(CourierConfig::default())
}

/// Job with a 100 s deadline bound to session start 0.
fn timed_job(id: &str, weight: f64) -> Job {
    let mut j = Job::new(id, GridPos::new(1, 0), GridPos::new(4, 2), 100.0, weight, 0, "100");
    j.bind_session_start(0.0);
    j
}

fn untimed_job(id: &str) -> Job {
    Job::new(id, GridPos::new(1, 0), GridPos::new(4, 2), 100.0, 1.0, 0, "")
}

// ── Stamina & movement ────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use cq_core::{Direction, WeatherCondition};

    use super::*;
    use crate::StaminaState;

    #[test]
    fn legal_move_costs_base() {
        let m = map();
        let mut c = courier();
        assert!(c.move_dir(&m, Direction::Right));
        assert_eq!(c.position(), GridPos::new(1, 0));
        assert_eq!(c.stamina(), 99.5);
    }

    #[test]
    fn illegal_moves_are_silent_noops() {
        let m = map();
        let mut c = courier();
        assert!(!c.move_dir(&m, Direction::Left), "off the map");
        assert!(!c.move_dir(&m, Direction::Up), "off the map");
        c.move_to(&m, GridPos::new(1, 1));
        let before = c.stamina();
        assert!(!c.move_dir(&m, Direction::Right), "into the building");
        assert_eq!(c.position(), GridPos::new(1, 1));
        assert_eq!(c.stamina(), before);
    }

    #[test]
    fn relative_moves() {
        let m = map();
        let mut c = courier();
        assert!(c.move_by(&m, 1, 1));
        assert_eq!(c.position(), GridPos::new(1, 1));
        assert!(!c.move_by(&m, 1, 0), "into the building");
        assert!(!c.move_by(&m, 0, -2), "off the map");
        assert_eq!(c.position(), GridPos::new(1, 1));
    }

    #[test]
    fn load_and_weather_surcharges() {
        let mut c = courier();
        c.pick_job(timed_job("heavy", 5.0)).unwrap();
        // 0.5 + 0.2 * (5 - 3)
        assert!((c.move_cost() - 0.9).abs() < 1e-9);
        c.set_weather(WeatherCondition::Storm);
        assert!((c.move_cost() - 1.2).abs() < 1e-9);
        c.set_weather(WeatherCondition::Clouds);
        assert!((c.move_cost() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn exhaustion_lock_needs_thirty() {
        let m = map();
        let mut c = courier_with(CourierConfig { start_stamina: 0.4, ..Default::default() });
        assert_eq!(c.stamina_state(), StaminaState::Tired);
        assert!(c.move_dir(&m, Direction::Right));
        assert_eq!(c.stamina(), 0.0);
        assert!(c.is_exhausted_locked());
        assert_eq!(c.stamina_state(), StaminaState::Exhausted);
        assert_eq!(c.speed_multiplier(), 0.0);

        c.recover_stamina(29.5);
        assert!(!c.can_move(), "stamina > 0 is not enough while locked");
        assert!(!c.move_dir(&m, Direction::Right));

        c.recover_stamina(0.5);
        assert!(!c.is_exhausted_locked());
        assert!(c.can_move());
        assert_eq!(c.stamina_state(), StaminaState::Tired);
    }

    #[test]
    fn recovery_caps_at_max() {
        let mut c = courier();
        c.recover_stamina(50.0);
        assert_eq!(c.stamina(), 100.0);
        assert_eq!(c.speed_multiplier(), 1.0);
    }
}

// ── Pickup ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pickup {
    use super::*;

    #[test]
    fn pickup_claims_ownership() {
        let mut c = courier();
        c.pick_job(untimed_job("a")).unwrap();
        assert!(c.holds("a"));
        assert_eq!(c.inventory().get("a").unwrap().owner, Some(AgentId::Player));
    }

    #[test]
    fn other_agents_job_rejected() {
        let mut c = courier();
        let mut j = untimed_job("a");
        j.owner = Some(AgentId::Ai);
        let back = c.pick_job(j).unwrap_err();
        assert_eq!(back.owner, Some(AgentId::Ai));
        assert!(c.inventory().is_empty());
    }

    #[test]
    fn over_capacity_hands_back_ownerless() {
        let mut c = courier();
        c.pick_job(timed_job("a", 8.0)).unwrap();
        let back = c.pick_job(timed_job("b", 3.0)).unwrap_err();
        assert_eq!(back.owner, None);
        assert_eq!(c.current_load(), 8.0);
    }

    #[test]
    fn drop_clears_owner() {
        let mut c = courier();
        c.pick_job(untimed_job("a")).unwrap();
        let j = c.drop_job("a").unwrap();
        assert_eq!(j.owner, None);
        assert!(c.drop_job("a").is_none());
    }
}

// ── Delivery ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod delivery {
    use super::*;
    use crate::{AgentError, DefeatReason};

    fn deliver_at(now: f64) -> (Courier, crate::DeliveryOutcome) {
        let mut c = courier();
        c.pick_job(timed_job("j", 1.0)).unwrap();
        let out = c.deliver_job("j", now).unwrap();
        (c, out)
    }

    #[test]
    fn lateness_tiers() {
        // Deadline 100 s, window 100 s: the early band is delta >= 20 s.
        assert_eq!(deliver_at(10.0).1.reputation_delta, 5);
        assert_eq!(deliver_at(80.0).1.reputation_delta, 5);
        assert_eq!(deliver_at(85.0).1.reputation_delta, 3);
        assert_eq!(deliver_at(100.0).1.reputation_delta, 3);
        assert_eq!(deliver_at(130.0).1.reputation_delta, -2);
        assert_eq!(deliver_at(160.0).1.reputation_delta, -5);
        assert_eq!(deliver_at(220.0).1.reputation_delta, -5);
        assert_eq!(deliver_at(221.0).1.reputation_delta, -10);
    }

    #[test]
    fn late_outcome_fields() {
        let (c, out) = deliver_at(160.0);
        assert!(out.was_late);
        assert_eq!(out.lateness_seconds, 60.0);
        assert_eq!(out.base_payout, 100.0);
        assert_eq!(out.bonus_multiplier, 1.0);
        assert_eq!(c.reputation(), 65);
        assert_eq!(c.total_earned(), 100.0);
        assert_eq!(c.delivered().len(), 1);
        assert!(c.inventory().is_empty());
    }

    #[test]
    fn no_deadline_is_on_time_plus_three() {
        let mut c = courier();
        c.pick_job(untimed_job("j")).unwrap();
        let out = c.deliver_job("j", 1e9).unwrap();
        assert_eq!(out.reputation_delta, 3);
        assert!(!out.was_late);
        assert_eq!(out.lateness_seconds, 0.0);
    }

    #[test]
    fn streak_bonus_on_third_delivery() {
        let mut c = courier_with(CourierConfig { start_reputation: 60, ..Default::default() });
        for id in ["a", "b", "c"] {
            c.pick_job(untimed_job(id)).unwrap();
        }
        assert_eq!(c.deliver_job("a", 0.0).unwrap().reputation_delta, 3);
        assert_eq!(c.reputation(), 63);
        assert_eq!(c.deliver_job("b", 0.0).unwrap().reputation_delta, 3);
        assert_eq!(c.reputation(), 66);
        assert_eq!(c.deliver_job("c", 0.0).unwrap().reputation_delta, 5);
        assert_eq!(c.reputation(), 71);
        assert_eq!(c.reputation_streak(), 0);
    }

    #[test]
    fn late_delivery_then_on_time_run() {
        let mut c = courier();
        assert_eq!(c.reputation(), 70);

        c.pick_job(timed_job("late", 1.0)).unwrap();
        let out = c.deliver_job("late", 250.0).unwrap();
        assert_eq!(out.lateness_seconds, 150.0);
        assert_eq!(out.reputation_delta, -10);
        assert_eq!(c.reputation(), 60);
        assert_eq!(c.reputation_streak(), 0);

        // Delivered 10 s before a 100 s deadline: on time, not early.
        for (id, expected) in [("a", 63), ("b", 66), ("c", 71)] {
            c.pick_job(timed_job(id, 1.0)).unwrap();
            let out = c.deliver_job(id, 90.0).unwrap();
            assert!(!out.was_late);
            assert_eq!(c.reputation(), expected);
        }
        assert_eq!(c.reputation_streak(), 0);
        assert_eq!(c.delivered().len(), 4);
    }

    #[test]
    fn negative_delta_resets_streak() {
        let mut c = courier();
        c.adjust_reputation(3);
        c.adjust_reputation(3);
        c.adjust_reputation(-2);
        assert_eq!(c.reputation_streak(), 0);
        c.adjust_reputation(0);
        assert_eq!(c.reputation_streak(), 1);
        assert_eq!(c.reputation(), 74);
    }

    #[test]
    fn excellence_multiplier() {
        let mut c = courier_with(CourierConfig { start_reputation: 88, ..Default::default() });
        c.pick_job(untimed_job("j")).unwrap();
        let out = c.deliver_job("j", 0.0).unwrap();
        assert_eq!(c.reputation(), 91);
        assert_eq!(out.bonus_multiplier, 1.05);
        assert!((out.payout_applied - 105.0).abs() < 1e-9);
    }

    #[test]
    fn reputation_clamps_at_hundred() {
        let mut c = courier_with(CourierConfig { start_reputation: 99, ..Default::default() });
        c.adjust_reputation(5);
        assert_eq!(c.reputation(), 100);
    }

    #[test]
    fn defeat_is_set_once() {
        let mut c = courier_with(CourierConfig { start_reputation: 25, ..Default::default() });
        c.pick_job(timed_job("j", 1.0)).unwrap();
        c.deliver_job("j", 500.0).unwrap();
        assert_eq!(c.reputation(), 15);
        assert_eq!(c.defeat_reason(), Some(DefeatReason::Reputation));

        c.adjust_reputation(50);
        assert_eq!(c.defeat_reason(), Some(DefeatReason::Reputation));
        c.adjust_reputation(-100);
        assert_eq!(c.reputation(), 0);
        assert_eq!(c.defeat_reason(), Some(DefeatReason::Reputation));
    }

    #[test]
    fn delivering_unheld_job_is_an_error() {
        let mut c = courier();
        let err = c.deliver_job("ghost", 0.0).unwrap_err();
        assert!(matches!(err, AgentError::JobNotHeld { agent: AgentId::Player, .. }));
    }
}

// ── Job loss ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod job_loss {
    use cq_core::AgentRng;

    use super::*;

    #[test]
    fn empty_inventory_never_loses() {
        let mut c = courier();
        let mut rng = AgentRng::new(7, AgentId::Player);
        for _ in 0..1_000 {
            assert!(c.roll_job_loss(&mut rng, 0).is_none());
        }
    }

    #[test]
    fn degenerate_range_always_loses() {
        let mut c = courier();
        c.pick_job(untimed_job("a")).unwrap();
        c.pick_job(untimed_job("b")).unwrap();
        let mut rng = AgentRng::new(7, AgentId::Player);
        let lost = c.roll_job_loss(&mut rng, 0).unwrap();
        assert_eq!(lost.owner, None);
        assert_eq!(c.inventory().len(), 1);
        assert!(!c.holds(&lost.id));
    }

    #[test]
    fn loss_rate_is_about_one_in_151() {
        let mut c = courier();
        c.pick_job(untimed_job("a")).unwrap();
        let mut rng = AgentRng::new(42, AgentId::Player);
        let trials = 151_000;
        let mut losses = 0;
        for _ in 0..trials {
            if let Some(j) = c.roll_job_loss(&mut rng, 150) {
                losses += 1;
                c.pick_job(j).unwrap();
            }
        }
        // Expected 1000; allow a generous band.
        assert!((800..1_200).contains(&losses), "losses = {losses}");
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use super::*;

    #[test]
    fn serde_round_trip_keeps_state() {
        let m = map();
        let mut c = courier();
        c.pick_job(timed_job("a", 2.0)).unwrap();
        c.move_dir(&m, cq_core::Direction::Down);
        c.adjust_reputation(3);

        let json = serde_json::to_string(&c).unwrap();
        let back: Courier = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position(), c.position());
        assert_eq!(back.stamina(), c.stamina());
        assert_eq!(back.reputation(), 73);
        assert_eq!(back.reputation_streak(), 1);
        assert!(back.holds("a"));
        assert_eq!(back.inventory().get("a").unwrap().deadline_timestamp(), Some(100.0));
    }
}
