//! A scripted stand-in for the human courier.
//!
//! Each tick the player heads for the closest job it can act on, picking up
//! or delivering as soon as the target is inside the interaction radius.

use cq_core::AgentId;
use cq_map::{AStarPathfinder, Pathfinder};
use cq_sim::{Session, SessionResult};

pub struct ScriptedPlayer {
    finder: AStarPathfinder,
}

impl ScriptedPlayer {
    pub fn new() -> Self {
        Self { finder: AStarPathfinder::default() }
    }

    /// Issue this tick's player commands.
    pub fn act(&self, session: &mut Session) -> SessionResult<()> {
        let me = AgentId::Player;
        let pos = session.courier(me).position();
        let radius = session.config().interaction_radius;

        let Some(near) = session.nearest_job(me, f64::MAX) else {
            return Ok(());
        };
        let (id, target, delivery) = (near.job.id.clone(), near.target, near.delivery);

        if pos.manhattan(target) <= radius {
            if delivery {
                session.attempt_deliver(me, &id)?;
            } else {
                session.attempt_pickup(me, &id)?;
            }
            return Ok(());
        }

        if !session.courier(me).can_move() {
            return Ok(());
        }
        match self.finder.find_path(session.map(), pos, target) {
            Ok(path) => {
                let dir = path.cells.get(1).and_then(|&next| pos.direction_to(next));
                if let Some(dir) = dir {
                    session.attempt_move(me, dir);
                }
            }
            Err(e) => tracing::debug!(job = %id, error = %e, "player has no route"),
        }
        Ok(())
    }
}
