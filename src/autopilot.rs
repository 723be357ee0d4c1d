//! Autopilot - scripted input for demos and headless runs
//!
//! Pure function of the state, so a replay with the same seed produces the
//! same intents step for step.

use glam::Vec2;

use crate::sim::state::{InputIntent, SimulationState};

/// How far ahead of the ship hazards are considered
const LOOKAHEAD: f32 = 280.0;
/// Extra vertical clearance kept around hazards
const CLEARANCE: f32 = 26.0;
/// Vertical offset treated as "lined up" when chasing
const DEADZONE: f32 = 6.0;

/// A threat in front of the ship: its center and vertical half-extent
struct Threat {
    center: Vec2,
    half_height: f32,
}

fn threats(state: &SimulationState) -> Vec<Threat> {
    let obstacles = state.obstacles.iter().map(|o| Threat {
        center: o.center(),
        half_height: o.size.y * 0.5,
    });
    let asteroids = state.asteroids.iter().map(|a| Threat {
        center: a.pos,
        half_height: a.radius,
    });
    let shots = state
        .enemy_projectiles
        .iter()
        .filter(|s| !s.deflected)
        .map(|s| Threat {
            center: s.pos,
            half_height: s.radius,
        });
    obstacles.chain(asteroids).chain(shots).collect()
}

/// Build this step's input: dodge, then chase, then drift home
pub fn autopilot_intent(state: &SimulationState) -> InputIntent {
    let ship = state.player.center();
    let half = state.player.size.y * 0.5;
    let viewport = state.viewport();

    // Most urgent hazard on a collision course
    let danger = threats(state)
        .into_iter()
        .filter(|t| {
            let ahead = t.center.x - ship.x;
            ahead > -state.player.size.x && ahead < LOOKAHEAD
        })
        .filter(|t| (t.center.y - ship.y).abs() < t.half_height + half + CLEARANCE)
        .min_by(|a, b| a.center.x.total_cmp(&b.center.x));

    let mut intent = InputIntent::new(0.0, 0.0, true);

    if let Some(threat) = danger {
        // Break away from the hazard, toward the roomier side near edges
        let mut dir = if threat.center.y > ship.y { -1.0 } else { 1.0 };
        if ship.y < half * 2.0 {
            dir = 1.0;
        } else if ship.y > viewport.y - half * 2.0 {
            dir = -1.0;
        }
        intent.move_vector.y = dir;
        intent.dash = (threat.center.x - ship.x) < LOOKAHEAD * 0.35;
    } else {
        // Nearest pickup or collectible in front
        let target = state
            .pickups
            .iter()
            .map(|p| p.center())
            .chain(state.collectibles.iter().map(|c| c.center()))
            .filter(|p| p.x > ship.x)
            .min_by(|a, b| a.distance_squared(ship).total_cmp(&b.distance_squared(ship)));

        let goal_y = target.map_or(viewport.y * 0.5, |p| p.y);
        let dy = goal_y - ship.y;
        if dy.abs() > DEADZONE {
            intent.move_vector.y = dy.signum();
        }
    }

    // Hold the starting column
    let home_x = viewport.x * state.config.player.start_x_ratio;
    let dx = home_x - ship.x;
    if dx.abs() > DEADZONE {
        intent.move_vector.x = dx.signum() * 0.5;
    }

    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::entity::Asteroid;

    #[test]
    fn test_fires_and_holds_center_when_clear() {
        let mut state = SimulationState::new(1, SimConfig::default());
        state.player.pos.y = 40.0;
        let intent = autopilot_intent(&state);
        assert!(intent.firing);
        assert_eq!(intent.move_vector.y, 1.0);
        assert!(!intent.dash);
    }

    #[test]
    fn test_dodges_hazard_ahead() {
        let mut state = SimulationState::new(1, SimConfig::default());
        let ship = state.player.center();
        state
            .asteroids
            .push(Asteroid::new(1, ship + Vec2::new(200.0, 10.0), Vec2::ZERO, 20.0, 2.0));
        let intent = autopilot_intent(&state);
        assert_eq!(intent.move_vector.y, -1.0);
        assert!(!intent.dash);

        state.asteroids[0].pos = ship + Vec2::new(60.0, -10.0);
        let intent = autopilot_intent(&state);
        assert_eq!(intent.move_vector.y, 1.0);
        assert!(intent.dash);
    }

    #[test]
    fn test_ignores_hazards_behind() {
        let mut state = SimulationState::new(1, SimConfig::default());
        let ship = state.player.center();
        state
            .asteroids
            .push(Asteroid::new(1, ship - Vec2::new(200.0, 0.0), Vec2::ZERO, 20.0, 2.0));
        let intent = autopilot_intent(&state);
        assert_eq!(intent.move_vector.y, 0.0);
    }
}
