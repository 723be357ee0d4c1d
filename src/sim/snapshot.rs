//! Read-only frame snapshot for renderers and HUDs
//!
//! Borrowed views over the entity pools plus owned HUD scalars. Serializable
//! so a headless host can dump frames as JSON.

use serde::Serialize;

use super::boss::BossPhase;
use super::entity::{
    AreaBurst, Asteroid, Collectible, EnemyProjectile, FloatingText, Obstacle, Particle, Player, PowerUp, Projectile,
    Star, TrailPoint,
};
use super::powerup::PowerUpKind;
use super::state::{GamePhase, SimulationState};

/// One active power-up and its remaining time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining_ms: f32,
}

/// Boss battle status for the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossHud {
    pub phase: BossPhase,
    pub key: Option<String>,
    /// Countdown while the alert banner is up (ms)
    pub alert_remaining_ms: f32,
    /// Active boss health as a fraction of max
    pub health_ratio: Option<f32>,
}

/// HUD scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub multiplier: f32,
    pub pickups: u32,
    pub elapsed_ms: f32,
    pub game_speed: f32,
    pub tail_length: f32,
    pub dash_ready: bool,
    pub beam_intensity: f32,
    pub power_ups: Vec<ActivePowerUp>,
    pub boss: BossHud,
}

impl HudSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let surge = state.power_ups.is_active(PowerUpKind::ScoreSurge);
        let health_ratio = state
            .obstacles
            .iter()
            .find(|o| o.is_boss())
            .map(|b| if b.max_health > 0.0 { b.health / b.max_health } else { 0.0 });

        Self {
            phase: state.phase,
            score: state.score.score,
            streak: state.score.streak,
            best_streak: state.score.best_streak,
            multiplier: state.score.multiplier(surge, &state.config.scoring),
            pickups: state.score.pickups,
            elapsed_ms: state.elapsed_ms,
            game_speed: state.game_speed,
            tail_length: state.score.tail_length,
            dash_ready: state.player.dash_cooldown <= 0.0,
            beam_intensity: state.beam_intensity,
            power_ups: state
                .power_ups
                .iter_active()
                .map(|(kind, remaining_ms)| ActivePowerUp { kind, remaining_ms })
                .collect(),
            boss: BossHud {
                phase: state.boss.phase,
                key: state.boss.active_key.clone(),
                alert_remaining_ms: state.boss.alert_remaining_ms,
                health_ratio,
            },
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<'a> {
    pub step: u64,
    pub player: &'a Player,
    pub clone: Option<&'a Player>,
    pub tail: &'a [TrailPoint],
    pub obstacles: &'a [Obstacle],
    pub asteroids: &'a [Asteroid],
    pub projectiles: &'a [Projectile],
    pub enemy_projectiles: &'a [EnemyProjectile],
    pub collectibles: &'a [Collectible],
    pub pickups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub texts: &'a [FloatingText],
    pub bursts: &'a [AreaBurst],
    pub stars: &'a [Star],
    pub hud: HudSnapshot,
}

impl<'a> FrameSnapshot<'a> {
    pub fn capture(state: &'a SimulationState) -> Self {
        Self {
            step: state.step_count,
            player: &state.player,
            clone: state.clone.as_ref(),
            tail: &state.tail,
            obstacles: &state.obstacles,
            asteroids: &state.asteroids,
            projectiles: &state.projectiles,
            enemy_projectiles: &state.enemy_projectiles,
            collectibles: &state.collectibles,
            pickups: &state.pickups,
            particles: &state.effects.particles,
            texts: &state.effects.texts,
            bursts: &state.effects.bursts,
            stars: &state.effects.stars,
            hud: HudSnapshot::capture(state),
        }
    }
}
