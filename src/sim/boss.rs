//! Boss battle director
//!
//! `Inactive → Alert → Active → Defeated | Escaped`. The roster is walked in
//! order by elapsed-time triggers and loops once exhausted, each lap tougher.
//! While a battle is in the Alert or Active phase regular spawning is
//! suppressed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{BossAttachment, EnemyProjectile, Obstacle, ObstacleRole};
use super::events::{BossStatus, GameEvent};
use super::powerup::spawn_power_up_at;
use super::state::SimulationState;
use super::tick::resume_spawning;
use super::villain::VillainBehavior;
use crate::config::{BossConfig, BossSpec, unset};

/// Boss firing pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttackPattern {
    /// One shot aimed at the player
    Focused {
        #[serde(default = "unset")]
        cooldown_ms: f32,
    },
    /// `shots` aimed shots fanned `spread` radians apart
    Spread {
        #[serde(default = "default_spread_shots")]
        shots: u32,
        #[serde(default = "unset")]
        spread: f32,
        #[serde(default = "unset")]
        cooldown_ms: f32,
    },
    /// `burst` aimed shots `interval_ms` apart, then `cooldown_ms`
    Barrage {
        #[serde(default = "default_barrage_burst")]
        burst: u32,
        #[serde(default = "unset")]
        interval_ms: f32,
        #[serde(default = "unset")]
        cooldown_ms: f32,
    },
}

fn default_spread_shots() -> u32 {
    5
}

fn default_barrage_burst() -> u32 {
    6
}

impl AttackPattern {
    pub fn cooldown_ms(&self) -> f32 {
        match *self {
            AttackPattern::Focused { cooldown_ms }
            | AttackPattern::Spread { cooldown_ms, .. }
            | AttackPattern::Barrage { cooldown_ms, .. } => cooldown_ms,
        }
    }

    /// Clamp counts and timings into playable ranges
    pub fn sanitized(self) -> Self {
        let cooldown = |ms: f32| if ms.is_finite() && ms >= 100.0 { ms } else { 1500.0 };
        match self {
            AttackPattern::Focused { cooldown_ms } => AttackPattern::Focused {
                cooldown_ms: cooldown(cooldown_ms),
            },
            AttackPattern::Spread {
                shots,
                spread,
                cooldown_ms,
            } => AttackPattern::Spread {
                shots: shots.clamp(1, 24),
                spread: if spread.is_finite() { spread.clamp(0.0, 1.0) } else { 0.2 },
                cooldown_ms: cooldown(cooldown_ms),
            },
            AttackPattern::Barrage {
                burst,
                interval_ms,
                cooldown_ms,
            } => AttackPattern::Barrage {
                burst: burst.clamp(1, 32),
                interval_ms: if interval_ms.is_finite() { interval_ms.max(16.0) } else { 120.0 },
                cooldown_ms: cooldown(cooldown_ms),
            },
        }
    }
}

/// Battle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Inactive,
    Alert,
    Active,
    Defeated,
    Escaped,
}

/// Boss battle sub-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossBattle {
    pub phase: BossPhase,
    /// Position in the looping roster sequence
    pub next_index: usize,
    pub alert_remaining_ms: f32,
    pub active_id: Option<u32>,
    pub active_key: Option<String>,
    pub defeated: u32,
}

impl Default for BossBattle {
    fn default() -> Self {
        Self {
            phase: BossPhase::Inactive,
            next_index: 0,
            alert_remaining_ms: 0.0,
            active_id: None,
            active_key: None,
            defeated: 0,
        }
    }
}

impl BossBattle {
    /// Regular spawning is paused in these phases
    pub fn suppresses_spawning(&self) -> bool {
        matches!(self.phase, BossPhase::Alert | BossPhase::Active)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, BossPhase::Inactive | BossPhase::Defeated)
    }
}

/// Roster entry and lap for a sequence index
pub fn spec_for(index: usize, config: &BossConfig) -> Option<(&BossSpec, usize)> {
    let len = config.roster.len();
    if len == 0 {
        return None;
    }
    Some((&config.roster[index % len], index / len))
}

/// Elapsed time (ms) at which sequence entry `index` triggers
pub fn trigger_time(index: usize, config: &BossConfig) -> Option<f32> {
    let (spec, lap) = spec_for(index, config)?;
    let (first, last) = config
        .roster
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.trigger_ms), hi.max(b.trigger_ms))
        });
    let lap_span = (last - first) + config.repeat_interval_ms;
    Some(spec.trigger_ms + lap as f32 * lap_span)
}

/// Advance the battle state machine by one step
pub fn update_battle(state: &mut SimulationState, dt_ms: f32) {
    match state.boss.phase {
        BossPhase::Inactive | BossPhase::Defeated => {
            let index = state.boss.next_index;
            let Some(trigger) = trigger_time(index, &state.config.bosses) else {
                return;
            };
            if state.elapsed_ms >= trigger {
                let key = spec_for(index, &state.config.bosses)
                    .map(|(s, _)| s.key.clone())
                    .unwrap_or_default();
                state.boss.phase = BossPhase::Alert;
                state.boss.alert_remaining_ms = state.config.bosses.alert_ms;
                state.boss.active_key = Some(key.clone());
                log::info!("Boss alert: {key} at {:.1}s", state.elapsed_ms / 1000.0);
                state.events.push(GameEvent::BossStatus {
                    status: BossStatus::Alert,
                    boss_key: key,
                });
            }
        }
        BossPhase::Alert => {
            state.boss.alert_remaining_ms -= dt_ms;
            if state.boss.alert_remaining_ms <= 0.0 {
                state.boss.alert_remaining_ms = 0.0;
                begin_battle(state);
            }
        }
        BossPhase::Active => update_attack(state, dt_ms),
        BossPhase::Escaped => {}
    }
}

/// Clear the field and bring in the boss plus its support drop
pub fn begin_battle(state: &mut SimulationState) {
    let index = state.boss.next_index;
    let Some((spec, lap)) = spec_for(index, &state.config.bosses) else {
        return;
    };
    let spec = spec.clone();
    let viewport = state.viewport();

    state.obstacles.retain(|o| o.is_boss());
    state.collectibles.clear();
    state.pickups.clear();
    state.spawn_timers.clear();

    let health_scale = (1.0 + lap as f32 * state.config.bosses.lap_health_bonus) * state.config.mode.health_scale();
    let max_health = (spec.health * health_scale).round().max(1.0);
    let size = Vec2::new(spec.width, spec.height);
    let center_y = ((viewport.y - size.y) * 0.5).max(0.0);
    let behavior = VillainBehavior::Sweep {
        hover_x: (viewport.x * spec.hover_x_ratio - size.x * 0.5).max(0.0),
        hold_ms: spec.hover_ms,
        held_ms: 0.0,
        center_y,
        amplitude: spec.sweep_amplitude.min(center_y),
        period_ms: spec.sweep_period_ms,
    };

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        role: ObstacleRole::Boss(BossAttachment {
            sequence_index: index,
            key: spec.key.clone(),
            name: spec.name.clone(),
            attack_timer: spec.attack.pattern.cooldown_ms(),
            burst_remaining: 0,
            attack: spec.attack.clone(),
            score: spec.score,
        }),
        pos: Vec2::new(viewport.x + 10.0, center_y),
        size,
        vel: Vec2::new(-spec.speed, 0.0),
        health: max_health,
        max_health,
        rotation: 0.0,
        rotation_speed: 0.0,
        behavior,
        bounce_timer: 0.0,
        knockback: Vec2::ZERO,
        shield_cooldown: 0.0,
        hit_flash: 0.0,
        age_ms: 0.0,
    });

    let drop_side = state.config.power_ups.size;
    let drop_pos = Vec2::new(viewport.x + 10.0, (viewport.y - drop_side) * 0.5);
    spawn_power_up_at(state, spec.support_power_up, drop_pos);

    state.boss.phase = BossPhase::Active;
    state.boss.active_id = Some(id);
    state.boss.active_key = Some(spec.key.clone());
    log::info!("Boss battle: {} (hp {max_health}, lap {lap})", spec.name);
    state.events.push(GameEvent::BossStatus {
        status: BossStatus::Active,
        boss_key: spec.key,
    });
}

fn boss_index(state: &SimulationState) -> Option<usize> {
    let id = state.boss.active_id?;
    state.obstacles.iter().position(|o| o.id == id)
}

/// Tick the active boss's attack timer and fire when due
fn update_attack(state: &mut SimulationState, dt_ms: f32) {
    let Some(idx) = boss_index(state) else {
        return;
    };
    let viewport = state.viewport();
    let target = state.player.center();

    let ob = &mut state.obstacles[idx];
    // Hold fire until fully on screen
    if ob.pos.x + ob.size.x > viewport.x {
        return;
    }
    let muzzle = Vec2::new(ob.pos.x, ob.pos.y + ob.size.y * 0.5);
    let ObstacleRole::Boss(boss) = &mut ob.role else {
        return;
    };
    boss.attack_timer -= dt_ms;
    if boss.attack_timer > 0.0 {
        return;
    }

    let aim = (target - muzzle).to_angle();
    let mut angles = Vec::new();
    match boss.attack.pattern {
        AttackPattern::Focused { cooldown_ms } => {
            angles.push(aim);
            boss.attack_timer = cooldown_ms;
        }
        AttackPattern::Spread {
            shots,
            spread,
            cooldown_ms,
        } => {
            let mid = (shots as f32 - 1.0) * 0.5;
            angles.extend((0..shots).map(|k| aim + (k as f32 - mid) * spread));
            boss.attack_timer = cooldown_ms;
        }
        AttackPattern::Barrage {
            burst,
            interval_ms,
            cooldown_ms,
        } => {
            if boss.burst_remaining == 0 {
                boss.burst_remaining = burst;
            }
            angles.push(aim);
            boss.burst_remaining -= 1;
            boss.attack_timer = if boss.burst_remaining > 0 {
                interval_ms
            } else {
                cooldown_ms
            };
        }
    }

    let attack = boss.attack.clone();
    let key = boss.key.clone();
    for angle in angles {
        let id = state.next_entity_id();
        state.enemy_projectiles.push(EnemyProjectile {
            id,
            pos: muzzle,
            vel: Vec2::from_angle(angle) * attack.projectile_speed,
            radius: attack.projectile_size * 0.5,
            life_ms: attack.projectile_life_ms,
            boss_key: key.clone(),
            message: attack.message.clone(),
            deflected: false,
        });
    }
}

/// The active boss was destroyed; its obstacle is already removed
pub fn on_boss_defeated(state: &mut SimulationState, key: &str) {
    state.boss.phase = BossPhase::Defeated;
    state.boss.active_id = None;
    state.boss.active_key = None;
    state.boss.next_index += 1;
    state.boss.defeated += 1;
    resume_spawning(state);
    log::info!("Boss defeated: {key}");
    state.events.push(GameEvent::BossStatus {
        status: BossStatus::Defeated,
        boss_key: key.to_string(),
    });
}

/// The active boss left the screen; the run ends
pub fn on_boss_escaped(state: &mut SimulationState, name: &str, key: &str) {
    state.boss.phase = BossPhase::Escaped;
    state.boss.active_id = None;
    state.events.push(GameEvent::BossStatus {
        status: BossStatus::Escaped,
        boss_key: key.to_string(),
    });
    state.end_run(format!("{name} escaped"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::powerup::PowerUpKind;
    use crate::sim::state::GamePhase;

    fn running_state() -> SimulationState {
        let mut state = SimulationState::new(42, SimConfig::default());
        state.phase = GamePhase::Running;
        state
    }

    #[test]
    fn test_trigger_times_loop_after_roster() {
        let cfg = BossConfig::default();
        assert_eq!(trigger_time(0, &cfg), Some(75_000.0));
        assert_eq!(trigger_time(2, &cfg), Some(270_000.0));
        let span = (270_000.0 - 75_000.0) + cfg.repeat_interval_ms;
        assert_eq!(trigger_time(3, &cfg), Some(75_000.0 + span));
        assert_eq!(spec_for(4, &cfg).map(|(s, lap)| (s.key.as_str(), lap)), Some(("comet_hydra", 1)));
    }

    #[test]
    fn test_pattern_sanitize() {
        let p = AttackPattern::Spread {
            shots: 0,
            spread: f32::NAN,
            cooldown_ms: -1.0,
        }
        .sanitized();
        assert_eq!(
            p,
            AttackPattern::Spread {
                shots: 1,
                spread: 0.2,
                cooldown_ms: 1500.0
            }
        );
    }

    #[test]
    fn test_alert_then_active_clears_field() {
        let mut state = running_state();
        state.elapsed_ms = 75_000.0;
        crate::sim::villain::spawn_villain(&mut state);
        crate::sim::collectible::spawn_collectible(&mut state);
        update_battle(&mut state, 16.0);
        assert_eq!(state.boss.phase, BossPhase::Alert);
        assert!(state.boss.suppresses_spawning());

        let mut t = 0.0;
        while state.boss.phase == BossPhase::Alert {
            update_battle(&mut state, 16.0);
            t += 16.0;
            assert!(t < 5000.0);
        }
        assert_eq!(state.boss.phase, BossPhase::Active);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.obstacles[0].is_boss());
        assert!(state.collectibles.is_empty());
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].kind, PowerUpKind::RadiantShield);

        let statuses: Vec<_> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::BossStatus { status, .. } => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![BossStatus::Alert, BossStatus::Active]);
    }

    #[test]
    fn test_spread_fires_fan_once_on_screen() {
        let mut state = running_state();
        state.boss.next_index = 1;
        begin_battle(&mut state);
        let idx = boss_index(&state).unwrap();
        state.obstacles[idx].pos.x = 500.0;
        if let ObstacleRole::Boss(b) = &mut state.obstacles[idx].role {
            b.attack_timer = 0.0;
        }
        update_attack(&mut state, 16.0);
        assert_eq!(state.enemy_projectiles.len(), 5);
        // Fan is symmetric around the aim direction
        let dirs: Vec<Vec2> = state.enemy_projectiles.iter().map(|p| p.vel.normalize()).collect();
        let outer = (dirs[0] + dirs[4]).normalize();
        assert!(outer.dot(dirs[2]) > 0.9999);
        assert!((dirs[0].angle_to(dirs[1]) - 0.22).abs() < 1e-3);
    }

    #[test]
    fn test_barrage_bursts_then_cools_down() {
        let mut state = running_state();
        state.boss.next_index = 2;
        begin_battle(&mut state);
        let idx = boss_index(&state).unwrap();
        state.obstacles[idx].pos.x = 500.0;
        if let ObstacleRole::Boss(b) = &mut state.obstacles[idx].role {
            b.attack_timer = 0.0;
        }
        for _ in 0..6 {
            update_attack(&mut state, 120.0);
        }
        assert_eq!(state.enemy_projectiles.len(), 6);
        let timer = state.obstacles[idx].boss().map(|b| b.attack_timer).unwrap();
        assert_eq!(timer, 3200.0);
        update_attack(&mut state, 120.0);
        assert_eq!(state.enemy_projectiles.len(), 6);
    }

    #[test]
    fn test_defeat_advances_index() {
        let mut state = running_state();
        begin_battle(&mut state);
        state.obstacles.clear();
        on_boss_defeated(&mut state, "nebula_warden");
        assert_eq!(state.boss.phase, BossPhase::Defeated);
        assert_eq!(state.boss.next_index, 1);
        assert!(state.boss.is_idle());
        assert!(!state.boss.suppresses_spawning());
    }

    #[test]
    fn test_later_laps_are_tougher() {
        let mut state = running_state();
        begin_battle(&mut state);
        let first = state.obstacles[0].max_health;
        state.obstacles.clear();
        state.boss.next_index = 3;
        begin_battle(&mut state);
        assert!(state.obstacles[0].max_health > first);
    }
}
