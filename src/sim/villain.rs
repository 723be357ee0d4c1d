//! Villain descriptors, selection, spawning and movement
//!
//! Three regular villain types (light/medium/heavy). Selection biases toward
//! the tougher types as the run progresses while suppressing repeats via a
//! short rolling history. Movement is a tagged behavior dispatched by a single
//! match.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Obstacle, ObstacleRole};
use super::history::RingHistory;
use super::rng::SimRng;
use super::state::SimulationState;
use crate::config::VillainConfig;

/// Rolling history length for villain picks
pub const VILLAIN_HISTORY: usize = 6;

/// Floor applied to every weight before normalizing
const WEIGHT_FLOOR: f32 = 1e-3;

/// Regular villain types, lightest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VillainKind {
    Scout,
    Raider,
    Juggernaut,
}

impl VillainKind {
    pub const ALL: [VillainKind; 3] = [VillainKind::Scout, VillainKind::Raider, VillainKind::Juggernaut];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            VillainKind::Scout => 0,
            VillainKind::Raider => 1,
            VillainKind::Juggernaut => 2,
        }
    }

    /// Immutable descriptor for this type
    pub fn descriptor(self) -> &'static VillainType {
        &VILLAIN_TYPES[self.index()]
    }
}

/// Movement pattern a villain type may be spawned with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorTemplate {
    Sine,
    Hover,
    Drift,
    Tracker,
}

/// Immutable per-type tuning
#[derive(Debug)]
pub struct VillainType {
    pub kind: VillainKind,
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
    /// Health before the difficulty health ramp
    pub base_health: f32,
    /// Extra leftward speed on top of scroll speed (units/s)
    pub speed_offset_min: f32,
    pub speed_offset_max: f32,
    pub kill_score: f32,
    pub max_rotation_speed: f32,
    pub behaviors: &'static [BehaviorTemplate],
}

pub static VILLAIN_TYPES: [VillainType; 3] = [
    VillainType {
        kind: VillainKind::Scout,
        name: "Comet Scout",
        width: 58.0,
        height: 44.0,
        base_health: 1.0,
        speed_offset_min: 40.0,
        speed_offset_max: 120.0,
        kill_score: 110.0,
        max_rotation_speed: 1.6,
        behaviors: &[BehaviorTemplate::Sine, BehaviorTemplate::Drift],
    },
    VillainType {
        kind: VillainKind::Raider,
        name: "Nebula Raider",
        width: 68.0,
        height: 56.0,
        base_health: 2.0,
        speed_offset_min: 20.0,
        speed_offset_max: 80.0,
        kill_score: 160.0,
        max_rotation_speed: 1.0,
        behaviors: &[BehaviorTemplate::Tracker, BehaviorTemplate::Sine, BehaviorTemplate::Hover],
    },
    VillainType {
        kind: VillainKind::Juggernaut,
        name: "Void Juggernaut",
        width: 92.0,
        height: 74.0,
        base_health: 3.0,
        speed_offset_min: 0.0,
        speed_offset_max: 40.0,
        kill_score: 240.0,
        max_rotation_speed: 0.5,
        behaviors: &[BehaviorTemplate::Drift, BehaviorTemplate::Hover],
    },
];

/// Per-instance movement state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VillainBehavior {
    /// Weaves around a horizontal lane
    Sine {
        base_y: f32,
        amplitude: f32,
        /// Radians per second
        frequency: f32,
        phase: f32,
    },
    /// Slides in, holds position while bobbing, then departs
    Hover {
        hover_x: f32,
        hold_ms: f32,
        held_ms: f32,
        base_y: f32,
        bob_amplitude: f32,
    },
    /// Straight line with vertical drift, bouncing off the edges
    Drift,
    /// Steers vertically toward the player
    Tracker {
        /// Vertical speed per unit of offset (1/s)
        turn_rate: f32,
        max_vertical: f32,
    },
    /// Boss pattern: triangle-wave vertical sweep around a hover point
    Sweep {
        hover_x: f32,
        hold_ms: f32,
        held_ms: f32,
        center_y: f32,
        amplitude: f32,
        period_ms: f32,
    },
}

/// Environment a behavior reads each step
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext {
    pub dt_ms: f32,
    pub player_center: Vec2,
    pub viewport: Vec2,
    pub knockback_damping: f32,
}

/// Anti-repetition weighted villain picker
#[derive(Debug, Clone, Default)]
pub struct VillainSelector {
    history: RingHistory<VillainKind, VILLAIN_HISTORY>,
    previous: Option<VillainKind>,
}

impl VillainSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<VillainKind> {
        self.previous
    }

    pub fn history(&self) -> &RingHistory<VillainKind, VILLAIN_HISTORY> {
        &self.history
    }

    /// Normalized selection weights, indexed by `VillainKind::index`
    pub fn weights(&self, progress: f32, config: &VillainConfig) -> [f32; 3] {
        let progress = crate::clamp01(progress);
        let mut weights = [
            config.light_weight,
            config.medium_weight + config.medium_bias * progress,
            config.heavy_weight + config.heavy_bias * progress,
        ];

        if let Some(prev) = self.previous {
            weights[prev.index()] *= config.repeat_penalty;
        }

        let size = self.history.capacity() as f32;
        for kind in VillainKind::ALL {
            let seen = self.history.count(kind) as f32;
            if seen > 0.0 {
                weights[kind.index()] /= 1.0 + seen / size;
            }
        }

        weights[VillainKind::Juggernaut.index()] *= config.rarest_dampen;

        for w in &mut weights {
            if !w.is_finite() || *w < WEIGHT_FLOOR {
                *w = WEIGHT_FLOOR;
            }
        }
        let total: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }
        weights
    }

    /// Roll the next villain type and record it
    pub fn select(&mut self, progress: f32, config: &VillainConfig, rng: &mut SimRng) -> VillainKind {
        let weights = self.weights(progress, config);
        let kind = rng
            .weighted_index(&weights)
            .map(|i| VillainKind::ALL[i])
            .unwrap_or(VillainKind::Scout);
        self.history.push(kind);
        self.previous = Some(kind);
        kind
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.previous = None;
    }
}

/// Build a behavior from a template, with randomized parameters
fn instantiate_behavior(
    template: BehaviorTemplate,
    spawn_y: f32,
    height: f32,
    viewport: Vec2,
    rng: &mut SimRng,
) -> (VillainBehavior, f32) {
    let max_y = (viewport.y - height).max(0.0);
    match template {
        BehaviorTemplate::Sine => {
            let amplitude = rng.range(30.0, 90.0).min(max_y * 0.5);
            let base_y = crate::clamp_range(spawn_y, amplitude, max_y - amplitude);
            (
                VillainBehavior::Sine {
                    base_y,
                    amplitude,
                    frequency: rng.range(1.8, 3.6),
                    phase: rng.range(0.0, std::f32::consts::TAU),
                },
                base_y,
            )
        }
        BehaviorTemplate::Hover => (
            VillainBehavior::Hover {
                hover_x: rng.range(viewport.x * 0.55, viewport.x * 0.8),
                hold_ms: rng.range(1400.0, 2600.0),
                held_ms: 0.0,
                base_y: spawn_y,
                bob_amplitude: rng.range(10.0, 28.0),
            },
            spawn_y,
        ),
        BehaviorTemplate::Drift => (VillainBehavior::Drift, spawn_y),
        BehaviorTemplate::Tracker => (
            VillainBehavior::Tracker {
                turn_rate: rng.range(1.4, 2.4),
                max_vertical: rng.range(110.0, 170.0),
            },
            spawn_y,
        ),
    }
}

/// Spawn one villain at the right edge
pub fn spawn_villain(state: &mut SimulationState) -> u32 {
    let progress = state.difficulty.progress;
    let kind = state
        .villain_selector
        .select(progress, &state.config.villains, &mut state.rng);
    let desc = kind.descriptor();
    let viewport = state.viewport();

    let size = Vec2::new(desc.width, desc.height);
    let max_health = (desc.base_health * state.difficulty.health).round().max(1.0);
    let speed = state.game_speed + state.rng.range(desc.speed_offset_min, desc.speed_offset_max);
    let spawn_y = state.rng.range(0.0, (viewport.y - size.y).max(0.0));

    let template = desc.behaviors[state.rng.index(desc.behaviors.len())];
    let (behavior, y) = instantiate_behavior(template, spawn_y, size.y, viewport, &mut state.rng);
    let vy = match behavior {
        VillainBehavior::Drift => state.rng.range(40.0, 110.0) * state.rng.sign(),
        _ => 0.0,
    };

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        role: ObstacleRole::Villain(kind),
        pos: Vec2::new(viewport.x + 10.0, y),
        size,
        vel: Vec2::new(-speed, vy),
        health: max_health,
        max_health,
        rotation: 0.0,
        rotation_speed: state.rng.range(-desc.max_rotation_speed, desc.max_rotation_speed),
        behavior,
        bounce_timer: 0.0,
        knockback: Vec2::ZERO,
        shield_cooldown: 0.0,
        hit_flash: 0.0,
        age_ms: 0.0,
    });
    log::debug!("Spawned {} (hp {}) with {:?}", desc.name, max_health, template);
    id
}

/// Triangle wave in [-1, 1] with period 1
#[inline]
fn triangle_wave(t: f32) -> f32 {
    let f = t - t.floor();
    if f < 0.5 { 4.0 * f - 1.0 } else { 3.0 - 4.0 * f }
}

/// Advance one obstacle by its behavior
pub fn update_obstacle(ob: &mut Obstacle, ctx: &BehaviorContext) {
    let dt_ms = ctx.dt_ms;
    let dt = dt_ms / 1000.0;
    ob.age_ms += dt_ms;
    let age_s = ob.age_ms / 1000.0;
    let max_y = (ctx.viewport.y - ob.size.y).max(0.0);

    match &mut ob.behavior {
        VillainBehavior::Sine {
            base_y,
            amplitude,
            frequency,
            phase,
        } => {
            ob.pos.x += ob.vel.x * dt;
            ob.pos.y = *base_y + (*phase + age_s * *frequency).sin() * *amplitude;
        }
        VillainBehavior::Hover {
            hover_x,
            hold_ms,
            held_ms,
            base_y,
            bob_amplitude,
        } => {
            if ob.pos.x > *hover_x && *held_ms == 0.0 {
                ob.pos.x = (ob.pos.x + ob.vel.x * dt).max(*hover_x);
            } else if *held_ms < *hold_ms {
                *held_ms += dt_ms;
                ob.pos.y = *base_y + (age_s * 2.2).sin() * *bob_amplitude;
            } else {
                ob.pos.x += ob.vel.x * 1.25 * dt;
            }
        }
        VillainBehavior::Drift => {
            ob.pos += ob.vel * dt;
            if ob.bounce_timer <= 0.0
                && ((ob.pos.y <= 0.0 && ob.vel.y < 0.0) || (ob.pos.y >= max_y && ob.vel.y > 0.0))
            {
                ob.vel.y = -ob.vel.y;
                ob.bounce_timer = 250.0;
            }
        }
        VillainBehavior::Tracker {
            turn_rate,
            max_vertical,
        } => {
            let target_y = ctx.player_center.y - ob.size.y * 0.5;
            let desired = ((target_y - ob.pos.y) * *turn_rate).clamp(-*max_vertical, *max_vertical);
            ob.vel.y += (desired - ob.vel.y) * (dt * 3.0).min(1.0);
            ob.pos += ob.vel * dt;
        }
        VillainBehavior::Sweep {
            hover_x,
            hold_ms,
            held_ms,
            center_y,
            amplitude,
            period_ms,
        } => {
            if ob.pos.x > *hover_x && *held_ms == 0.0 {
                ob.pos.x = (ob.pos.x + ob.vel.x * dt).max(*hover_x);
            } else {
                if *held_ms < *hold_ms {
                    *held_ms += dt_ms;
                } else {
                    ob.pos.x += ob.vel.x * dt;
                }
                let phase = if *period_ms > 0.0 { ob.age_ms / *period_ms } else { 0.0 };
                ob.pos.y = *center_y + triangle_wave(phase) * *amplitude;
            }
        }
    }

    if ob.knockback != Vec2::ZERO {
        ob.pos += ob.knockback * dt;
        ob.knockback *= (1.0 - ctx.knockback_damping * dt).max(0.0);
        if ob.knockback.length_squared() < 1.0 {
            ob.knockback = Vec2::ZERO;
        }
    }

    ob.pos.y = ob.pos.y.clamp(0.0, max_y);
    ob.rotation += ob.rotation_speed * dt;
    ob.bounce_timer = (ob.bounce_timer - dt_ms).max(0.0);
    ob.shield_cooldown = (ob.shield_cooldown - dt_ms).max(0.0);
    ob.hit_flash = (ob.hit_flash - dt_ms).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BehaviorContext {
        BehaviorContext {
            dt_ms: 1000.0 / 60.0,
            player_center: Vec2::new(100.0, 400.0),
            viewport: Vec2::new(960.0, 540.0),
            knockback_damping: 3.5,
        }
    }

    fn obstacle(behavior: VillainBehavior) -> Obstacle {
        Obstacle {
            id: 1,
            role: ObstacleRole::Villain(VillainKind::Raider),
            pos: Vec2::new(900.0, 100.0),
            size: Vec2::new(60.0, 50.0),
            vel: Vec2::new(-300.0, 0.0),
            health: 2.0,
            max_health: 2.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            behavior,
            bounce_timer: 0.0,
            knockback: Vec2::ZERO,
            shield_cooldown: 0.0,
            hit_flash: 0.0,
            age_ms: 0.0,
        }
    }

    #[test]
    fn test_weights_sum_to_one_and_bias_with_progress() {
        let cfg = VillainConfig::default();
        let sel = VillainSelector::new();
        let early = sel.weights(0.0, &cfg);
        let late = sel.weights(1.0, &cfg);
        assert!((early.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((late.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(late[2] > early[2]);
        assert!(late[1] > early[1]);
        assert!(late[0] < early[0]);
    }

    #[test]
    fn test_previous_pick_is_penalized_not_excluded() {
        let cfg = VillainConfig::default();
        let mut sel = VillainSelector::new();
        let base = sel.weights(0.0, &cfg);
        sel.previous = Some(VillainKind::Scout);
        sel.history.push(VillainKind::Scout);
        let after = sel.weights(0.0, &cfg);
        assert!(after[0] < base[0]);
        assert!(after[0] > 0.0);
    }

    #[test]
    fn test_zero_weights_floor_to_epsilon() {
        let cfg = VillainConfig {
            light_weight: 0.0,
            medium_weight: 0.0,
            heavy_weight: 0.0,
            medium_bias: 0.0,
            heavy_bias: 0.0,
            ..Default::default()
        };
        let w = VillainSelector::new().weights(0.5, &cfg);
        for v in w {
            assert!(v > 0.0);
        }
    }

    #[test]
    fn test_selection_suppresses_streaks() {
        let cfg = VillainConfig::default();
        let mut sel = VillainSelector::new();
        let mut rng = SimRng::new(77);
        let mut repeats = 0;
        let mut last = None;
        let mut counts = [0u32; 3];
        for _ in 0..3000 {
            let k = sel.select(0.5, &cfg, &mut rng);
            counts[k.index()] += 1;
            if last == Some(k) {
                repeats += 1;
            }
            last = Some(k);
        }
        // Every type shows up and back-to-back repeats stay a minority
        assert!(counts.iter().all(|&c| c > 0), "{counts:?}");
        assert!(repeats < 1200, "repeats {repeats}");
    }

    #[test]
    fn test_sine_behavior_stays_on_lane() {
        let mut ob = obstacle(VillainBehavior::Sine {
            base_y: 200.0,
            amplitude: 40.0,
            frequency: 2.0,
            phase: 0.0,
        });
        for _ in 0..120 {
            update_obstacle(&mut ob, &ctx());
            assert!((ob.pos.y - 200.0).abs() <= 40.0 + 1e-3);
        }
        assert!(ob.pos.x < 900.0 - 500.0);
    }

    #[test]
    fn test_hover_holds_then_departs() {
        let mut ob = obstacle(VillainBehavior::Hover {
            hover_x: 700.0,
            hold_ms: 500.0,
            held_ms: 0.0,
            base_y: 100.0,
            bob_amplitude: 10.0,
        });
        for _ in 0..60 {
            update_obstacle(&mut ob, &ctx());
        }
        // Reached hover point and holding or just released
        assert!(ob.pos.x <= 700.0 + 1e-3);
        assert!(ob.pos.x > 600.0);
        for _ in 0..120 {
            update_obstacle(&mut ob, &ctx());
        }
        assert!(ob.pos.x < 600.0);
    }

    #[test]
    fn test_drift_bounces_off_edges() {
        let mut ob = obstacle(VillainBehavior::Drift);
        ob.pos.y = 2.0;
        ob.vel = Vec2::new(-100.0, -200.0);
        for _ in 0..5 {
            update_obstacle(&mut ob, &ctx());
        }
        assert!(ob.vel.y > 0.0);
        assert!(ob.pos.y >= 0.0);
    }

    #[test]
    fn test_tracker_moves_toward_player() {
        let mut ob = obstacle(VillainBehavior::Tracker {
            turn_rate: 2.0,
            max_vertical: 150.0,
        });
        let start = ob.pos.y;
        for _ in 0..30 {
            update_obstacle(&mut ob, &ctx());
        }
        assert!(ob.pos.y > start);
    }

    #[test]
    fn test_knockback_decays() {
        let mut ob = obstacle(VillainBehavior::Drift);
        ob.vel = Vec2::ZERO;
        ob.knockback = Vec2::new(300.0, 0.0);
        for _ in 0..240 {
            update_obstacle(&mut ob, &ctx());
        }
        assert_eq!(ob.knockback, Vec2::ZERO);
        assert!(ob.pos.x > 900.0);
    }

    #[test]
    fn test_triangle_wave_range() {
        assert_eq!(triangle_wave(0.0), -1.0);
        assert_eq!(triangle_wave(0.5), 1.0);
        assert_eq!(triangle_wave(0.25), 0.0);
        assert_eq!(triangle_wave(1.0), -1.0);
    }
}
