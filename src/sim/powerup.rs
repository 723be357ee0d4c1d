//! Power-ups: kinds, the timer table and the spawn director
//!
//! The director picks what to spawn under three constraints: a per-kind
//! cooldown, a short rolling history that penalizes repeats, and mutual
//! exclusion with kinds that are still active and marked `block_while_active`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::PowerUp;
use super::history::RingHistory;
use super::rng::SimRng;
use super::state::SimulationState;
use crate::config::PowerUpConfig;
use crate::{clamp_range, clamp01, lerp};

/// Rolling history length for power-up picks
pub const POWER_UP_HISTORY: usize = 3;

/// Number of power-up kinds
pub const POWER_UP_COUNT: usize = 11;

/// The eleven power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    PowerBomb,
    BulletSpread,
    Missiles,
    FlameWhip,
    RadiantShield,
    DoubleTeam,
    HyperBeam,
    PumpDrive,
    TimeDilation,
    ScoreSurge,
    StarlightMagnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; POWER_UP_COUNT] = [
        PowerUpKind::PowerBomb,
        PowerUpKind::BulletSpread,
        PowerUpKind::Missiles,
        PowerUpKind::FlameWhip,
        PowerUpKind::RadiantShield,
        PowerUpKind::DoubleTeam,
        PowerUpKind::HyperBeam,
        PowerUpKind::PumpDrive,
        PowerUpKind::TimeDilation,
        PowerUpKind::ScoreSurge,
        PowerUpKind::StarlightMagnet,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::PowerBomb => "powerBomb",
            PowerUpKind::BulletSpread => "bulletSpread",
            PowerUpKind::Missiles => "missiles",
            PowerUpKind::FlameWhip => "flameWhip",
            PowerUpKind::RadiantShield => "radiantShield",
            PowerUpKind::DoubleTeam => "doubleTeam",
            PowerUpKind::HyperBeam => "hyperBeam",
            PowerUpKind::PumpDrive => "pumpDrive",
            PowerUpKind::TimeDilation => "timeDilation",
            PowerUpKind::ScoreSurge => "scoreSurge",
            PowerUpKind::StarlightMagnet => "starlightMagnet",
        }
    }

    /// Built-in active duration (ms)
    pub fn default_duration_ms(self) -> f32 {
        match self {
            PowerUpKind::PowerBomb => 1200.0,
            PowerUpKind::BulletSpread => 9000.0,
            PowerUpKind::Missiles => 8000.0,
            PowerUpKind::FlameWhip => 7000.0,
            PowerUpKind::RadiantShield => 6000.0,
            PowerUpKind::DoubleTeam => 8000.0,
            PowerUpKind::HyperBeam => 4200.0,
            PowerUpKind::PumpDrive => 7000.0,
            PowerUpKind::TimeDilation => 5200.0,
            PowerUpKind::ScoreSurge => 9000.0,
            PowerUpKind::StarlightMagnet => 9000.0,
        }
    }

    /// Built-in spawn rule
    pub fn default_rule(self) -> PowerUpRule {
        let base = PowerUpRule::default();
        match self {
            PowerUpKind::PowerBomb => PowerUpRule {
                weight: 0.55,
                cooldown_ms: 16_000.0,
                ..base
            },
            PowerUpKind::RadiantShield => PowerUpRule {
                weight: 0.8,
                cooldown_ms: 14_000.0,
                block_while_active: true,
                ..base
            },
            PowerUpKind::DoubleTeam => PowerUpRule {
                weight: 0.6,
                cooldown_ms: 15_000.0,
                block_while_active: true,
                ..base
            },
            PowerUpKind::HyperBeam => PowerUpRule {
                weight: 0.6,
                cooldown_ms: 15_000.0,
                block_while_active: true,
                ..base
            },
            PowerUpKind::TimeDilation => PowerUpRule {
                weight: 0.5,
                cooldown_ms: 18_000.0,
                block_while_active: true,
                repeat_penalty: 0.35,
            },
            PowerUpKind::ScoreSurge => PowerUpRule {
                weight: 0.7,
                cooldown_ms: 13_000.0,
                ..base
            },
            _ => base,
        }
    }
}

/// Spawn rule for one power-up kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpRule {
    pub weight: f32,
    pub cooldown_ms: f32,
    pub block_while_active: bool,
    pub repeat_penalty: f32,
}

impl Default for PowerUpRule {
    fn default() -> Self {
        Self {
            weight: 0.75,
            cooldown_ms: 11_000.0,
            block_while_active: false,
            repeat_penalty: 0.45,
        }
    }
}

impl PowerUpRule {
    /// Replace malformed fields with those of `fallback`
    pub fn sanitized(mut self, fallback: PowerUpRule) -> Self {
        if !self.weight.is_finite() || self.weight < 0.0 {
            self.weight = fallback.weight;
        }
        if !self.cooldown_ms.is_finite() || self.cooldown_ms < 0.0 {
            self.cooldown_ms = fallback.cooldown_ms;
        }
        if !self.repeat_penalty.is_finite() || self.repeat_penalty < 0.0 {
            self.repeat_penalty = fallback.repeat_penalty;
        }
        self
    }
}

/// Remaining duration per kind. A kind is active iff its timer is > 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    remaining: [f32; POWER_UP_COUNT],
}

impl PowerUpTimers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining[kind.index()] > 0.0
    }

    #[inline]
    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        self.remaining[kind.index()]
    }

    /// Start or refresh a timer (refresh keeps the longer of the two)
    pub fn activate(&mut self, kind: PowerUpKind, duration_ms: f32) {
        let slot = &mut self.remaining[kind.index()];
        *slot = slot.max(duration_ms.max(0.0));
    }

    /// Count down by wall-clock `delta_ms`; returns kinds that just expired
    pub fn tick(&mut self, delta_ms: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = &mut self.remaining[kind.index()];
            if *slot > 0.0 {
                *slot = (*slot - delta_ms).max(0.0);
                if *slot == 0.0 {
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn active_count(&self) -> usize {
        self.remaining.iter().filter(|&&r| r > 0.0).count()
    }

    /// Active kinds with their remaining time
    pub fn iter_active(&self) -> impl Iterator<Item = (PowerUpKind, f32)> + '_ {
        PowerUpKind::ALL
            .into_iter()
            .filter_map(|k| (self.remaining[k.index()] > 0.0).then(|| (k, self.remaining[k.index()])))
    }

    pub fn clear(&mut self) {
        self.remaining = [0.0; POWER_UP_COUNT];
    }
}

/// Weighted, cooldown-gated, history-aware power-up picker
#[derive(Debug, Clone, Default)]
pub struct PowerUpDirector {
    history: RingHistory<PowerUpKind, POWER_UP_HISTORY>,
    /// Run time (ms) at which each kind's cooldown ends
    cooldown_until: [f32; POWER_UP_COUNT],
}

impl PowerUpDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &RingHistory<PowerUpKind, POWER_UP_HISTORY> {
        &self.history
    }

    pub fn cooldown_until(&self, kind: PowerUpKind) -> f32 {
        self.cooldown_until[kind.index()]
    }

    #[inline]
    pub fn on_cooldown(&self, kind: PowerUpKind, now_ms: f32) -> bool {
        now_ms < self.cooldown_until[kind.index()]
    }

    /// Kinds eligible at `now_ms` with their effective weights
    pub fn candidates(
        &self,
        now_ms: f32,
        timers: &PowerUpTimers,
        config: &PowerUpConfig,
    ) -> Vec<(PowerUpKind, f32)> {
        PowerUpKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let rule = config.rule(kind);
                if self.on_cooldown(kind, now_ms) {
                    return None;
                }
                if rule.block_while_active && timers.is_active(kind) {
                    return None;
                }
                let seen = self.history.count(kind) as i32;
                Some((kind, rule.weight * rule.repeat_penalty.powi(seen)))
            })
            .collect()
    }

    /// Pick the next kind and record it (history + cooldown).
    ///
    /// When nothing is eligible every cooldown is cleared and the pick is
    /// uniform over all kinds. That fallback can return a kind that is still
    /// active and blocking.
    pub fn select(
        &mut self,
        now_ms: f32,
        timers: &PowerUpTimers,
        config: &PowerUpConfig,
        rng: &mut SimRng,
    ) -> PowerUpKind {
        let candidates = self.candidates(now_ms, timers, config);
        let weights: Vec<f32> = candidates.iter().map(|&(_, w)| w).collect();

        let kind = match rng.weighted_index(&weights) {
            Some(i) => candidates[i].0,
            None => {
                log::debug!("No eligible power-up at {now_ms:.0}ms, clearing cooldowns");
                self.cooldown_until = [0.0; POWER_UP_COUNT];
                PowerUpKind::ALL[rng.index(POWER_UP_COUNT)]
            }
        };

        self.record(kind, now_ms, config);
        kind
    }

    /// Record an accepted spawn
    pub fn record(&mut self, kind: PowerUpKind, now_ms: f32, config: &PowerUpConfig) {
        self.history.push(kind);
        self.cooldown_until[kind.index()] = now_ms + config.rule(kind).cooldown_ms;
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.cooldown_until = [0.0; POWER_UP_COUNT];
    }
}

/// Inputs to [`plan_next_interval`]
#[derive(Debug, Clone, Copy)]
pub struct IntervalPlan {
    pub base_ms: f32,
    pub min_interval_ms: f32,
    pub spawn_intensity: f32,
    /// 0..1 share of the speed ramp already applied
    pub speed_progress: f32,
    pub active_power_ups: usize,
}

/// Delay until the next power-up spawn attempt
pub fn plan_next_interval(plan: IntervalPlan, rng: &mut SimRng) -> f32 {
    let intensity = plan.spawn_intensity;
    let intensity_factor = if intensity >= 1.0 {
        lerp(1.0, 0.82, clamp01(intensity - 1.0))
    } else {
        lerp(1.0, 1.18, clamp01(1.0 - intensity))
    };
    let speed_factor = lerp(1.0, 0.88, clamp01(plan.speed_progress));
    let active_boost = 1.0 + 0.12 * plan.active_power_ups as f32;
    let jitter = rng.range(0.9, 1.25);

    let interval = plan.base_ms * intensity_factor * speed_factor * active_boost * jitter;
    let lower = 6500.0f32.max(plan.base_ms * 0.9);
    let upper = (plan.min_interval_ms + 2500.0).max(plan.base_ms * 1.4);
    clamp_range(interval, lower, upper)
}

/// Spawn the director's pick at the right edge
pub fn spawn_power_up(state: &mut SimulationState) -> PowerUpKind {
    let now = state.elapsed_ms;
    let kind = state
        .power_up_director
        .select(now, &state.power_ups, &state.config.power_ups, &mut state.rng);
    let viewport = state.viewport();
    let side = state.config.power_ups.size;
    let y = state.rng.range(side, (viewport.y - side * 2.0).max(side));
    let pos = Vec2::new(viewport.x + 10.0, y);
    spawn_power_up_at(state, kind, pos);
    kind
}

/// Place a specific power-up pickup (boss support drops use this directly)
pub fn spawn_power_up_at(state: &mut SimulationState, kind: PowerUpKind, pos: Vec2) -> u32 {
    let side = state.config.power_ups.size;
    let speed = state.game_speed * state.config.power_ups.speed_ratio;
    let id = state.next_entity_id();
    state.pickups.push(PowerUp {
        id,
        pos,
        size: Vec2::splat(side),
        vel: Vec2::new(-speed, 0.0),
        kind,
    });
    log::debug!("Spawned power-up {}", kind.as_str());
    id
}
