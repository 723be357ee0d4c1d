//! Simulation configuration
//!
//! A fully-resolved numeric configuration handed to the core by the host.
//! Every struct is `#[serde(default)]` so partial JSON works, and
//! [`SimConfig::sanitized`] replaces malformed values with safe defaults so a
//! bad config can never stall or poison a step.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::lerp;
use crate::sim::boss::AttackPattern;
use crate::sim::powerup::{PowerUpKind, PowerUpRule};

/// Run mode. Tutorial runs use the same curves, dampened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunMode {
    #[default]
    Standard,
    Tutorial,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Standard => "Standard",
            RunMode::Tutorial => "Tutorial",
        }
    }

    /// Scroll speed dampening
    pub fn speed_scale(&self) -> f32 {
        match self {
            RunMode::Standard => 1.0,
            RunMode::Tutorial => 0.7,
        }
    }

    /// Spawn intensity dampening
    pub fn spawn_scale(&self) -> f32 {
        match self {
            RunMode::Standard => 1.0,
            RunMode::Tutorial => 0.6,
        }
    }

    /// Enemy health dampening
    pub fn health_scale(&self) -> f32 {
        match self {
            RunMode::Standard => 1.0,
            RunMode::Tutorial => 0.5,
        }
    }
}

/// Configuration parse failure
#[derive(Debug)]
pub enum ConfigError {
    /// JSON was malformed or had the wrong shape
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Replace a non-finite or below-minimum value with its default
fn fix(value: &mut f32, default: f32, min: f32) {
    if !value.is_finite() || *value < min {
        *value = default;
    }
}

/// Placeholder for an omitted number; sanitizing swaps in the real default
pub(crate) fn unset() -> f32 {
    f32::NAN
}

/// Start/end pair interpolated by eased difficulty progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    #[serde(default = "unset")]
    pub start: f32,
    #[serde(default = "unset")]
    pub end: f32,
}

impl Ramp {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Value at eased progress `t`
    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        lerp(self.start, self.end, t)
    }

    fn sanitize(&mut self, default: Ramp) {
        fix(&mut self.start, default.start, 0.0);
        fix(&mut self.end, default.end, 0.0);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    /// Cruise speed (units/s)
    pub speed: f32,
    /// Horizontal start position as a share of viewport width
    pub start_x_ratio: f32,
    pub dash_duration_ms: f32,
    pub dash_speed_multiplier: f32,
    pub dash_cooldown_ms: f32,
    /// Collision radius of each tail sample
    pub tail_radius: f32,
    /// Tail samples hidden under the hull (never collide)
    pub tail_skip: usize,
    /// Clone offset from the player (Double Team)
    pub clone_offset_x: f32,
    pub clone_offset_y: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 44.0,
            speed: 360.0,
            start_x_ratio: 0.18,
            dash_duration_ms: 220.0,
            dash_speed_multiplier: 2.1,
            dash_cooldown_ms: 1100.0,
            tail_radius: 6.0,
            tail_skip: 4,
            clone_offset_x: -72.0,
            clone_offset_y: 58.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub fire_cooldown_ms: f32,
    pub projectile_speed: f32,
    pub projectile_width: f32,
    pub projectile_height: f32,
    pub projectile_life_ms: f32,
    pub projectile_damage: f32,
    /// Fan angle between Bullet Spread shots (radians)
    pub spread_angle: f32,
    /// Homing turn rate (radians/s)
    pub missile_turn_rate: f32,
    pub missile_damage: f32,
    /// Every Nth shot also launches a missile
    pub missile_every: u32,
    pub flame_damage: f32,
    pub flame_life_ms: f32,
    pub flame_wave_amplitude: f32,
    pub flame_wave_frequency: f32,
    /// Fire cooldown multiplier while Pump Drive is active
    pub pump_fire_rate_scale: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            fire_cooldown_ms: 200.0,
            projectile_speed: 820.0,
            projectile_width: 18.0,
            projectile_height: 6.0,
            projectile_life_ms: 1600.0,
            projectile_damage: 1.0,
            spread_angle: 0.18,
            missile_turn_rate: 4.2,
            missile_damage: 2.0,
            missile_every: 3,
            flame_damage: 2.0,
            flame_life_ms: 900.0,
            flame_wave_amplitude: 26.0,
            flame_wave_frequency: 14.0,
            pump_fire_rate_scale: 0.55,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub ramp_duration_ms: f32,
    pub speed: Ramp,
    pub obstacle_intensity: Ramp,
    pub collectible_intensity: Ramp,
    pub power_up_intensity: Ramp,
    pub health: Ramp,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            ramp_duration_ms: 180_000.0,
            speed: Ramp::new(1.0, 1.85),
            obstacle_intensity: Ramp::new(1.0, 1.9),
            collectible_intensity: Ramp::new(1.0, 1.35),
            power_up_intensity: Ramp::new(1.0, 1.2),
            health: Ramp::new(1.0, 2.2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Scroll speed before ramping (units/s)
    pub base_speed: f32,
    pub obstacle_interval_ms: f32,
    pub obstacle_min_interval_ms: f32,
    pub collectible_interval_ms: f32,
    pub collectible_min_interval_ms: f32,
    pub power_up_interval_ms: f32,
    pub power_up_min_interval_ms: f32,
    pub initial_power_up_delay_ms: f32,
    /// Jitter range applied to obstacle/collectible intervals
    pub jitter_min: f32,
    pub jitter_max: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_speed: 260.0,
            obstacle_interval_ms: 1150.0,
            obstacle_min_interval_ms: 380.0,
            collectible_interval_ms: 1400.0,
            collectible_min_interval_ms: 520.0,
            power_up_interval_ms: 12_000.0,
            power_up_min_interval_ms: 9_000.0,
            initial_power_up_delay_ms: 7_500.0,
            jitter_min: 0.8,
            jitter_max: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VillainConfig {
    pub light_weight: f32,
    pub medium_weight: f32,
    pub heavy_weight: f32,
    /// Extra medium weight at full difficulty
    pub medium_bias: f32,
    /// Extra heavy weight at full difficulty
    pub heavy_bias: f32,
    /// Multiplier on the previous pick's weight
    pub repeat_penalty: f32,
    /// Multiplier always applied to the strongest type
    pub rarest_dampen: f32,
}

impl Default for VillainConfig {
    fn default() -> Self {
        Self {
            light_weight: 0.5,
            medium_weight: 0.32,
            heavy_weight: 0.18,
            medium_bias: 0.14,
            heavy_bias: 0.16,
            repeat_penalty: 0.45,
            rarest_dampen: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleConfig {
    pub base_score: f32,
    pub size: f32,
    /// Collectible speed as a share of scroll speed
    pub speed_ratio: f32,
    pub magnet_radius: f32,
    pub magnet_speed: f32,
}

impl Default for CollectibleConfig {
    fn default() -> Self {
        Self {
            base_score: 84.0,
            size: 30.0,
            speed_ratio: 0.92,
            magnet_radius: 260.0,
            magnet_speed: 420.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub size: f32,
    pub speed_ratio: f32,
    /// Active durations per kind (ms); missing kinds use built-in values
    pub durations: BTreeMap<PowerUpKind, f32>,
    /// Spawn rule overrides; missing kinds use built-in rules
    pub rules: BTreeMap<PowerUpKind, PowerUpRule>,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            size: 36.0,
            speed_ratio: 0.8,
            durations: BTreeMap::new(),
            rules: BTreeMap::new(),
        }
    }
}

impl PowerUpConfig {
    /// Effective active duration for `kind`
    pub fn duration(&self, kind: PowerUpKind) -> f32 {
        match self.durations.get(&kind) {
            Some(&ms) if ms.is_finite() && ms > 0.0 => ms,
            _ => kind.default_duration_ms(),
        }
    }

    /// Effective spawn rule for `kind`
    pub fn rule(&self, kind: PowerUpKind) -> PowerUpRule {
        self.rules
            .get(&kind)
            .map(|rule| rule.sanitized(kind.default_rule()))
            .unwrap_or_else(|| kind.default_rule())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    pub max_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_spacing: f32,
    pub placement_attempts: u32,
    /// Chance a candidate is anchored near an existing asteroid
    pub cluster_bias: f32,
    pub spawn_interval_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub initial_delay_ms: f32,
    pub restitution: f32,
    /// Horizontal speed range as a share of scroll speed
    pub speed_min_ratio: f32,
    pub speed_max_ratio: f32,
    pub vertical_drift: f32,
    /// Radius units per point of health
    pub radius_per_health: f32,
    pub score_per_health: f32,
    pub trail_length: usize,
    pub resolution_iterations: u32,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            max_count: 14,
            min_radius: 18.0,
            max_radius: 46.0,
            min_spacing: 10.0,
            placement_attempts: 12,
            cluster_bias: 0.55,
            spawn_interval_ms: 2600.0,
            min_spawn_interval_ms: 700.0,
            initial_delay_ms: 4000.0,
            restitution: 0.82,
            speed_min_ratio: 0.55,
            speed_max_ratio: 1.05,
            vertical_drift: 40.0,
            radius_per_health: 14.0,
            score_per_health: 45.0,
            trail_length: 8,
            resolution_iterations: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeteorShowerConfig {
    pub enabled: bool,
    pub first_delay_ms: f32,
    pub interval_ms: f32,
    pub variance_ms: f32,
    /// Shower speed as a share of scroll speed
    pub speed_ratio: f32,
    pub radius: f32,
    /// Relative offsets of each meteor from the anchor
    pub formation: Vec<[f32; 2]>,
}

impl Default for MeteorShowerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_delay_ms: 30_000.0,
            interval_ms: 38_000.0,
            variance_ms: 8_000.0,
            speed_ratio: 1.45,
            radius: 20.0,
            formation: vec![
                [0.0, 0.0],
                [64.0, -54.0],
                [64.0, 54.0],
                [128.0, -108.0],
                [128.0, 108.0],
                [192.0, -162.0],
                [192.0, 162.0],
            ],
        }
    }
}

/// Boss projectile parameters plus the firing pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSpec {
    pub pattern: AttackPattern,
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub projectile_life_ms: f32,
    /// Reason reported when this attack ends a run
    pub message: String,
}

impl Default for AttackSpec {
    fn default() -> Self {
        Self {
            pattern: AttackPattern::Focused { cooldown_ms: 1400.0 },
            projectile_speed: 360.0,
            projectile_size: 16.0,
            projectile_life_ms: 4200.0,
            message: "Blasted by the Nebula Warden".into(),
        }
    }
}

/// One entry of the ordered boss roster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossSpec {
    pub key: String,
    pub name: String,
    /// Elapsed run time that triggers the alert
    pub trigger_ms: f32,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    /// Entry/departure speed (units/s)
    pub speed: f32,
    /// Hover position as a share of viewport width
    pub hover_x_ratio: f32,
    /// Time spent hovering before the boss starts to advance
    pub hover_ms: f32,
    /// Vertical sweep amplitude while hovering
    pub sweep_amplitude: f32,
    pub sweep_period_ms: f32,
    pub score: f32,
    pub support_power_up: PowerUpKind,
    pub attack: AttackSpec,
}

impl Default for BossSpec {
    fn default() -> Self {
        Self {
            key: "nebula_warden".into(),
            name: "Nebula Warden".into(),
            trigger_ms: 75_000.0,
            width: 150.0,
            height: 120.0,
            health: 40.0,
            speed: 90.0,
            hover_x_ratio: 0.74,
            hover_ms: 28_000.0,
            sweep_amplitude: 150.0,
            sweep_period_ms: 5200.0,
            score: 1800.0,
            support_power_up: PowerUpKind::RadiantShield,
            attack: AttackSpec::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub alert_ms: f32,
    /// Gap between repeats once the roster is exhausted
    pub repeat_interval_ms: f32,
    /// Health multiplier added per roster lap
    pub lap_health_bonus: f32,
    pub roster: Vec<BossSpec>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            alert_ms: 2000.0,
            repeat_interval_ms: 120_000.0,
            lap_health_bonus: 0.5,
            roster: vec![
                BossSpec::default(),
                BossSpec {
                    key: "comet_hydra".into(),
                    name: "Comet Hydra".into(),
                    trigger_ms: 165_000.0,
                    width: 170.0,
                    height: 136.0,
                    health: 60.0,
                    speed: 100.0,
                    hover_x_ratio: 0.72,
                    hover_ms: 30_000.0,
                    sweep_amplitude: 170.0,
                    sweep_period_ms: 4600.0,
                    score: 2600.0,
                    support_power_up: PowerUpKind::BulletSpread,
                    attack: AttackSpec {
                        pattern: AttackPattern::Spread {
                            shots: 5,
                            spread: 0.22,
                            cooldown_ms: 2100.0,
                        },
                        projectile_speed: 330.0,
                        projectile_size: 14.0,
                        projectile_life_ms: 4200.0,
                        message: "Caught in the Comet Hydra's spray".into(),
                    },
                },
                BossSpec {
                    key: "void_empress".into(),
                    name: "Void Empress".into(),
                    trigger_ms: 270_000.0,
                    width: 190.0,
                    height: 150.0,
                    health: 85.0,
                    speed: 110.0,
                    hover_x_ratio: 0.7,
                    hover_ms: 32_000.0,
                    sweep_amplitude: 190.0,
                    sweep_period_ms: 4000.0,
                    score: 3600.0,
                    support_power_up: PowerUpKind::HyperBeam,
                    attack: AttackSpec {
                        pattern: AttackPattern::Barrage {
                            burst: 6,
                            interval_ms: 120.0,
                            cooldown_ms: 3200.0,
                        },
                        projectile_speed: 400.0,
                        projectile_size: 12.0,
                        projectile_life_ms: 4200.0,
                        message: "Shredded by the Void Empress barrage".into(),
                    },
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub combo_step: f32,
    pub combo_window_ms: f32,
    pub surge_multiplier: f32,
    pub tail_base: f32,
    pub tail_growth_per_streak: f32,
    pub tail_max: f32,
    /// Tail easing rate toward its target (per second)
    pub tail_ease_rate: f32,
    pub escape_base: f32,
    pub escape_per_health: f32,
    pub escape_width_factor: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            combo_step: 0.045,
            combo_window_ms: 3200.0,
            surge_multiplier: 1.5,
            tail_base: 6.0,
            tail_growth_per_streak: 0.5,
            tail_max: 48.0,
            tail_ease_rate: 6.0,
            escape_base: 150.0,
            escape_per_health: 45.0,
            escape_width_factor: 0.35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub hit_flash_ms: f32,
    pub shield_knockback: f32,
    pub shield_cooldown_ms: f32,
    /// Knockback decay per second (fraction removed)
    pub knockback_damping: f32,
    pub beam_dps: f32,
    pub beam_height: f32,
    pub beam_fade_in_ms: f32,
    pub beam_fade_out_ms: f32,
    pub bomb_radius: f32,
    pub bomb_damage: f32,
    /// World delta scale while Time Dilation is active
    pub time_dilation_scale: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            hit_flash_ms: 120.0,
            shield_knockback: 380.0,
            shield_cooldown_ms: 600.0,
            knockback_damping: 3.5,
            beam_dps: 6.0,
            beam_height: 56.0,
            beam_fade_in_ms: 180.0,
            beam_fade_out_ms: 260.0,
            bomb_radius: 280.0,
            bomb_damage: 6.0,
            time_dilation_scale: 0.55,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub mode: RunMode,
    pub viewport: ViewportConfig,
    pub player: PlayerConfig,
    pub weapons: WeaponConfig,
    pub difficulty: DifficultyConfig,
    pub spawn: SpawnConfig,
    pub villains: VillainConfig,
    pub collectibles: CollectibleConfig,
    pub power_ups: PowerUpConfig,
    pub asteroids: AsteroidConfig,
    pub meteor_showers: MeteorShowerConfig,
    pub bosses: BossConfig,
    pub scoring: ScoringConfig,
    pub combat: CombatConfig,
}

impl SimConfig {
    /// Parse a (possibly partial) JSON config and sanitize it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Parse JSON, falling back to defaults on any failure
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json_str(json) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default config: {err}");
                Self::default()
            }
        }
    }

    /// Copy with every malformed numeric replaced by its default
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    pub fn sanitize(&mut self) {
        let d = SimConfig::default();

        let v = &mut self.viewport;
        fix(&mut v.width, d.viewport.width, 64.0);
        fix(&mut v.height, d.viewport.height, 64.0);

        let p = &mut self.player;
        fix(&mut p.width, d.player.width, 1.0);
        fix(&mut p.height, d.player.height, 1.0);
        fix(&mut p.speed, d.player.speed, 0.0);
        fix(&mut p.start_x_ratio, d.player.start_x_ratio, 0.0);
        if p.start_x_ratio > 1.0 {
            p.start_x_ratio = d.player.start_x_ratio;
        }
        fix(&mut p.dash_duration_ms, d.player.dash_duration_ms, 0.0);
        fix(&mut p.dash_speed_multiplier, d.player.dash_speed_multiplier, 1.0);
        fix(&mut p.dash_cooldown_ms, d.player.dash_cooldown_ms, 0.0);
        fix(&mut p.tail_radius, d.player.tail_radius, 0.0);
        if !p.clone_offset_x.is_finite() {
            p.clone_offset_x = d.player.clone_offset_x;
        }
        if !p.clone_offset_y.is_finite() {
            p.clone_offset_y = d.player.clone_offset_y;
        }

        let w = &mut self.weapons;
        fix(&mut w.fire_cooldown_ms, d.weapons.fire_cooldown_ms, 16.0);
        fix(&mut w.projectile_speed, d.weapons.projectile_speed, 1.0);
        fix(&mut w.projectile_width, d.weapons.projectile_width, 1.0);
        fix(&mut w.projectile_height, d.weapons.projectile_height, 1.0);
        fix(&mut w.projectile_life_ms, d.weapons.projectile_life_ms, 1.0);
        fix(&mut w.projectile_damage, d.weapons.projectile_damage, 0.0);
        fix(&mut w.spread_angle, d.weapons.spread_angle, 0.0);
        fix(&mut w.missile_turn_rate, d.weapons.missile_turn_rate, 0.0);
        fix(&mut w.missile_damage, d.weapons.missile_damage, 0.0);
        if w.missile_every == 0 {
            w.missile_every = d.weapons.missile_every;
        }
        fix(&mut w.flame_damage, d.weapons.flame_damage, 0.0);
        fix(&mut w.flame_life_ms, d.weapons.flame_life_ms, 1.0);
        fix(&mut w.flame_wave_amplitude, d.weapons.flame_wave_amplitude, 0.0);
        fix(&mut w.flame_wave_frequency, d.weapons.flame_wave_frequency, 0.0);
        fix(&mut w.pump_fire_rate_scale, d.weapons.pump_fire_rate_scale, 0.05);

        let df = &mut self.difficulty;
        fix(&mut df.ramp_duration_ms, d.difficulty.ramp_duration_ms, 1.0);
        df.speed.sanitize(d.difficulty.speed);
        df.obstacle_intensity.sanitize(d.difficulty.obstacle_intensity);
        df.collectible_intensity.sanitize(d.difficulty.collectible_intensity);
        df.power_up_intensity.sanitize(d.difficulty.power_up_intensity);
        df.health.sanitize(d.difficulty.health);

        let s = &mut self.spawn;
        fix(&mut s.base_speed, d.spawn.base_speed, 1.0);
        fix(&mut s.obstacle_interval_ms, d.spawn.obstacle_interval_ms, 50.0);
        fix(&mut s.obstacle_min_interval_ms, d.spawn.obstacle_min_interval_ms, 50.0);
        fix(&mut s.collectible_interval_ms, d.spawn.collectible_interval_ms, 50.0);
        fix(&mut s.collectible_min_interval_ms, d.spawn.collectible_min_interval_ms, 50.0);
        fix(&mut s.power_up_interval_ms, d.spawn.power_up_interval_ms, 100.0);
        fix(&mut s.power_up_min_interval_ms, d.spawn.power_up_min_interval_ms, 0.0);
        fix(&mut s.initial_power_up_delay_ms, d.spawn.initial_power_up_delay_ms, 0.0);
        fix(&mut s.jitter_min, d.spawn.jitter_min, 0.01);
        fix(&mut s.jitter_max, d.spawn.jitter_max, 0.01);
        if s.jitter_max < s.jitter_min {
            s.jitter_min = d.spawn.jitter_min;
            s.jitter_max = d.spawn.jitter_max;
        }

        let vl = &mut self.villains;
        fix(&mut vl.light_weight, d.villains.light_weight, 0.0);
        fix(&mut vl.medium_weight, d.villains.medium_weight, 0.0);
        fix(&mut vl.heavy_weight, d.villains.heavy_weight, 0.0);
        fix(&mut vl.medium_bias, d.villains.medium_bias, 0.0);
        fix(&mut vl.heavy_bias, d.villains.heavy_bias, 0.0);
        fix(&mut vl.repeat_penalty, d.villains.repeat_penalty, 0.0);
        fix(&mut vl.rarest_dampen, d.villains.rarest_dampen, 0.0);

        let c = &mut self.collectibles;
        fix(&mut c.base_score, d.collectibles.base_score, 0.0);
        fix(&mut c.size, d.collectibles.size, 1.0);
        fix(&mut c.speed_ratio, d.collectibles.speed_ratio, 0.05);
        fix(&mut c.magnet_radius, d.collectibles.magnet_radius, 0.0);
        fix(&mut c.magnet_speed, d.collectibles.magnet_speed, 0.0);

        let pu = &mut self.power_ups;
        fix(&mut pu.size, d.power_ups.size, 1.0);
        fix(&mut pu.speed_ratio, d.power_ups.speed_ratio, 0.05);
        pu.durations.retain(|_, ms| ms.is_finite() && *ms > 0.0);

        let a = &mut self.asteroids;
        if a.max_count == 0 {
            a.max_count = d.asteroids.max_count;
        }
        fix(&mut a.min_radius, d.asteroids.min_radius, 2.0);
        fix(&mut a.max_radius, d.asteroids.max_radius, 2.0);
        if a.max_radius < a.min_radius {
            a.min_radius = d.asteroids.min_radius;
            a.max_radius = d.asteroids.max_radius;
        }
        fix(&mut a.min_spacing, d.asteroids.min_spacing, 0.0);
        if a.placement_attempts == 0 {
            a.placement_attempts = d.asteroids.placement_attempts;
        }
        fix(&mut a.cluster_bias, d.asteroids.cluster_bias, 0.0);
        a.cluster_bias = a.cluster_bias.min(1.0);
        fix(&mut a.spawn_interval_ms, d.asteroids.spawn_interval_ms, 50.0);
        fix(&mut a.min_spawn_interval_ms, d.asteroids.min_spawn_interval_ms, 50.0);
        fix(&mut a.initial_delay_ms, d.asteroids.initial_delay_ms, 0.0);
        fix(&mut a.restitution, d.asteroids.restitution, 0.0);
        a.restitution = a.restitution.min(1.0);
        fix(&mut a.speed_min_ratio, d.asteroids.speed_min_ratio, 0.0);
        fix(&mut a.speed_max_ratio, d.asteroids.speed_max_ratio, 0.0);
        if a.speed_max_ratio < a.speed_min_ratio {
            a.speed_min_ratio = d.asteroids.speed_min_ratio;
            a.speed_max_ratio = d.asteroids.speed_max_ratio;
        }
        fix(&mut a.vertical_drift, d.asteroids.vertical_drift, 0.0);
        fix(&mut a.radius_per_health, d.asteroids.radius_per_health, 1.0);
        fix(&mut a.score_per_health, d.asteroids.score_per_health, 0.0);
        if a.resolution_iterations == 0 {
            a.resolution_iterations = d.asteroids.resolution_iterations;
        }

        let m = &mut self.meteor_showers;
        fix(&mut m.first_delay_ms, d.meteor_showers.first_delay_ms, 0.0);
        fix(&mut m.interval_ms, d.meteor_showers.interval_ms, 1000.0);
        fix(&mut m.variance_ms, d.meteor_showers.variance_ms, 0.0);
        m.variance_ms = m.variance_ms.min(m.interval_ms * 0.9);
        fix(&mut m.speed_ratio, d.meteor_showers.speed_ratio, 0.05);
        fix(&mut m.radius, d.meteor_showers.radius, 2.0);
        m.formation
            .retain(|[x, y]| x.is_finite() && y.is_finite());
        if m.formation.is_empty() {
            m.formation = d.meteor_showers.formation.clone();
        }

        let b = &mut self.bosses;
        fix(&mut b.alert_ms, d.bosses.alert_ms, 0.0);
        fix(&mut b.repeat_interval_ms, d.bosses.repeat_interval_ms, 1000.0);
        fix(&mut b.lap_health_bonus, d.bosses.lap_health_bonus, 0.0);
        if b.roster.is_empty() {
            log::warn!("Empty boss roster, using the default roster");
            b.roster = d.bosses.roster.clone();
        }
        let fallback = &d.bosses.roster[0];
        for boss in &mut b.roster {
            fix(&mut boss.trigger_ms, fallback.trigger_ms, 0.0);
            fix(&mut boss.width, fallback.width, 1.0);
            fix(&mut boss.height, fallback.height, 1.0);
            fix(&mut boss.health, fallback.health, 1.0);
            fix(&mut boss.speed, fallback.speed, 1.0);
            fix(&mut boss.hover_x_ratio, fallback.hover_x_ratio, 0.0);
            fix(&mut boss.hover_ms, fallback.hover_ms, 0.0);
            fix(&mut boss.sweep_amplitude, fallback.sweep_amplitude, 0.0);
            fix(&mut boss.sweep_period_ms, fallback.sweep_period_ms, 100.0);
            fix(&mut boss.score, fallback.score, 0.0);
            let atk = &mut boss.attack;
            atk.pattern = atk.pattern.sanitized();
            fix(&mut atk.projectile_speed, fallback.attack.projectile_speed, 1.0);
            fix(&mut atk.projectile_size, fallback.attack.projectile_size, 1.0);
            fix(&mut atk.projectile_life_ms, fallback.attack.projectile_life_ms, 1.0);
        }

        let sc = &mut self.scoring;
        fix(&mut sc.combo_step, d.scoring.combo_step, 0.0);
        fix(&mut sc.combo_window_ms, d.scoring.combo_window_ms, 1.0);
        fix(&mut sc.surge_multiplier, d.scoring.surge_multiplier, 1.0);
        fix(&mut sc.tail_base, d.scoring.tail_base, 0.0);
        fix(&mut sc.tail_growth_per_streak, d.scoring.tail_growth_per_streak, 0.0);
        fix(&mut sc.tail_max, d.scoring.tail_max, 0.0);
        fix(&mut sc.tail_ease_rate, d.scoring.tail_ease_rate, 0.0);
        fix(&mut sc.escape_base, d.scoring.escape_base, 0.0);
        fix(&mut sc.escape_per_health, d.scoring.escape_per_health, 0.0);
        fix(&mut sc.escape_width_factor, d.scoring.escape_width_factor, 0.0);

        let cb = &mut self.combat;
        fix(&mut cb.hit_flash_ms, d.combat.hit_flash_ms, 0.0);
        fix(&mut cb.shield_knockback, d.combat.shield_knockback, 0.0);
        fix(&mut cb.shield_cooldown_ms, d.combat.shield_cooldown_ms, 0.0);
        fix(&mut cb.knockback_damping, d.combat.knockback_damping, 0.0);
        fix(&mut cb.beam_dps, d.combat.beam_dps, 0.0);
        fix(&mut cb.beam_height, d.combat.beam_height, 1.0);
        fix(&mut cb.beam_fade_in_ms, d.combat.beam_fade_in_ms, 0.0);
        fix(&mut cb.beam_fade_out_ms, d.combat.beam_fade_out_ms, 0.0);
        fix(&mut cb.bomb_radius, d.combat.bomb_radius, 0.0);
        fix(&mut cb.bomb_damage, d.combat.bomb_damage, 0.0);
        fix(&mut cb.time_dilation_scale, d.combat.time_dilation_scale, 0.05);
        cb.time_dilation_scale = cb.time_dilation_scale.min(1.0);
    }
}
