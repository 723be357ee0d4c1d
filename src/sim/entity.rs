//! Entity records
//!
//! Plain data owned by the simulation state. Rectangular entities store their
//! top-left corner in `pos`; asteroids, enemy shots and visual effects store
//! their center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collectible::CollectibleTier;
use super::collision::Rect;
use super::powerup::PowerUpKind;
use super::villain::{VillainBehavior, VillainKind};
use crate::config::AttackSpec;

/// Player ship (also used for the Double Team clone)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// > 0 while dashing (ms)
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    pub fire_cooldown: f32,
    /// Shots fired this run (drives missile cadence)
    pub shots_fired: u32,
}

impl Player {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            fire_cooldown: 0.0,
            shots_fired: 0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Muzzle position (right edge, vertically centered)
    #[inline]
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x, self.pos.y + self.size.y * 0.5)
    }

    /// Where the tail attaches (left edge, vertically centered)
    #[inline]
    pub fn tail_anchor(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + self.size.y * 0.5)
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }
}

/// Tail or trail sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// Boss-only data carried by a boss obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossAttachment {
    /// Index into the (looping) roster sequence
    pub sequence_index: usize,
    pub key: String,
    pub name: String,
    pub attack: AttackSpec,
    /// Countdown to the next shot or burst (ms)
    pub attack_timer: f32,
    /// Shots left in the current barrage burst
    pub burst_remaining: u32,
    pub score: f32,
}

/// What an obstacle is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObstacleRole {
    Villain(VillainKind),
    Boss(BossAttachment),
}

/// Enemy ship (villain or boss)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub role: ObstacleRole,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub behavior: VillainBehavior,
    /// Time left before another edge bounce may flip vertical velocity
    pub bounce_timer: f32,
    /// Knockback velocity from a shield deflection, decays over time
    pub knockback: Vec2,
    pub shield_cooldown: f32,
    pub hit_flash: f32,
    pub age_ms: f32,
}

impl Obstacle {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        matches!(self.role, ObstacleRole::Boss(_))
    }

    pub fn boss(&self) -> Option<&BossAttachment> {
        match &self.role {
            ObstacleRole::Boss(b) => Some(b),
            ObstacleRole::Villain(_) => None,
        }
    }

    pub fn villain_kind(&self) -> Option<VillainKind> {
        match self.role {
            ObstacleRole::Villain(kind) => Some(kind),
            ObstacleRole::Boss(_) => None,
        }
    }

    /// Display name used in events and game-over reasons
    pub fn display_name(&self) -> &str {
        match &self.role {
            ObstacleRole::Villain(kind) => kind.descriptor().name,
            ObstacleRole::Boss(b) => &b.name,
        }
    }
}

/// Maximum asteroid trail samples
pub const ASTEROID_TRAIL_CAP: usize = 16;

/// Drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Proportional to radius²
    pub mass: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Fading position samples (newest first)
    pub trail: Vec<TrailPoint>,
    pub shield_cooldown: f32,
    pub hit_flash: f32,
    /// Spawned as part of a meteor shower formation
    pub from_shower: bool,
}

impl Asteroid {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, health: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            mass: radius * radius,
            rotation: 0.0,
            rotation_speed: 0.0,
            health,
            max_health: health,
            trail: Vec::new(),
            shield_cooldown: 0.0,
            hit_flash: 0.0,
            from_shower: false,
        }
    }

    /// Record current position to the trail, keeping at most `cap` samples
    pub fn record_trail(&mut self, cap: usize) {
        let cap = cap.min(ASTEROID_TRAIL_CAP);
        if cap == 0 {
            self.trail.clear();
            return;
        }
        self.trail.insert(0, TrailPoint { pos: self.pos });
        self.trail.truncate(cap);
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(self.radius * 2.0))
    }
}

/// Weapon pattern tag carried by each player shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponPattern {
    Standard,
    Spread,
    /// Steers toward the nearest target
    Missile { turn_rate: f32 },
    /// Oscillates around its firing lane
    Flame {
        amplitude: f32,
        frequency: f32,
        lane_y: f32,
    },
}

/// Player-fired shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub life_ms: f32,
    pub age_ms: f32,
    pub damage: f32,
    pub pattern: WeaponPattern,
}

impl Projectile {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Boss-fired shot (circle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life_ms: f32,
    pub boss_key: String,
    pub message: String,
    /// Bounced off a shield; harmless from then on
    pub deflected: bool,
}

/// Score pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub tier: CollectibleTier,
    /// Base points before combo/surge multipliers
    pub value: f32,
    pub bob_phase: f32,
}

impl Collectible {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub kind: PowerUpKind,
}

impl PowerUp {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Visual particle (never gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1 → 0 over its lifetime
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
    /// Palette index for the renderer
    pub color: u32,
}

/// Floating "+points" text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub vel: Vec2,
    pub text: String,
    pub life_ms: f32,
    pub max_life_ms: f32,
}

/// Expanding blast ring (Power Bomb)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaBurst {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub life_ms: f32,
    pub max_life_ms: f32,
}

/// Background star
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    /// Share of scroll speed (parallax depth)
    pub depth: f32,
    pub size: f32,
}
