//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (visual effects draw from their own stream)
//! - Stable iteration order (pool order, ids ascending)
//! - No rendering or platform dependencies

pub mod asteroid;
pub mod boss;
pub mod collectible;
pub mod collision;
pub mod combat;
pub mod difficulty;
pub mod effects;
pub mod entity;
pub mod events;
pub mod history;
pub mod powerup;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod villain;

pub use boss::{AttackPattern, BossBattle, BossPhase};
pub use collectible::CollectibleTier;
pub use difficulty::Difficulty;
pub use entity::{
    Asteroid, BossAttachment, Collectible, EnemyProjectile, Obstacle, ObstacleRole, Player, PowerUp, Projectile,
    TrailPoint, WeaponPattern,
};
pub use events::{BossStatus, EventQueue, GameEvent, RunSummary};
pub use powerup::{PowerUpDirector, PowerUpKind, PowerUpRule, PowerUpTimers};
pub use rng::SimRng;
pub use scoring::ScoreState;
pub use snapshot::{FrameSnapshot, HudSnapshot};
pub use state::{GamePhase, InputIntent, SimulationState};
pub use tick::tick;
pub use villain::{VillainBehavior, VillainKind};
