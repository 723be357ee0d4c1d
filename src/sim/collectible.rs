//! Collectible tiers and spawning
//!
//! A single weighted roll per spawn; no anti-repeat history.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Collectible;
use super::rng::SimRng;
use super::state::SimulationState;

/// Collectible rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleTier {
    Base,
    Rare,
    Epic,
}

impl CollectibleTier {
    pub const ALL: [CollectibleTier; 3] = [CollectibleTier::Base, CollectibleTier::Rare, CollectibleTier::Epic];

    pub fn weight(self) -> f32 {
        match self {
            CollectibleTier::Base => 0.62,
            CollectibleTier::Rare => 0.26,
            CollectibleTier::Epic => 0.12,
        }
    }

    /// Multiplier on the configured base score
    pub fn score_multiplier(self) -> f32 {
        match self {
            CollectibleTier::Base => 1.0,
            CollectibleTier::Rare => 1.75,
            CollectibleTier::Epic => 2.5,
        }
    }

    pub fn size_multiplier(self) -> f32 {
        match self {
            CollectibleTier::Base => 1.0,
            CollectibleTier::Rare => 1.15,
            CollectibleTier::Epic => 1.3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectibleTier::Base => "base",
            CollectibleTier::Rare => "rare",
            CollectibleTier::Epic => "epic",
        }
    }
}

/// Weighted roll over the fixed tier table
pub fn roll_tier(rng: &mut SimRng) -> CollectibleTier {
    let weights = CollectibleTier::ALL.map(CollectibleTier::weight);
    rng.weighted_index(&weights)
        .map(|i| CollectibleTier::ALL[i])
        .unwrap_or(CollectibleTier::Base)
}

/// Spawn one collectible at the right edge
pub fn spawn_collectible(state: &mut SimulationState) -> u32 {
    let tier = roll_tier(&mut state.rng);
    let cfg = &state.config.collectibles;
    let side = cfg.size * tier.size_multiplier();
    let value = cfg.base_score * tier.score_multiplier();
    let speed = state.game_speed * cfg.speed_ratio;
    let viewport = state.viewport();

    let y = state.rng.range(side * 0.5, (viewport.y - side * 1.5).max(side * 0.5));
    let bob_phase = state.rng.range(0.0, std::f32::consts::TAU);
    let id = state.next_entity_id();
    state.collectibles.push(Collectible {
        id,
        pos: Vec2::new(viewport.x + 10.0, y),
        size: Vec2::splat(side),
        vel: Vec2::new(-speed, 0.0),
        tier,
        value,
        bob_phase,
    });
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table() {
        let total: f32 = CollectibleTier::ALL.iter().map(|t| t.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(CollectibleTier::Rare.score_multiplier(), 1.75);
        assert_eq!(CollectibleTier::Epic.score_multiplier(), 2.5);
    }

    #[test]
    fn test_roll_tier_distribution() {
        let mut rng = SimRng::new(5);
        let mut counts = [0u32; 3];
        for _ in 0..20_000 {
            let t = roll_tier(&mut rng);
            let i = CollectibleTier::ALL.iter().position(|&x| x == t).unwrap();
            counts[i] += 1;
        }
        assert!(counts[0] > 11_800 && counts[0] < 13_000, "{counts:?}");
        assert!(counts[1] > 4_700 && counts[1] < 5_700, "{counts:?}");
        assert!(counts[2] > 2_000 && counts[2] < 2_800, "{counts:?}");
    }
}
