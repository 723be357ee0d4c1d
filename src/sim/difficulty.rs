//! Difficulty director
//!
//! Elapsed run time → eased 0..1 progress → speed, spawn-intensity and health
//! multipliers. Tutorial runs ride the same curves with fixed dampening.

use serde::{Deserialize, Serialize};

use crate::config::{DifficultyConfig, RunMode};
use crate::{clamp01, ease_in_out_quad};

/// Multipliers derived from run progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Linear progress through the ramp
    pub raw_progress: f32,
    /// Eased progress used by every curve
    pub progress: f32,
    pub speed: f32,
    pub obstacle_intensity: f32,
    pub collectible_intensity: f32,
    pub power_up_intensity: f32,
    pub health: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            raw_progress: 0.0,
            progress: 0.0,
            speed: 1.0,
            obstacle_intensity: 1.0,
            collectible_intensity: 1.0,
            power_up_intensity: 1.0,
            health: 1.0,
        }
    }
}

impl Difficulty {
    /// Evaluate every curve at `elapsed_ms`
    pub fn at(elapsed_ms: f32, config: &DifficultyConfig, mode: RunMode) -> Self {
        let raw_progress = if config.ramp_duration_ms > 0.0 {
            clamp01(elapsed_ms / config.ramp_duration_ms)
        } else {
            1.0
        };
        let progress = ease_in_out_quad(raw_progress);
        let spawn = mode.spawn_scale();

        Self {
            raw_progress,
            progress,
            speed: config.speed.at(progress) * mode.speed_scale(),
            obstacle_intensity: config.obstacle_intensity.at(progress) * spawn,
            collectible_intensity: config.collectible_intensity.at(progress) * spawn,
            power_up_intensity: config.power_up_intensity.at(progress) * spawn,
            health: config.health.at(progress) * mode.health_scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_endpoints() {
        let cfg = DifficultyConfig::default();
        let start = Difficulty::at(0.0, &cfg, RunMode::Standard);
        assert_eq!(start.progress, 0.0);
        assert_eq!(start.speed, 1.0);
        assert_eq!(start.health, 1.0);

        let end = Difficulty::at(cfg.ramp_duration_ms * 3.0, &cfg, RunMode::Standard);
        assert_eq!(end.raw_progress, 1.0);
        assert!((end.speed - 1.85).abs() < 1e-5);
        assert!((end.obstacle_intensity - 1.9).abs() < 1e-5);
        assert!((end.health - 2.2).abs() < 1e-5);
    }

    #[test]
    fn test_difficulty_is_eased() {
        let cfg = DifficultyConfig::default();
        let quarter = Difficulty::at(cfg.ramp_duration_ms * 0.25, &cfg, RunMode::Standard);
        assert!((quarter.raw_progress - 0.25).abs() < 1e-6);
        assert!((quarter.progress - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_tutorial_dampening() {
        let cfg = DifficultyConfig::default();
        let std = Difficulty::at(60_000.0, &cfg, RunMode::Standard);
        let tut = Difficulty::at(60_000.0, &cfg, RunMode::Tutorial);
        assert_eq!(std.progress, tut.progress);
        assert!((tut.speed - std.speed * 0.7).abs() < 1e-5);
        assert!((tut.obstacle_intensity - std.obstacle_intensity * 0.6).abs() < 1e-5);
        assert!((tut.health - std.health * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_ramp_is_full_difficulty() {
        let cfg = DifficultyConfig {
            ramp_duration_ms: 0.0,
            ..Default::default()
        };
        let d = Difficulty::at(0.0, &cfg, RunMode::Standard);
        assert_eq!(d.progress, 1.0);
    }
}
