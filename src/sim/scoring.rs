//! Score, streak and combo economy

use serde::{Deserialize, Serialize};

use crate::approach;
use crate::config::ScoringConfig;

/// Outcome of a single award
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Award {
    pub gained: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub multiplier: f32,
}

/// Run score state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub streak: u32,
    pub best_streak: u32,
    /// Time since the last award (ms)
    pub combo_timer_ms: f32,
    /// Current tail length, eased toward `tail_target`
    pub tail_length: f32,
    pub tail_target: f32,
    pub pickups: u32,
}

impl ScoreState {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            score: 0,
            streak: 0,
            best_streak: 0,
            combo_timer_ms: 0.0,
            tail_length: config.tail_base,
            tail_target: config.tail_base,
            pickups: 0,
        }
    }

    /// Combo x surge multiplier at the current streak
    pub fn multiplier(&self, surge: bool, config: &ScoringConfig) -> f32 {
        let surge = if surge { config.surge_multiplier } else { 1.0 };
        (1.0 + self.streak as f32 * config.combo_step) * surge
    }

    fn retarget_tail(&mut self, config: &ScoringConfig) {
        self.tail_target =
            (config.tail_base + self.streak as f32 * config.tail_growth_per_streak).min(config.tail_max);
    }

    /// Award `base` points.
    ///
    /// The multiplier uses the streak as it was before this award, then the
    /// streak advances.
    pub fn award(&mut self, base: f32, surge: bool, config: &ScoringConfig) -> Award {
        let multiplier = self.multiplier(surge, config);
        let gained = (base.max(0.0) * multiplier).floor() as u64;

        self.combo_timer_ms = 0.0;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.retarget_tail(config);
        self.score = self.score.saturating_add(gained);

        Award {
            gained,
            streak: self.streak,
            best_streak: self.best_streak,
            multiplier,
        }
    }

    /// Advance the decay timer by wall-clock `delta_ms`.
    ///
    /// Returns the streak that was lost if the combo timed out.
    pub fn update_combo(&mut self, delta_ms: f32, config: &ScoringConfig) -> Option<u32> {
        self.combo_timer_ms += delta_ms;
        if self.streak > 0 && self.combo_timer_ms >= config.combo_window_ms {
            let lost = self.streak;
            self.reset_streak(config);
            return Some(lost);
        }
        None
    }

    /// Drop the streak to zero (best streak is kept)
    pub fn reset_streak(&mut self, config: &ScoringConfig) {
        self.streak = 0;
        self.retarget_tail(config);
    }

    /// Points deducted when an enemy escapes
    pub fn escape_penalty(max_health: f32, width: f32, config: &ScoringConfig) -> u64 {
        let extra_health = (max_health - 1.0).max(0.0);
        let penalty = config.escape_base
            + extra_health * config.escape_per_health
            + (width * config.escape_width_factor).round();
        penalty.max(0.0) as u64
    }

    /// Deduct the escape penalty and kill the combo; returns points deducted
    pub fn apply_escape_penalty(&mut self, max_health: f32, width: f32, config: &ScoringConfig) -> u64 {
        let penalty = Self::escape_penalty(max_health, width, config).min(self.score);
        self.score -= penalty;
        self.reset_streak(config);
        self.combo_timer_ms = config.combo_window_ms;
        penalty
    }

    /// Ease the tail toward its target
    pub fn ease_tail(&mut self, delta_ms: f32, config: &ScoringConfig) {
        let max_step = config.tail_ease_rate * delta_ms / 1000.0 * (1.0 + self.tail_target);
        self.tail_length = approach(self.tail_length, self.tail_target, max_step);
    }
}
