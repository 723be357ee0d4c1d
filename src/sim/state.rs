//! Simulation state and core run types
//!
//! Everything a run needs lives in one owned `SimulationState`, passed by
//! exclusive reference into every update function.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asteroid::AsteroidDirector;
use super::boss::BossBattle;
use super::difficulty::Difficulty;
use super::effects::Effects;
use super::entity::{Asteroid, Collectible, EnemyProjectile, Obstacle, Player, PowerUp, Projectile, TrailPoint};
use super::events::{EventQueue, GameEvent, RunSummary};
use super::powerup::{PowerUpDirector, PowerUpKind, PowerUpTimers};
use super::rng::SimRng;
use super::scoring::ScoreState;
use super::villain::VillainSelector;
use crate::config::SimConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Reset and waiting for `start`
    Ready,
    /// Active gameplay
    Running,
    /// Frozen by the host
    Paused,
    /// Run ended
    GameOver,
}

/// The only input the simulation consumes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputIntent {
    /// Desired direction, each axis in [-1, 1]
    pub move_vector: Vec2,
    pub firing: bool,
    /// Request a dash (ignored while on cooldown)
    #[serde(default)]
    pub dash: bool,
}

impl InputIntent {
    pub fn new(x: f32, y: f32, firing: bool) -> Self {
        Self {
            move_vector: Vec2::new(x, y),
            firing,
            dash: false,
        }
    }

    /// Clamp each axis to [-1, 1], mapping NaN to 0
    pub fn sanitized(self) -> Self {
        let axis = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        Self {
            move_vector: Vec2::new(axis(self.move_vector.x), axis(self.move_vector.y)),
            ..self
        }
    }
}

/// Countdowns to the next regular spawns (ms)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub obstacle_ms: f32,
    pub collectible_ms: f32,
    pub power_up_ms: f32,
}

impl SpawnTimers {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub config: SimConfig,
    pub rng: SimRng,
    pub phase: GamePhase,
    pub input: InputIntent,

    /// Wall-clock run time (ms), unaffected by time dilation
    pub elapsed_ms: f32,
    pub step_count: u64,
    pub difficulty: Difficulty,
    /// Current scroll speed (units/s)
    pub game_speed: f32,
    pub score: ScoreState,

    pub power_ups: PowerUpTimers,
    pub power_up_director: PowerUpDirector,
    pub villain_selector: VillainSelector,
    pub boss: BossBattle,
    pub spawn_timers: SpawnTimers,
    pub asteroid_director: AsteroidDirector,

    pub player: Player,
    /// Double Team clone
    pub clone: Option<Player>,
    /// Tail samples behind the ship (newest first)
    pub tail: Vec<TrailPoint>,

    pub obstacles: Vec<Obstacle>,
    pub asteroids: Vec<Asteroid>,
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<EnemyProjectile>,
    pub collectibles: Vec<Collectible>,
    /// Power-up pickups still in flight
    pub pickups: Vec<PowerUp>,

    pub effects: Effects,
    /// Hyper Beam intensity, 0..1
    pub beam_intensity: f32,

    pub events: EventQueue,
    pub villains_defeated: u32,
    pub summary: Option<RunSummary>,

    next_id: u32,
}

impl SimulationState {
    /// Fresh run in the `Ready` phase
    pub fn new(seed: u64, config: SimConfig) -> Self {
        let config = config.sanitized();
        let viewport = Vec2::new(config.viewport.width, config.viewport.height);
        let player = Self::spawn_player(&config);
        let difficulty = Difficulty::at(0.0, &config.difficulty, config.mode);

        Self {
            rng: SimRng::new(seed),
            phase: GamePhase::Ready,
            input: InputIntent::default(),
            elapsed_ms: 0.0,
            step_count: 0,
            game_speed: config.spawn.base_speed * difficulty.speed,
            difficulty,
            score: ScoreState::new(&config.scoring),
            power_ups: PowerUpTimers::new(),
            power_up_director: PowerUpDirector::new(),
            villain_selector: VillainSelector::new(),
            boss: BossBattle::default(),
            spawn_timers: SpawnTimers {
                obstacle_ms: config.spawn.obstacle_interval_ms,
                collectible_ms: config.spawn.collectible_interval_ms,
                power_up_ms: config.spawn.initial_power_up_delay_ms,
            },
            asteroid_director: AsteroidDirector::new(&config.asteroids, &config.meteor_showers),
            player,
            clone: None,
            tail: Vec::new(),
            obstacles: Vec::new(),
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            collectibles: Vec::new(),
            pickups: Vec::new(),
            effects: Effects::new(seed, viewport),
            beam_intensity: 0.0,
            events: EventQueue::new(),
            villains_defeated: 0,
            summary: None,
            next_id: 1,
            config,
        }
    }

    fn spawn_player(config: &SimConfig) -> Player {
        let size = Vec2::new(config.player.width, config.player.height);
        let pos = Vec2::new(
            config.viewport.width * config.player.start_x_ratio - size.x * 0.5,
            (config.viewport.height - size.y) * 0.5,
        );
        Player::new(pos, size)
    }

    /// Reinitialize pools and run state, keeping seed and config
    pub fn reset(&mut self) {
        let seed = self.rng.seed();
        let config = std::mem::take(&mut self.config);
        *self = Self::new(seed, config);
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.viewport.width, self.config.viewport.height)
    }

    /// Get next entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Shield power-up is up
    #[inline]
    pub fn shielded(&self) -> bool {
        self.power_ups.is_active(PowerUpKind::RadiantShield)
    }

    /// Award points through the combo economy and report the change
    pub fn award_score(&mut self, base: f32, at: Vec2) -> u64 {
        let surge = self.power_ups.is_active(PowerUpKind::ScoreSurge);
        let before = self.score.streak;
        let award = self.score.award(base, surge, &self.config.scoring);

        self.events.push(GameEvent::Score {
            delta: award.gained as i64,
            total: self.score.score,
        });
        self.events.push(GameEvent::Streak {
            best: award.best_streak,
            delta: award.streak as i32 - before as i32,
        });
        self.effects.float_text(at, format!("+{}", award.gained));
        award.gained
    }

    /// Kill the combo and report the lost streak
    pub fn break_streak(&mut self) {
        let lost = self.score.streak;
        self.score.reset_streak(&self.config.scoring);
        if lost > 0 {
            self.events.push(GameEvent::Streak {
                best: self.score.best_streak,
                delta: -(lost as i32),
            });
        }
    }

    /// Snapshot of the run's final numbers
    pub fn run_summary(&self, reason: &str) -> RunSummary {
        RunSummary {
            seed: self.rng.seed(),
            score: self.score.score,
            survival_ms: self.elapsed_ms,
            best_streak: self.score.best_streak,
            pickups: self.score.pickups,
            villains_defeated: self.villains_defeated,
            bosses_defeated: self.boss.defeated,
            reason: reason.to_string(),
        }
    }

    /// End the run (no-op unless running)
    pub fn end_run(&mut self, reason: impl Into<String>) {
        if self.phase != GamePhase::Running {
            return;
        }
        let reason = reason.into();
        let summary = self.run_summary(&reason);
        log::info!(
            "Game over: {reason} (score {}, {:.1}s, best streak {})",
            summary.score,
            summary.survival_ms / 1000.0,
            summary.best_streak
        );
        self.phase = GamePhase::GameOver;
        self.summary = Some(summary.clone());
        self.events.push(GameEvent::GameOver { reason, summary });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_ready() {
        let state = SimulationState::new(7, SimConfig::default());
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.game_speed, 260.0);
        assert_eq!(state.viewport(), Vec2::new(960.0, 540.0));
        assert!(state.player.pos.y > 0.0);
        assert_eq!(state.score.tail_length, 6.0);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = SimulationState::new(7, SimConfig::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_end_run_only_once() {
        let mut state = SimulationState::new(7, SimConfig::default());
        state.end_run("ignored while ready");
        assert!(state.events.is_empty());

        state.phase = GamePhase::Running;
        state.end_run("Hit a Comet Scout");
        state.end_run("second");
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.summary.as_ref().map(|s| s.reason.as_str()), Some("Hit a Comet Scout"));
    }

    #[test]
    fn test_award_score_emits_events() {
        let mut state = SimulationState::new(7, SimConfig::default());
        let gained = state.award_score(84.0, Vec2::ZERO);
        assert_eq!(gained, 84);
        let events = state.events.drain();
        assert_eq!(events[0], GameEvent::Score { delta: 84, total: 84 });
        assert_eq!(events[1], GameEvent::Streak { best: 1, delta: 1 });
        assert_eq!(state.effects.texts.len(), 1);
    }

    #[test]
    fn test_reset_keeps_seed_and_config() {
        let mut config = SimConfig::default();
        config.spawn.base_speed = 300.0;
        let mut state = SimulationState::new(99, config);
        state.phase = GamePhase::Running;
        state.score.score = 500;
        state.reset();
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score.score, 0);
        assert_eq!(state.rng.seed(), 99);
        assert_eq!(state.game_speed, 300.0);
    }

    #[test]
    fn test_input_sanitized() {
        let input = InputIntent::new(f32::NAN, 3.0, true).sanitized();
        assert_eq!(input.move_vector, Vec2::new(0.0, 1.0));
        assert!(input.firing);
    }
}
