//! Host-facing facade
//!
//! `Game` owns the simulation state and the fixed-timestep accumulator. Hosts
//! feed it wall-clock timestamps through `frame`, set the merged input intent,
//! read snapshots and either drain events or register sinks.

use crate::config::SimConfig;
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, SIM_STEP_MS};
use crate::sim::events::{BossStatus, GameEvent, RunSummary};
use crate::sim::powerup::PowerUpKind;
use crate::sim::snapshot::{FrameSnapshot, HudSnapshot};
use crate::sim::state::{GamePhase, InputIntent, SimulationState};
use crate::sim::tick::tick;

/// Receiver for simulation events. Every method defaults to a no-op.
pub trait EventSink {
    fn on_score(&mut self, _delta: i64, _total: u64) {}
    fn on_streak(&mut self, _best: u32, _delta: i32) {}
    fn on_power_up(&mut self, _kind: PowerUpKind) {}
    fn on_villain_killed(&mut self, _name: &str, _boss: bool) {}
    fn on_boss_status(&mut self, _status: BossStatus, _boss_key: &str) {}
    fn on_time(&mut self, _total_ms: u64) {}
    fn on_game_over(&mut self, _reason: &str, _summary: &RunSummary) {}
}

/// Forward one event to the matching sink method
pub fn dispatch_event(sink: &mut dyn EventSink, event: &GameEvent) {
    match event {
        GameEvent::Score { delta, total } => sink.on_score(*delta, *total),
        GameEvent::Streak { best, delta } => sink.on_streak(*best, *delta),
        GameEvent::PowerUp { kind } => sink.on_power_up(*kind),
        GameEvent::VillainKilled { name, boss } => sink.on_villain_killed(name, *boss),
        GameEvent::BossStatus { status, boss_key } => sink.on_boss_status(*status, boss_key),
        GameEvent::Time { total_ms } => sink.on_time(*total_ms),
        GameEvent::GameOver { reason, summary } => sink.on_game_over(reason, summary),
    }
}

/// Simulation plus fixed-step driver
pub struct Game {
    state: SimulationState,
    accumulator: f32,
    /// Timestamp of the previous frame; `None` after start or resume
    last_time: Option<f64>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl Game {
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            state: SimulationState::new(seed, config),
            accumulator: 0.0,
            last_time: None,
            sinks: Vec::new(),
        }
    }

    /// Register a sink that receives events after every step
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Replace the configuration and reset the run
    pub fn configure(&mut self, config: SimConfig) {
        self.state.config = config.sanitized();
        self.reset();
    }

    /// Reinitialize every pool and run value, keeping seed and config
    pub fn reset(&mut self) {
        self.state.reset();
        self.accumulator = 0.0;
        self.last_time = None;
    }

    /// Begin running; a finished run is reset first
    pub fn start(&mut self) {
        match self.state.phase {
            GamePhase::Running => return,
            GamePhase::GameOver => self.reset(),
            GamePhase::Ready | GamePhase::Paused => {}
        }
        self.state.phase = GamePhase::Running;
        self.last_time = None;
        log::info!(
            "Run started (seed {}, mode {})",
            self.state.rng.seed(),
            self.state.config.mode.as_str()
        );
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Paused;
            log::info!("Paused at {:.1}s", self.state.elapsed_ms / 1000.0);
        }
    }

    /// Continue a paused run without replaying the time spent paused
    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Running;
            self.last_time = None;
            self.accumulator = 0.0;
            log::info!("Resumed");
        }
    }

    pub fn set_input_intent(&mut self, intent: InputIntent) {
        self.state.input = intent.sanitized();
    }

    /// Advance exactly one step of `delta_ms` and deliver its events to sinks
    pub fn step(&mut self, delta_ms: f32) {
        tick(&mut self.state, delta_ms);
        self.flush_sinks();
    }

    /// Drive the simulation from a wall-clock timestamp (ms).
    /// Returns the number of whole steps run.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let frame_ms = match self.last_time {
            Some(prev) => (now_ms - prev) as f32,
            None => 0.0,
        };
        if now_ms.is_finite() {
            self.last_time = Some(now_ms);
        }
        let frame_ms = if frame_ms.is_finite() && frame_ms >= 0.0 {
            frame_ms.min(MAX_FRAME_MS)
        } else {
            SIM_STEP_MS
        };

        // Paused or idle: visuals only, no steps consumed
        if !self.state.is_running() {
            tick(&mut self.state, frame_ms);
            return 0;
        }

        self.accumulator += frame_ms;
        let mut steps = 0;
        while self.accumulator >= SIM_STEP_MS && steps < MAX_SUBSTEPS {
            self.step(SIM_STEP_MS);
            self.accumulator -= SIM_STEP_MS;
            steps += 1;
            if !self.state.is_running() {
                self.accumulator = 0.0;
                break;
            }
        }

        // Catch-up cap hit: drop the backlog
        if steps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        steps
    }

    fn flush_sinks(&mut self) {
        if self.sinks.is_empty() || self.state.events.is_empty() {
            return;
        }
        let events = self.state.events.drain();
        for sink in &mut self.sinks {
            for event in &events {
                dispatch_event(sink.as_mut(), event);
            }
        }
    }

    /// Take queued events (only populated when no sinks are registered)
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain()
    }

    /// Drain queued events into a caller-owned sink
    pub fn dispatch(&mut self, sink: &mut dyn EventSink) {
        for event in self.state.events.drain() {
            dispatch_event(sink, &event);
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot::capture(&self.state)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::capture(&self.state)
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.state.summary.as_ref()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn running_game() -> Game {
        let mut game = Game::new(11, SimConfig::default());
        game.start();
        game
    }

    #[test]
    fn test_first_frame_is_zero_length() {
        let mut game = running_game();
        assert_eq!(game.frame(5000.0), 0);
        assert_eq!(game.frame(5040.0), 2);
        assert_eq!(game.state().step_count, 2);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut game = running_game();
        game.frame(0.0);
        assert_eq!(game.frame(10_000.0), MAX_SUBSTEPS);
        // Backlog dropped: a short follow-up frame runs nothing
        assert_eq!(game.frame(10_005.0), 0);
    }

    #[test]
    fn test_bad_frame_time_counts_as_one_step() {
        let mut game = running_game();
        game.frame(1000.0);
        assert_eq!(game.frame(500.0), 1);
        assert_eq!(game.frame(f64::NAN), 1);
    }

    #[test]
    fn test_pause_freezes_and_resume_drops_reference() {
        let mut game = running_game();
        game.frame(0.0);
        game.frame(50.0);
        let steps = game.state().step_count;

        game.pause();
        assert_eq!(game.frame(100.0), 0);
        assert_eq!(game.frame(5000.0), 0);
        assert_eq!(game.state().step_count, steps);

        game.resume();
        assert_eq!(game.frame(9000.0), 0);
        assert_eq!(game.frame(9020.0), 1);
    }

    #[test]
    fn test_step_outside_running_is_visual_only() {
        let mut game = Game::new(3, SimConfig::default());
        game.step(SIM_STEP_MS);
        assert_eq!(game.state().step_count, 0);
        assert_eq!(game.phase(), GamePhase::Ready);
    }

    #[test]
    fn test_input_is_sanitized() {
        let mut game = running_game();
        game.set_input_intent(InputIntent::new(4.0, f32::NAN, true));
        assert_eq!(game.state().input.move_vector, glam::Vec2::new(1.0, 0.0));
    }

    #[derive(Default)]
    struct Recorder {
        times: Vec<u64>,
        game_over: Option<String>,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl EventSink for SharedRecorder {
        fn on_time(&mut self, total_ms: u64) {
            self.0.borrow_mut().times.push(total_ms);
        }

        fn on_game_over(&mut self, reason: &str, _summary: &RunSummary) {
            self.0.borrow_mut().game_over = Some(reason.to_string());
        }
    }

    #[test]
    fn test_sinks_receive_events() {
        let record = Rc::new(RefCell::new(Recorder::default()));
        let mut game = Game::new(11, SimConfig::default()).with_sink(Box::new(SharedRecorder(record.clone())));
        game.start();
        for _ in 0..61 {
            game.step(SIM_STEP_MS);
        }
        assert_eq!(record.borrow().times.len(), 1);
        assert!(game.drain_events().is_empty());

        game.state_mut().end_run("test over");
        game.step(SIM_STEP_MS);
        assert_eq!(record.borrow().game_over.as_deref(), Some("test over"));
    }

    #[test]
    fn test_dispatch_drains_queue() {
        let mut game = running_game();
        for _ in 0..61 {
            game.step(SIM_STEP_MS);
        }
        let record = Rc::new(RefCell::new(Recorder::default()));
        let mut sink = SharedRecorder(record.clone());
        game.dispatch(&mut sink);
        assert_eq!(record.borrow().times.len(), 1);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_start_after_game_over_resets() {
        let mut game = running_game();
        for _ in 0..30 {
            game.step(SIM_STEP_MS);
        }
        game.state_mut().end_run("done");
        assert_eq!(game.summary().map(|s| s.reason.as_str()), Some("done"));
        game.start();
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.state().elapsed_ms, 0.0);
        assert!(game.summary().is_none());
    }

    #[test]
    fn test_configure_resets_with_new_values() {
        let mut game = running_game();
        let mut config = SimConfig::default();
        config.spawn.base_speed = -5.0;
        game.configure(config);
        assert_eq!(game.phase(), GamePhase::Ready);
        assert_eq!(game.hud().game_speed, 260.0);
    }
}
