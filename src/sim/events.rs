//! Outbound simulation events
//!
//! Steps push events into a queue owned by the state; the host drains it once
//! per frame and forwards to audio, meta-progression or telemetry.

use serde::{Deserialize, Serialize};

use super::powerup::PowerUpKind;

/// Boss battle status reported to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossStatus {
    Alert,
    Active,
    Defeated,
    Escaped,
}

impl BossStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BossStatus::Alert => "alert",
            BossStatus::Active => "active",
            BossStatus::Defeated => "defeated",
            BossStatus::Escaped => "escaped",
        }
    }
}

/// Final numbers for a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub score: u64,
    pub survival_ms: f32,
    pub best_streak: u32,
    pub pickups: u32,
    pub villains_defeated: u32,
    pub bosses_defeated: u32,
    pub reason: String,
}

/// Discrete event emitted by a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score changed by `delta` (negative for penalties)
    Score { delta: i64, total: u64 },
    /// Streak changed by `delta`
    Streak { best: u32, delta: i32 },
    /// Power-up collected
    PowerUp { kind: PowerUpKind },
    /// Enemy destroyed by the player
    VillainKilled { name: String, boss: bool },
    BossStatus { status: BossStatus, boss_key: String },
    /// Whole-second tick of the run clock
    Time { total_ms: u64 },
    GameOver { reason: String, summary: RunSummary },
}

/// Per-step event buffer
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let mut q = EventQueue::new();
        q.push(GameEvent::Time { total_ms: 1000 });
        q.push(GameEvent::PowerUp {
            kind: PowerUpKind::HyperBeam,
        });
        assert_eq!(q.len(), 2);
        let drained = q.drain();
        assert!(q.is_empty());
        assert_eq!(drained[0], GameEvent::Time { total_ms: 1000 });
        assert!(matches!(drained[1], GameEvent::PowerUp { .. }));
    }

    #[test]
    fn test_events_serialize() {
        let json = serde_json::to_string(&GameEvent::BossStatus {
            status: BossStatus::Alert,
            boss_key: "nebula_warden".into(),
        })
        .unwrap();
        assert!(json.contains("nebula_warden"));
        assert!(json.contains("Alert"));
    }
}
