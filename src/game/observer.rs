//! Outbound notifications from the session controller to the render/input layer.

use super::{Monster, Phase};

/// Every method defaults to a no-op so renderers only implement what they display.
pub trait GameObserver {
    fn on_spawn(&mut self, _monster: &Monster) {}
    fn on_capture(&mut self, _monster: &Monster, _points: u32) {}
    fn on_escape(&mut self, _monster: &Monster) {}
    fn on_level_up(&mut self, _level: u32) {}
    fn on_score_change(&mut self, _score: u32) {}
    fn on_lives_change(&mut self, _lives: u32) {}
    fn on_time_change(&mut self, _elapsed_seconds: u32) {}
    fn on_game_over(&mut self, _final_score: u32, _final_seconds: u32) {}
    fn on_phase_change(&mut self, _phase: Phase) {}
    /// Session went back to its initial values; drop every rendered monster.
    fn on_reset(&mut self) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Spawned(Monster),
    Captured { monster: Monster, points: u32 },
    Escaped(Monster),
    LevelUp(u32),
    Score(u32),
    Lives(u32),
    Time(u32),
    GameOver { score: u32, seconds: u32 },
    Phase(Phase),
    Reset,
}

/// Headless observer that records everything it is told.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }

    pub fn spawned(&self) -> usize {
        self.count(|e| matches!(e, GameEvent::Spawned(_)))
    }

    pub fn ticks(&self) -> usize {
        self.count(|e| matches!(e, GameEvent::Time(_)))
    }
}

impl GameObserver for EventLog {
    fn on_spawn(&mut self, monster: &Monster) {
        self.events.push(GameEvent::Spawned(*monster));
    }
    fn on_capture(&mut self, monster: &Monster, points: u32) {
        self.events.push(GameEvent::Captured { monster: *monster, points });
    }
    fn on_escape(&mut self, monster: &Monster) {
        self.events.push(GameEvent::Escaped(*monster));
    }
    fn on_level_up(&mut self, level: u32) {
        self.events.push(GameEvent::LevelUp(level));
    }
    fn on_score_change(&mut self, score: u32) {
        self.events.push(GameEvent::Score(score));
    }
    fn on_lives_change(&mut self, lives: u32) {
        self.events.push(GameEvent::Lives(lives));
    }
    fn on_time_change(&mut self, elapsed_seconds: u32) {
        self.events.push(GameEvent::Time(elapsed_seconds));
    }
    fn on_game_over(&mut self, final_score: u32, final_seconds: u32) {
        self.events.push(GameEvent::GameOver { score: final_score, seconds: final_seconds });
    }
    fn on_phase_change(&mut self, phase: Phase) {
        self.events.push(GameEvent::Phase(phase));
    }
    fn on_reset(&mut self) {
        self.events.push(GameEvent::Reset);
    }
}
