//! Game session controller.
//!
//! A [`Game`] owns one [`Session`] and drives it from four inputs: the start/pause/
//! restart buttons, monster clicks ([`Game::capture`]) and fired timers
//! ([`Game::handle_timer`]). Everything runs to completion on the caller's thread;
//! there is no locking and no error path. Operations whose preconditions do not
//! hold simply do nothing.
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//!                    |
//!              lives hit 0
//!                    v
//!                 GameOver --restart/play_again--> Idle
//! ```
//!
//! Three kinds of timers are in flight while running: the 1 s elapsed clock, the
//! self-rescheduling spawn timer and one lifetime timer per monster. Pausing cancels
//! the first two outright (resume starts them from scratch). Lifetime timers keep
//! running, so monsters still escape, and can end the game, while paused.

mod monster;
mod observer;

pub use monster::{Monster, MonsterId, MonsterKind, Position};
pub use observer::{EventLog, GameEvent, GameObserver};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, trace};

use crate::config::{CLOCK_PERIOD_MS, ConfigError, GameConfig};
use crate::scheduler::{Scheduler, SimulatedScheduler, TimerEvent, TimerHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Score and time frozen at the moment the last life was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u32,
    pub elapsed_seconds: u32,
    pub level: u32,
}

#[derive(Debug)]
struct ActiveMonster {
    monster: Monster,
    /// `None` only if the scheduler refused the lifetime timer.
    expiry: Option<TimerHandle>,
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    score: u32,
    lives: u32,
    elapsed_seconds: u32,
    level: u32,
    monsters: Vec<ActiveMonster>,
    summary: Option<GameSummary>,
}

impl Session {
    fn new(config: &GameConfig) -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            lives: config.initial_lives,
            elapsed_seconds: 0,
            level: 1,
            monsters: Vec::new(),
            summary: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    /// True while a game is in progress, paused or not.
    pub fn running(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Paused)
    }
    pub fn paused(&self) -> bool {
        self.phase == Phase::Paused
    }
    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn lives(&self) -> u32 {
        self.lives
    }
    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }
    pub fn level(&self) -> u32 {
        self.level
    }
    pub fn active_count(&self) -> usize {
        self.monsters.len()
    }
    pub fn monsters(&self) -> impl Iterator<Item = &Monster> + '_ {
        self.monsters.iter().map(|a| &a.monster)
    }
    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters().find(|m| m.id == id)
    }
    pub fn summary(&self) -> Option<GameSummary> {
        self.summary
    }

    fn index_of(&self, id: MonsterId) -> Option<usize> {
        self.monsters.iter().position(|a| a.monster.id == id)
    }
}

pub struct Game<S: Scheduler, O: GameObserver> {
    config: GameConfig,
    scheduler: S,
    observer: O,
    rng: ChaCha8Rng,
    session: Session,
    clock_timer: Option<TimerHandle>,
    spawn_timer: Option<TimerHandle>,
    // monotonic across restarts so late renderer callbacks never alias a new monster
    next_monster_id: u64,
}

impl<S: Scheduler, O: GameObserver> Game<S, O> {
    pub fn new(config: GameConfig, scheduler: S, observer: O, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let session = Session::new(&config);
        Ok(Self {
            config,
            scheduler,
            observer,
            rng: ChaCha8Rng::seed_from_u64(seed),
            session,
            clock_timer: None,
            spawn_timer: None,
            next_monster_id: 0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    pub fn observer(&self) -> &O {
        &self.observer
    }
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Delay the spawn timer uses at the current level.
    pub fn current_spawn_interval_ms(&self) -> u64 {
        self.config.spawn_interval_ms(self.session.level)
    }

    pub fn start(&mut self) {
        if self.session.phase != Phase::Idle {
            return;
        }
        self.set_phase(Phase::Running);
        self.start_timers();
        info!(lives = self.session.lives, "game started");
    }

    pub fn pause(&mut self) {
        if self.session.phase != Phase::Running {
            return;
        }
        self.set_phase(Phase::Paused);
        self.stop_timers();
        info!(elapsed = self.session.elapsed_seconds, "game paused");
    }

    pub fn resume(&mut self) {
        if self.session.phase != Phase::Paused {
            return;
        }
        self.set_phase(Phase::Running);
        self.start_timers();
        info!("game resumed");
    }

    pub fn toggle_pause(&mut self) {
        match self.session.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Back to the initial idle session from any phase.
    pub fn restart(&mut self) {
        self.stop_timers();
        self.clear_monsters();
        self.session = Session::new(&self.config);
        self.observer.on_reset();
        self.observer.on_score_change(self.session.score);
        self.observer.on_lives_change(self.session.lives);
        self.observer.on_time_change(self.session.elapsed_seconds);
        self.observer.on_phase_change(Phase::Idle);
        info!("session reset");
    }

    /// Dismiss the game-over summary; same effect as [`Game::restart`].
    pub fn play_again(&mut self) {
        self.restart();
    }

    /// Player clicked monster `id`. Returns whether it was captured.
    pub fn capture(&mut self, id: MonsterId) -> bool {
        if self.session.phase != Phase::Running {
            return false;
        }
        let Some(idx) = self.session.index_of(id) else {
            trace!(?id, "capture of unknown monster ignored");
            return false;
        };
        let active = self.session.monsters.remove(idx);
        if let Some(handle) = active.expiry {
            self.scheduler.cancel(handle);
        }

        let points = self.config.points_per_monster;
        self.session.score = self.session.score.saturating_add(points);
        let new_level = self.config.level_for_score(self.session.score);

        self.observer.on_capture(&active.monster, points);
        self.observer.on_score_change(self.session.score);
        debug!(?id, score = self.session.score, "monster captured");

        if new_level > self.session.level {
            self.session.level = new_level;
            self.observer.on_level_up(new_level);
            info!(level = new_level, interval_ms = self.current_spawn_interval_ms(), "level up");
        }
        true
    }

    /// Dispatch a fired timer. Handles the controller no longer holds are stale
    /// (cancelled while the callback was queued) and are dropped.
    pub fn handle_timer(&mut self, handle: TimerHandle, event: TimerEvent) {
        match event {
            TimerEvent::ClockTick => {
                if self.clock_timer != Some(handle) {
                    trace!(?handle, "stale clock tick");
                    return;
                }
                self.clock_timer = None;
                self.tick_clock();
            }
            TimerEvent::Spawn => {
                if self.spawn_timer != Some(handle) {
                    trace!(?handle, "stale spawn timer");
                    return;
                }
                self.spawn_timer = None;
                if self.session.phase == Phase::Running {
                    self.spawn_monster();
                    self.schedule_next_spawn();
                }
            }
            TimerEvent::Expire(id) => {
                let owned = self
                    .session
                    .monsters
                    .iter()
                    .any(|a| a.monster.id == id && a.expiry == Some(handle));
                if !owned {
                    trace!(?id, "stale expiry timer");
                    return;
                }
                self.escape_monster(id);
            }
        }
    }

    fn tick_clock(&mut self) {
        if self.session.phase != Phase::Running {
            return;
        }
        self.session.elapsed_seconds += 1;
        self.observer.on_time_change(self.session.elapsed_seconds);
        self.clock_timer = self.schedule(CLOCK_PERIOD_MS, TimerEvent::ClockTick);
    }

    fn spawn_monster(&mut self) {
        if self.session.monsters.len() >= self.config.max_monsters {
            debug!(active = self.session.monsters.len(), "play area full, spawn skipped");
            return;
        }
        let id = MonsterId(self.next_monster_id);
        self.next_monster_id += 1;
        let now = self.scheduler.now_ms();
        let lifetime = self.config.monster_lifetime_ms;
        let monster = Monster::random(&mut self.rng, id, now, lifetime);
        let expiry = self.schedule(lifetime, TimerEvent::Expire(id));
        self.session.monsters.push(ActiveMonster { monster, expiry });
        self.observer.on_spawn(&monster);
        debug!(?id, glyph = monster.kind.glyph(), "monster spawned");
    }

    /// Runs while paused too: only the clock and spawner stop on pause.
    fn escape_monster(&mut self, id: MonsterId) {
        if !self.session.running() {
            return;
        }
        let Some(idx) = self.session.index_of(id) else {
            return;
        };
        let active = self.session.monsters.remove(idx);
        if let Some(handle) = active.expiry {
            self.scheduler.cancel(handle);
        }
        self.session.lives = self.session.lives.saturating_sub(1);
        self.observer.on_escape(&active.monster);
        self.observer.on_lives_change(self.session.lives);
        debug!(?id, lives = self.session.lives, "monster escaped");

        if self.session.lives == 0 {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.stop_timers();
        self.clear_monsters();
        let summary = GameSummary {
            score: self.session.score,
            elapsed_seconds: self.session.elapsed_seconds,
            level: self.session.level,
        };
        self.session.summary = Some(summary);
        self.set_phase(Phase::GameOver);
        self.observer.on_game_over(summary.score, summary.elapsed_seconds);
        info!(score = summary.score, seconds = summary.elapsed_seconds, "game over");
    }

    fn start_timers(&mut self) {
        if let Some(handle) = self.clock_timer.take() {
            self.scheduler.cancel(handle);
        }
        self.clock_timer = self.schedule(CLOCK_PERIOD_MS, TimerEvent::ClockTick);
        self.schedule_next_spawn();
    }

    fn schedule_next_spawn(&mut self) {
        if let Some(handle) = self.spawn_timer.take() {
            self.scheduler.cancel(handle);
        }
        let interval = self.current_spawn_interval_ms();
        self.spawn_timer = self.schedule(interval, TimerEvent::Spawn);
    }

    /// A refused timer leaves its slot empty rather than holding a handle that never fires.
    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> Option<TimerHandle> {
        match self.scheduler.schedule(delay_ms, event) {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(%err, ?event, "timer not scheduled");
                None
            }
        }
    }

    fn stop_timers(&mut self) {
        if let Some(handle) = self.clock_timer.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.spawn_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn clear_monsters(&mut self) {
        for active in self.session.monsters.drain(..) {
            if let Some(handle) = active.expiry {
                self.scheduler.cancel(handle);
            }
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.session.phase = phase;
        self.observer.on_phase_change(phase);
    }
}

impl<O: GameObserver> Game<SimulatedScheduler, O> {
    /// Run every timer due within the next `ms` milliseconds of simulated time.
    pub fn advance(&mut self, ms: u64) {
        let target = self.scheduler.now_ms().saturating_add(ms);
        while let Some((handle, event)) = self.scheduler.pop_due(target) {
            self.handle_timer(handle, event);
        }
        self.scheduler.settle(target);
    }
}
