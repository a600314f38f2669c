//! One-shot timer abstraction used by the session controller.
//!
//! The controller never owns callbacks: it schedules a [`TimerEvent`] and keeps the
//! returned [`TimerHandle`]. Whoever drives the scheduler (browser `setTimeout`, or
//! [`SimulatedScheduler`] in tests) hands the pair back to
//! [`Game::handle_timer`](crate::game::Game::handle_timer) when it fires.

use std::collections::{BTreeMap, HashMap};

use crate::game::MonsterId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second of play elapsed.
    ClockTick,
    Spawn,
    /// Lifetime of the given monster ran out.
    Expire(MonsterId),
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("timer rejected by host: {0}")]
    Rejected(String),
}

pub trait Scheduler {
    fn now_ms(&self) -> u64;
    /// On error no timer exists; the caller must not wait for `event`.
    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> Result<TimerHandle, ScheduleError>;
    /// Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Deterministic fake clock. Time only moves through [`SimulatedScheduler::pop_due`].
#[derive(Debug, Default)]
pub struct SimulatedScheduler {
    now_ms: u64,
    next_handle: u64,
    // (due, handle) keeps FIFO order for timers due at the same instant
    queue: BTreeMap<(u64, u64), TimerEvent>,
    due_by_handle: HashMap<u64, u64>,
}

impl SimulatedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the earliest timer due at or before `until_ms`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerEvent)> {
        let (&(due, handle), _) = self.queue.first_key_value()?;
        if due > until_ms {
            return None;
        }
        let event = self.queue.remove(&(due, handle))?;
        self.due_by_handle.remove(&handle);
        self.now_ms = self.now_ms.max(due);
        Some((TimerHandle(handle), event))
    }

    /// Move the clock forward without firing anything; used once every due timer
    /// up to `until_ms` has been popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_by_handle.contains_key(&handle.0)
    }
}

impl Scheduler for SimulatedScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> Result<TimerHandle, ScheduleError> {
        let handle = self.next_handle;
        self.next_handle += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, handle), event);
        self.due_by_handle.insert(handle, due);
        Ok(TimerHandle(handle))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(due) = self.due_by_handle.remove(&handle.0) {
            self.queue.remove(&(due, handle.0));
        }
    }
}
