use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::scheduler::{ScheduleError, Scheduler, TimerEvent, TimerHandle};

struct PendingTimer {
    timeout_id: i32,
    callback: Closure<dyn FnMut()>,
}

/// Closures of armed timers. Lives outside the game so a callback can release its
/// own timer even when the game cannot be borrowed.
#[derive(Default)]
struct Registry {
    pending: HashMap<u64, PendingTimer>,
    // Closures of fired timers; freed on the next callback, once they have returned.
    spent: Vec<Closure<dyn FnMut()>>,
}

thread_local! {
    static TIMERS: RefCell<Registry> = RefCell::new(Registry::default());
}

/// [`Scheduler`] backed by `window.setTimeout`.
pub struct BrowserScheduler {
    window: Window,
    next_handle: u64,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window, next_handle: 0 }
    }
}

fn arm(window: &Window, handle: TimerHandle, delay_ms: u64, event: TimerEvent) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move || fire(handle, event)) as Box<dyn FnMut()>);
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    let timeout_id = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), delay)?;
    TIMERS.with(|t| {
        t.borrow_mut()
            .pending
            .insert(handle.0, PendingTimer { timeout_id, callback });
    });
    Ok(())
}

pub(crate) fn fire(handle: TimerHandle, event: TimerEvent) {
    TIMERS.with(|t| {
        let mut timers = t.borrow_mut();
        timers.spent.clear();
        if let Some(timer) = timers.pending.remove(&handle.0) {
            timers.spent.push(timer.callback);
        }
    });
    if super::dispatch_timer(handle, event) {
        return;
    }
    // The game was busy; re-arm under the same handle so the controller still matches it.
    warn!(?event, "game busy, timer re-armed");
    let rearmed = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))
        .and_then(|w| arm(&w, handle, 0, event));
    if let Err(err) = rearmed {
        error!(?err, ?event, "timer lost");
    }
}

pub(crate) fn is_armed(handle: TimerHandle) -> bool {
    TIMERS.with(|t| t.borrow().pending.contains_key(&handle.0))
}

impl Scheduler for BrowserScheduler {
    fn now_ms(&self) -> u64 {
        self.window
            .performance()
            .map(|p| p.now() as u64)
            .unwrap_or(0)
    }

    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> Result<TimerHandle, ScheduleError> {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        arm(&self.window, handle, delay_ms, event)
            .map_err(|err| ScheduleError::Rejected(err.as_string().unwrap_or_else(|| format!("{err:?}"))))?;
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let removed = TIMERS.with(|t| t.borrow_mut().pending.remove(&handle.0));
        if let Some(timer) = removed {
            self.window.clear_timeout_with_handle(timer.timeout_id);
        }
    }
}
