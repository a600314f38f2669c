//! Browser wiring: one thread-local [`Game`] driven by DOM buttons, monster clicks and
//! `setTimeout` callbacks. Every callback runs to completion before the next, so a
//! `RefCell` is all the synchronization needed.

mod console;
mod dom;
mod timer;

pub use dom::{DomRenderer, Elements};
pub use timer::BrowserScheduler;

use std::cell::RefCell;

use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::config::{ConfigError, GameConfig};
use crate::game::{Game, MonsterId};
use crate::scheduler::{TimerEvent, TimerHandle};

pub type WebGame = Game<BrowserScheduler, DomRenderer>;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("element #{0} not found")]
    MissingElement(&'static str),

    #[error("element #{0} is not an HTML element")]
    NotHtmlElement(&'static str),

    #[error("DOM call failed: {0}")]
    Dom(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
}

/// Build the game against the page's elements and hook up its buttons. Mounting a
/// second time is ignored so buttons never get duplicate listeners.
pub(crate) fn mount(config: GameConfig) -> Result<(), WebError> {
    console::init();
    if GAME.with(|g| g.borrow().is_some()) {
        warn!("game already mounted");
        return Ok(());
    }

    let window = web_sys::window().ok_or(WebError::NoWindow)?;
    let document = window.document().ok_or(WebError::NoDocument)?;
    let elements = Elements::lookup(&document)?;

    let renderer = DomRenderer::new(window.clone(), document, elements.clone());
    let scheduler = BrowserScheduler::new(window.clone());
    let mut game = Game::new(config, scheduler, renderer, entropy_seed(&window))?;
    // paints the initial counters, buttons and idle message
    game.restart();
    GAME.with(|g| g.replace(Some(game)));

    on_click(&elements.start_btn, WebGame::start)?;
    on_click(&elements.pause_btn, WebGame::toggle_pause)?;
    on_click(&elements.restart_btn, WebGame::restart)?;
    on_click(&elements.play_again_btn, WebGame::play_again)?;
    info!("game mounted");
    Ok(())
}

fn on_click(button: &HtmlElement, action: fn(&mut WebGame)) -> Result<(), WebError> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        if !with_game(action) {
            warn!("button click dropped while game busy");
        }
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // buttons live as long as the page
    closure.forget();
    Ok(())
}

/// Returns false when the game is already borrowed and `f` did not run.
fn with_game(f: impl FnOnce(&mut WebGame)) -> bool {
    GAME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut game) => {
            if let Some(game) = game.as_mut() {
                f(game);
            }
            true
        }
        Err(_) => false,
    })
}

/// Deliver a fired timer. False means the caller must retry later.
pub(crate) fn dispatch_timer(handle: TimerHandle, event: TimerEvent) -> bool {
    with_game(|game| game.handle_timer(handle, event))
}

pub(crate) fn capture(id: MonsterId) {
    if !with_game(|game| {
        game.capture(id);
    }) {
        warn!(?id, "click dropped while game busy");
    }
}

fn entropy_seed(window: &web_sys::Window) -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            warn!(%err, "no entropy source, seeding from the clock");
            window.performance().map(|p| p.now().to_bits()).unwrap_or(0)
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn timer_fired_while_game_busy_is_rearmed() {
        let handle = TimerHandle(u64::MAX);
        GAME.with(|g| {
            let _busy = g.borrow_mut();
            timer::fire(handle, TimerEvent::ClockTick);
        });
        assert!(timer::is_armed(handle));

        let mut scheduler = BrowserScheduler::new(web_sys::window().unwrap());
        scheduler.cancel(handle);
        assert!(!timer::is_armed(handle));
    }

    #[wasm_bindgen_test]
    fn timer_fired_while_game_free_is_released() {
        let handle = TimerHandle(u64::MAX - 1);
        timer::fire(handle, TimerEvent::Spawn);
        assert!(!timer::is_armed(handle));
    }
}
