//! Monster Catch core crate.
//!
//! Monsters pop up in the play area on a timer that speeds up with every level; click
//! them before their lifetime runs out or lose a life. Three escapes end the game.
//!
//! The gameplay rules live in [`game`] and run on any host against the
//! [`scheduler::Scheduler`] trait, so tests drive them with a simulated clock. The
//! [`web`] module binds them to the page (`startBtn`, `pauseBtn`, `restartBtn`,
//! `playAgainBtn`, `gameArea`, `gameMessage`, `gameOverModal`, `score`, `lives`,
//! `time`, `finalScore`, `finalTime`) through `setTimeout` and DOM listeners.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod game;
pub mod scheduler;
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use game::{EventLog, Game, GameEvent, GameObserver, GameSummary, Monster, MonsterId, Phase, Session};
pub use scheduler::{ScheduleError, Scheduler, SimulatedScheduler, TimerEvent, TimerHandle};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Monster glyphs, picked uniformly at spawn time
// -----------------------------------------------------------------------------

pub const MONSTER_GLYPHS: &[&str] = &[
    "👹", "👺", "👻", "👽", "🤡", "🧟", "🧛", "🦹", "🐲", "🦖", "🕷️", "🦂",
];

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Mount the game with the default tuning. The page stays idle until Start is clicked.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::mount(GameConfig::default())?;
    Ok(())
}

/// Mount the game with a JSON tuning override, e.g. `{"max_monsters": 8}`.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(web::WebError::from)?;
    web::mount(config)?;
    Ok(())
}
