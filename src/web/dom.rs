//! DOM renderer for the monster page. Monster elements are owned here and matched to
//! core monsters by id only.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlElement, Window};

use super::WebError;
use crate::game::{GameObserver, Monster, MonsterId, Phase};

/// Rendered monster size; spawn positions are scaled into `area - SPRITE_PX`.
const SPRITE_PX: f64 = 80.0;
/// Capture / escape animation length before the element is removed.
const EXIT_ANIMATION_MS: i32 = 300;
const SCORE_POPUP_MS: i32 = 1_000;
const LEVEL_BANNER_MS: i32 = 2_000;

const IDLE_MESSAGE: &str = "Click \"Start\" to play!";
const PAUSED_MESSAGE: &str = "⏸️ Paused";
const PAUSE_LABEL: &str = "⏸️ Pause";
const RESUME_LABEL: &str = "▶️ Resume";

/// Fixed elements of the page, looked up once by id.
#[derive(Clone)]
pub struct Elements {
    pub start_btn: HtmlElement,
    pub pause_btn: HtmlElement,
    pub restart_btn: HtmlElement,
    pub play_again_btn: HtmlElement,
    pub game_area: HtmlElement,
    pub game_message: HtmlElement,
    pub game_over_modal: HtmlElement,
    pub score: HtmlElement,
    pub lives: HtmlElement,
    pub time: HtmlElement,
    pub final_score: HtmlElement,
    pub final_time: HtmlElement,
}

impl Elements {
    pub fn lookup(doc: &Document) -> Result<Self, WebError> {
        Ok(Self {
            start_btn: by_id(doc, "startBtn")?,
            pause_btn: by_id(doc, "pauseBtn")?,
            restart_btn: by_id(doc, "restartBtn")?,
            play_again_btn: by_id(doc, "playAgainBtn")?,
            game_area: by_id(doc, "gameArea")?,
            game_message: by_id(doc, "gameMessage")?,
            game_over_modal: by_id(doc, "gameOverModal")?,
            score: by_id(doc, "score")?,
            lives: by_id(doc, "lives")?,
            time: by_id(doc, "time")?,
            final_score: by_id(doc, "finalScore")?,
            final_time: by_id(doc, "finalTime")?,
        })
    }
}

fn by_id(doc: &Document, id: &'static str) -> Result<HtmlElement, WebError> {
    doc.get_element_by_id(id)
        .ok_or(WebError::MissingElement(id))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| WebError::NotHtmlElement(id))
}

type Listener = Closure<dyn FnMut(Event)>;

struct Sprite {
    element: HtmlElement,
    left: f64,
    top: f64,
    lifetime_ms: u64,
    listeners: Vec<Listener>,
}

impl Sprite {
    fn style(&self, paused: bool) -> String {
        let play_state = if paused { "paused" } else { "running" };
        format!(
            "left:{:.0}px; top:{:.0}px; animation-duration:{}ms; animation-play-state:{};",
            self.left, self.top, self.lifetime_ms, play_state
        )
    }
}

pub struct DomRenderer {
    window: Window,
    document: Document,
    elements: Elements,
    sprites: HashMap<MonsterId, Sprite>,
    // bumped on every message change so an expiring banner never hides a newer one
    message_seq: Rc<Cell<u32>>,
}

impl DomRenderer {
    pub fn new(window: Window, document: Document, elements: Elements) -> Self {
        Self {
            window,
            document,
            elements,
            sprites: HashMap::new(),
            message_seq: Rc::new(Cell::new(0)),
        }
    }

    fn create_div(&self) -> Result<HtmlElement, WebError> {
        self.document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| WebError::NotHtmlElement("div"))
    }

    fn spawn_sprite(&mut self, monster: &Monster) -> Result<(), WebError> {
        let element = self.create_div()?;
        element.set_class_name("monster");
        element.set_text_content(Some(monster.kind.glyph()));

        let max_x = (self.elements.game_area.client_width() as f64 - SPRITE_PX).max(0.0);
        let max_y = (self.elements.game_area.client_height() as f64 - SPRITE_PX).max(0.0);
        let mut sprite = Sprite {
            element: element.clone(),
            left: monster.position.x * max_x,
            top: monster.position.y * max_y,
            lifetime_ms: monster.expires_at_ms.saturating_sub(monster.spawned_at_ms),
            listeners: Vec::new(),
        };
        element.set_attribute("style", &sprite.style(false))?;

        let id = monster.id;
        let click: Listener = Closure::wrap(Box::new(move |_evt: Event| super::capture(id)) as Box<dyn FnMut(_)>);
        element.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        sprite.listeners.push(click);
        for kind in ["contextmenu", "selectstart"] {
            let suppress: Listener = Closure::wrap(Box::new(|evt: Event| evt.prevent_default()) as Box<dyn FnMut(_)>);
            element.add_event_listener_with_callback(kind, suppress.as_ref().unchecked_ref())?;
            sprite.listeners.push(suppress);
        }

        self.elements.game_area.append_child(&element)?;
        self.sprites.insert(id, sprite);
        Ok(())
    }

    /// Play the exit animation, then drop the element and its listeners.
    fn retire_sprite(&mut self, id: MonsterId, class: &str) {
        let Some(sprite) = self.sprites.remove(&id) else {
            return;
        };
        sprite.element.set_class_name(&format!("monster {class}"));
        let Sprite { element, listeners, .. } = sprite;
        self.after(EXIT_ANIMATION_MS, move || {
            element.remove();
            drop(listeners);
        });
    }

    fn show_score_popup(&self, monster: &Monster, points: u32) -> Result<(), WebError> {
        let Some(sprite) = self.sprites.get(&monster.id) else {
            return Ok(());
        };
        let popup = self.create_div()?;
        popup.set_class_name("score-popup");
        popup.set_text_content(Some(&format!("+{points}")));
        popup.set_attribute("style", &format!("left:{:.0}px; top:{:.0}px;", sprite.left, sprite.top))?;
        self.elements.game_area.append_child(&popup)?;
        self.after(SCORE_POPUP_MS, move || popup.remove());
        Ok(())
    }

    fn clear_sprites(&mut self) {
        for (_, sprite) in self.sprites.drain() {
            sprite.element.remove();
        }
    }

    fn set_sprites_paused(&self, paused: bool) {
        let play_state = if paused { "paused" } else { "running" };
        for (id, sprite) in &self.sprites {
            if let Err(err) = sprite.element.style().set_property("animation-play-state", play_state) {
                warn!(?err, ?id, "animation state not updated");
            }
        }
    }

    fn show_message(&self, text: &str, duration_ms: Option<i32>) {
        let seq = self.message_seq.get().wrapping_add(1);
        self.message_seq.set(seq);
        self.elements.game_message.set_text_content(Some(text));
        set_display(&self.elements.game_message, "block");

        if let Some(ms) = duration_ms {
            let current = Rc::clone(&self.message_seq);
            let message = self.elements.game_message.clone();
            self.after(ms, move || {
                if current.get() == seq {
                    set_display(&message, "none");
                }
            });
        }
    }

    fn hide_message(&self) {
        self.message_seq.set(self.message_seq.get().wrapping_add(1));
        set_display(&self.elements.game_message, "none");
    }

    /// Fire-and-forget rendering timeout; the closure frees itself after running.
    fn after(&self, ms: i32, f: impl FnOnce() + 'static) {
        let callback = Closure::once_into_js(f);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
        {
            warn!(?err, "render timeout not scheduled");
        }
    }
}

/// Touches only `display`; the rest of the inline style is left as authored.
fn set_display(el: &HtmlElement, display: &str) {
    if let Err(err) = el.style().set_property("display", display) {
        warn!(?err, id = %el.id(), "display not updated");
    }
}

impl GameObserver for DomRenderer {
    fn on_spawn(&mut self, monster: &Monster) {
        if let Err(err) = self.spawn_sprite(monster) {
            warn!(%err, id = ?monster.id, "monster not rendered");
        }
    }

    fn on_capture(&mut self, monster: &Monster, points: u32) {
        if let Err(err) = self.show_score_popup(monster, points) {
            warn!(%err, "score popup not rendered");
        }
        self.retire_sprite(monster.id, "clicked");
    }

    fn on_escape(&mut self, monster: &Monster) {
        self.retire_sprite(monster.id, "disappearing");
    }

    fn on_level_up(&mut self, level: u32) {
        self.show_message(&format!("🎉 Level {level}! 🎉"), Some(LEVEL_BANNER_MS));
    }

    fn on_score_change(&mut self, score: u32) {
        self.elements.score.set_text_content(Some(&score.to_string()));
    }

    fn on_lives_change(&mut self, lives: u32) {
        self.elements.lives.set_text_content(Some(&lives.to_string()));
    }

    fn on_time_change(&mut self, elapsed_seconds: u32) {
        self.elements.time.set_text_content(Some(&elapsed_seconds.to_string()));
    }

    fn on_game_over(&mut self, final_score: u32, final_seconds: u32) {
        self.clear_sprites();
        self.elements
            .final_score
            .set_text_content(Some(&format!("Final score: {final_score}")));
        self.elements
            .final_time
            .set_text_content(Some(&format!("Total time: {final_seconds}s")));
        set_display(&self.elements.game_over_modal, "flex");
    }

    fn on_phase_change(&mut self, phase: Phase) {
        let e = &self.elements;
        match phase {
            Phase::Idle => {
                set_display(&e.start_btn, "inline-block");
                set_display(&e.pause_btn, "none");
                set_display(&e.restart_btn, "none");
                e.pause_btn.set_text_content(Some(PAUSE_LABEL));
                self.show_message(IDLE_MESSAGE, None);
            }
            Phase::Running => {
                set_display(&e.start_btn, "none");
                set_display(&e.pause_btn, "inline-block");
                set_display(&e.restart_btn, "inline-block");
                e.pause_btn.set_text_content(Some(PAUSE_LABEL));
                self.hide_message();
                self.set_sprites_paused(false);
            }
            Phase::Paused => {
                e.pause_btn.set_text_content(Some(RESUME_LABEL));
                self.show_message(PAUSED_MESSAGE, None);
                self.set_sprites_paused(true);
            }
            Phase::GameOver => {
                set_display(&e.start_btn, "none");
                set_display(&e.pause_btn, "none");
                set_display(&e.restart_btn, "none");
            }
        }
    }

    fn on_reset(&mut self) {
        self.clear_sprites();
        set_display(&self.elements.game_over_modal, "none");
    }
}
