//! Browser bindings. One game session lives in the module; the page drives it
//! with intents and gets plain JS objects back in the persisted layout.

use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard};

use js_sys::Function;
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::error::MoveError;
use crate::game::{Game, GameConfig, Intent, StateObserver};
use crate::movegen::is_highlighted;
use crate::types::{GameState, Position, Side};

struct Session {
    game: Game,
    state: GameState,
}

impl Session {
    fn new(config: GameConfig) -> Self {
        let mut game = Game::new_with_default_selector(config);
        game.subscribe(Box::new(JsPersistence));
        let state = game.initial_state();
        Self { game, state }
    }

    fn apply(&mut self, intent: Intent) -> &GameState {
        self.state = self.game.dispatch(&self.state, intent);
        &self.state
    }
}

static SESSION: Lazy<Mutex<Option<Session>>> = Lazy::new(|| Mutex::new(None));

thread_local! {
    static PERSIST: RefCell<Option<Function>> = const { RefCell::new(None) };
    static PENDING: RefCell<Vec<GameState>> = const { RefCell::new(Vec::new()) };
}

/// Queues each new state for the callback registered by the page.
/// The queue is drained by `flush_saves` once the session lock is released.
struct JsPersistence;

impl StateObserver for JsPersistence {
    fn state_changed(&mut self, state: &GameState) {
        if PERSIST.with(|slot| slot.borrow().is_some()) {
            PENDING.with(|queue| queue.borrow_mut().push(state.clone()));
        }
    }
}

/// Hands queued states to the page. Must run with no session lock or
/// thread-local borrow held, since the callback may call back into the module.
fn flush_saves() {
    let pending = PENDING.with(RefCell::take);
    if pending.is_empty() {
        return;
    }
    let Some(callback) = PERSIST.with(|slot| slot.borrow().clone()) else {
        return;
    };
    for state in &pending {
        match to_js(state) {
            Ok(value) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    warn!("persistence callback failed: {err:?}");
                }
            }
            Err(err) => warn!("could not serialize game state: {err:?}"),
        }
    }
}

fn to_js(state: &GameState) -> Result<JsValue, JsValue> {
    // json_compatible keeps empty squares as `null`, matching stored games.
    state
        .serialize(&Serializer::json_compatible())
        .map_err(Into::into)
}

fn parse_side(side: &str) -> Result<Side, JsValue> {
    Side::parse(side).ok_or_else(|| JsValue::from_str(&format!("unknown side: {side}")))
}

fn lock_session() -> Result<MutexGuard<'static, Option<Session>>, JsValue> {
    SESSION
        .lock()
        .map_err(|_| JsValue::from_str("game session is poisoned"))
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, JsValue> {
    let out = {
        let mut guard = lock_session()?;
        f(guard.get_or_insert_with(|| Session::new(GameConfig::default())))
    };
    flush_saves();
    Ok(out)
}

fn start_session(config: GameConfig) -> Result<JsValue, JsValue> {
    let mut session = Session::new(config);
    let state = session.apply(Intent::Reset(config.player_side)).clone();
    *lock_session()? = Some(session);
    flush_saves();
    to_js(&state)
}

/// Routes `log` output to the browser console.
#[wasm_bindgen]
pub fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Registers the page's save hook. The callback receives every new state after
/// the call that produced it has released the session.
#[wasm_bindgen]
pub fn set_persistence_callback(callback: Function) {
    PERSIST.with(|slot| *slot.borrow_mut() = Some(callback));
}

/// Starts a fresh session with `side` near the player.
#[wasm_bindgen]
pub fn new_game(side: &str) -> Result<JsValue, JsValue> {
    let player_side = parse_side(side)?;
    start_session(GameConfig { player_side })
}

/// Starts a fresh session from a `{ playerSide }` object; missing fields take
/// their defaults.
#[wasm_bindgen]
pub fn start_game(config: JsValue) -> Result<JsValue, JsValue> {
    let config: GameConfig = if config.is_undefined() || config.is_null() {
        GameConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    start_session(config)
}

#[wasm_bindgen]
pub fn game_config() -> Result<JsValue, JsValue> {
    let config = with_session(|session| session.game.config())?;
    config
        .serialize(&Serializer::json_compatible())
        .map_err(Into::into)
}

/// Restores a state previously produced by this module.
#[wasm_bindgen]
pub fn load_game(saved: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = serde_wasm_bindgen::from_value(saved)?;
    with_session(|session| {
        session.state = state;
        to_js(&session.state)
    })?
}

#[wasm_bindgen]
pub fn current_state() -> Result<JsValue, JsValue> {
    with_session(|session| to_js(&session.state))?
}

/// Highlights the destinations of the piece on `(row, col)`.
#[wasm_bindgen]
pub fn possible_moves(row: i32, col: i32) -> Result<JsValue, JsValue> {
    with_session(|session| to_js(session.apply(Intent::QueryMoves { row, col })))?
}

#[wasm_bindgen]
pub fn highlighted(row: i32, col: i32) -> Result<bool, JsValue> {
    with_session(|session| {
        Position::checked(row, col).is_some_and(|pos| is_highlighted(&session.state, pos))
    })
}

/// Plays the player's move and the opponent's reply; an invalid request leaves
/// the state as it was.
#[wasm_bindgen]
pub fn move_checker(
    from_row: i32,
    from_col: i32,
    to_row: i32,
    to_col: i32,
) -> Result<JsValue, JsValue> {
    with_session(|session| {
        let from = Position::checked(from_row, from_col).ok_or(MoveError::OutOfBounds {
            row: from_row,
            col: from_col,
        });
        let to = Position::checked(to_row, to_col).ok_or(MoveError::OutOfBounds {
            row: to_row,
            col: to_col,
        });
        match (from, to) {
            (Ok(from), Ok(to)) => to_js(session.apply(Intent::Move { from, to })),
            (Err(err), _) | (_, Err(err)) => {
                warn!("{err}");
                to_js(&session.state)
            }
        }
    })?
}

/// Lets the automated opponent move for `side` without a player move first.
#[wasm_bindgen]
pub fn ai_move(side: &str) -> Result<JsValue, JsValue> {
    let side = parse_side(side)?;
    with_session(|session| to_js(session.apply(Intent::AutomatedTurn(side))))?
}

#[wasm_bindgen]
pub fn reset(side: &str) -> Result<JsValue, JsValue> {
    let side = parse_side(side)?;
    with_session(|session| to_js(session.apply(Intent::Reset(side))))?
}
