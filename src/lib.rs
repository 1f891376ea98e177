use wasm_bindgen::prelude::*;

pub mod ai;
pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod types;
pub mod wasm;

pub use board::Board;
pub use error::MoveError;
pub use game::{
    FirstLegalMoveSelector, Game, GameConfig, Intent, MoveSelector, StateObserver, Turn,
    compute_advisory_moves, create_initial_state,
};
pub use types::{Cell, GameState, Move, PieceKind, Position, Side};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
