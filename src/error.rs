//! Errors produced while resolving a turn.
//!
//! None of these are fatal: the state machine answers every one of them by
//! keeping the previous board and logging the reason.

use thiserror::Error;

use crate::types::Position;

/// Reasons a move request or an automated reply is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Nothing to move on the origin square.
    #[error("Invalid move: no checker at {0}")]
    EmptyOrigin(Position),

    /// Destination is not reachable by any legal move of that piece.
    #[error("Invalid move: {from} to {to} is not a legal move")]
    IllegalDestination { from: Position, to: Position },

    /// Host sent coordinates outside the board.
    #[error("Invalid move: ({row}, {col}) is off the board")]
    OutOfBounds { row: i32, col: i32 },

    /// The automated opponent proposed a move that does not survive revalidation.
    #[error("Invalid automated move: {from} to {to}")]
    InvalidAutomatedMove { from: Position, to: Position },
}

impl MoveError {
    /// True for errors caused by the player's request rather than the opponent.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, MoveError::InvalidAutomatedMove { .. })
    }
}

pub type MoveResult<T> = Result<T, MoveError>;
