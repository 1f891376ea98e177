use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::ai::{RandomMoveSelector, choose_preferring_captures};
use crate::board::Board;
use crate::error::{MoveError, MoveResult};
use crate::movegen::{advisory_moves, all_valid_moves, valid_moves};
use crate::types::{GameState, Move, Position, Side, in_bounds};

/// Chooses the automated opponent's move.
pub trait MoveSelector: Send {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Move>;
}

/// Deterministic selector: first capture in scan order, else first step.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Move> {
        choose_preferring_captures(all_valid_moves(board, side), |_| 0)
    }
}

/// Receives every state the machine produces, e.g. to persist it.
pub trait StateObserver: Send {
    fn state_changed(&mut self, state: &GameState);
}

/// Host-level settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Side placed on rows 5-7 in a new game.
    #[serde(default)]
    pub player_side: Side,
}

/// Something the host asks the machine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Move { from: Position, to: Position },
    QueryMoves { row: i32, col: i32 },
    AutomatedTurn(Side),
    Reset(Side),
}

/// Outcome of an accepted move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub state: GameState,
    pub human: Move,
    /// `None` when the opponent had no move or its move was refused.
    pub reply: Option<Move>,
}

pub fn create_initial_state(side: Side) -> GameState {
    GameState::new(Board::create(side))
}

/// Highlight destinations for the piece on `(row, col)`; off-board squares have none.
pub fn compute_advisory_moves(state: &GameState, row: i32, col: i32) -> Vec<Move> {
    match Position::checked(row, col) {
        Some(pos) => advisory_moves(&state.board, pos),
        None => Vec::new(),
    }
}

pub struct Game {
    config: GameConfig,
    selector: Box<dyn MoveSelector>,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Game {
    pub fn new(config: GameConfig, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            config,
            selector,
            observers: Vec::new(),
        }
    }

    pub fn new_with_default_selector(config: GameConfig) -> Self {
        Self::new(config, Box::new(RandomMoveSelector::from_clock()))
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn initial_state(&self) -> GameState {
        create_initial_state(self.config.player_side)
    }

    /// Single entry point: runs the intent and reports the result to every observer.
    pub fn dispatch(&mut self, state: &GameState, intent: Intent) -> GameState {
        let next = match intent {
            Intent::Move { from, to } => self.request_move(state, from, to),
            Intent::QueryMoves { row, col } => self.query_possible_moves(state, row, col),
            Intent::AutomatedTurn(side) => self.play_automated_turn(state, side),
            Intent::Reset(side) => self.reset(side),
        };
        for observer in &mut self.observers {
            observer.state_changed(&next);
        }
        next
    }

    pub fn query_possible_moves(&self, state: &GameState, row: i32, col: i32) -> GameState {
        GameState {
            board: state.board,
            possible_moves: compute_advisory_moves(state, row, col),
        }
    }

    /// Plays the player's move and the opponent's reply.
    /// A refused request returns `state` unchanged.
    pub fn request_move(&mut self, state: &GameState, from: Position, to: Position) -> GameState {
        match self.try_request_move(state, from, to) {
            Ok(turn) => turn.state,
            Err(err) => {
                warn!("{err}");
                state.clone()
            }
        }
    }

    pub fn try_request_move(
        &mut self,
        state: &GameState,
        from: Position,
        to: Position,
    ) -> MoveResult<Turn> {
        let (board, human) = self.apply_human_move(&state.board, from, to)?;
        let mover = board
            .get(to)
            .map(|kind| kind.side())
            .ok_or(MoveError::EmptyOrigin(from))?;

        let (board, reply) = match self.apply_automated_reply(&board, mover.opponent()) {
            Ok(done) => done,
            Err(err) => {
                warn!("{err}");
                (board, None)
            }
        };

        Ok(Turn {
            state: GameState {
                board,
                possible_moves: state.possible_moves.clone(),
            },
            human,
            reply,
        })
    }

    /// First half of a turn: validate the request against the legal moves of
    /// the piece on `from` and apply it.
    pub fn apply_human_move(
        &self,
        board: &Board,
        from: Position,
        to: Position,
    ) -> MoveResult<(Board, Move)> {
        for pos in [from, to] {
            if !in_bounds(pos.row as i32, pos.col as i32) {
                return Err(MoveError::OutOfBounds {
                    row: pos.row as i32,
                    col: pos.col as i32,
                });
            }
        }
        let kind = board.get(from).ok_or(MoveError::EmptyOrigin(from))?;

        let chosen = valid_moves(board, from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(MoveError::IllegalDestination { from, to })?;

        let mut next = board.apply_move(from, to, &chosen.captured);
        if next.promote_if_crowned(to) {
            debug!("{:?} crowned on {to}", kind);
        }
        debug!(
            "{} moved {from} -> {to}, {} captured",
            kind.side(),
            chosen.captured.len()
        );
        Ok((next, chosen))
    }

    /// Second half of a turn: let the selector move for `side` and recheck
    /// its claim against a fresh move list before applying it.
    pub fn apply_automated_reply(
        &mut self,
        board: &Board,
        side: Side,
    ) -> MoveResult<(Board, Option<Move>)> {
        let Some(claimed) = self.selector.select_move(board, side) else {
            debug!("{side} has no legal move");
            return Ok((*board, None));
        };

        let refused = MoveError::InvalidAutomatedMove {
            from: claimed.from,
            to: claimed.to,
        };
        if !in_bounds(claimed.from.row as i32, claimed.from.col as i32)
            || board.get(claimed.from).map(|kind| kind.side()) != Some(side)
        {
            return Err(refused);
        }
        let verified = valid_moves(board, claimed.from)
            .into_iter()
            .find(|mv| mv.from == claimed.from && mv.to == claimed.to)
            .ok_or(refused)?;

        let mut next = board.apply_move(verified.from, verified.to, &verified.captured);
        next.promote_if_crowned(verified.to);
        debug!(
            "{side} replied {} -> {}, {} captured",
            verified.from,
            verified.to,
            verified.captured.len()
        );
        Ok((next, Some(verified)))
    }

    /// Automated move for `side` alone, without a player move before it.
    pub fn play_automated_turn(&mut self, state: &GameState, side: Side) -> GameState {
        match self.apply_automated_reply(&state.board, side) {
            Ok((board, Some(_))) => GameState {
                board,
                possible_moves: state.possible_moves.clone(),
            },
            Ok((_, None)) => state.clone(),
            Err(err) => {
                warn!("{err}");
                state.clone()
            }
        }
    }

    pub fn reset(&self, side: Side) -> GameState {
        debug!("new game, {side} starts near the player");
        create_initial_state(side)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new_with_default_selector(GameConfig::default())
    }
}
