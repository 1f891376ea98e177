use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;

pub const BOARD_SIZE: u8 = 8;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Accepts signed coordinates coming from the host; `None` when off the board.
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        if in_bounds(row, col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Steps `(dr, dc)` away from this square.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Self::checked(self.row as i32 + dr as i32, self.col as i32 + dc as i32)
    }

    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

/// One of the two players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Red,
    Black,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    pub fn man(self) -> PieceKind {
        match self {
            Side::Red => PieceKind::RedMan,
            Side::Black => PieceKind::BlackMan,
        }
    }

    pub fn king(self) -> PieceKind {
        match self {
            Side::Red => PieceKind::RedKing,
            Side::Black => PieceKind::BlackKing,
        }
    }

    /// Row a man of this side is crowned on.
    pub fn back_rank(self) -> u8 {
        match self {
            Side::Red => 0,
            Side::Black => BOARD_SIZE - 1,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Red" | "red" => Some(Side::Red),
            "Black" | "black" => Some(Side::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => f.write_str("Red"),
            Side::Black => f.write_str("Black"),
        }
    }
}

/// Occupant of a square. Serialized with the names the browser save uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    #[serde(rename = "red")]
    RedMan,
    #[serde(rename = "redKing")]
    RedKing,
    #[serde(rename = "black")]
    BlackMan,
    #[serde(rename = "blackKing")]
    BlackKing,
}

impl PieceKind {
    pub fn side(self) -> Side {
        match self {
            PieceKind::RedMan | PieceKind::RedKing => Side::Red,
            PieceKind::BlackMan | PieceKind::BlackKing => Side::Black,
        }
    }

    pub fn is_king(self) -> bool {
        matches!(self, PieceKind::RedKing | PieceKind::BlackKing)
    }

    pub fn is_enemy_of(self, other: PieceKind) -> bool {
        self.side() != other.side()
    }

    /// The king of the same side.
    pub fn promoted(self) -> PieceKind {
        self.side().king()
    }
}

/// A single square of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: u8,
    pub col: u8,
    pub checker_type: Option<PieceKind>,
}

impl Cell {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// One turn for one piece: a step, a jump, or a whole jump chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    /// Jumped squares in the order they were taken.
    #[serde(default)]
    pub captured: Vec<Position>,
}

impl Move {
    pub fn step(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            captured: Vec::new(),
        }
    }

    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }
}

/// Public game state handed to the host and persisted by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    /// Contract:
    /// - Highlight cache for the piece the user last touched.
    /// - Replaced by every query and cleared by reset; never part of game history.
    #[serde(default)]
    pub possible_moves: Vec<Move>,
}

impl GameState {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            possible_moves: Vec::new(),
        }
    }
}
