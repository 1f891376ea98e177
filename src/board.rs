use serde::{Deserialize, Serialize};

use crate::types::{BOARD_SIZE, Cell, PieceKind, Position, Side};

const N: usize = BOARD_SIZE as usize;

/// Checkers board as an 8x8 grid of cells. Persisted as nested arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; N]; N],
}

impl Board {
    /// Creates a board with no pieces.
    pub fn empty() -> Self {
        Self {
            cells: std::array::from_fn(|row| {
                std::array::from_fn(|col| Cell {
                    row: row as u8,
                    col: col as u8,
                    checker_type: None,
                })
            }),
        }
    }

    /// Creates the opening position:
    /// rows 0-2 hold the opponent of `starting_side`, rows 5-7 hold `starting_side`,
    /// dark squares only.
    pub fn create(starting_side: Side) -> Self {
        let mut board = Self::empty();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let pos = Position::new(row, col);
                if !pos.is_dark() {
                    continue;
                }
                let side = match row {
                    0..=2 => starting_side.opponent(),
                    5..=7 => starting_side,
                    _ => continue,
                };
                board.set(pos, Some(side.man()));
            }
        }
        board
    }

    /// Occupant of `pos`; `None` for empty or off-board squares.
    pub fn get(&self, pos: Position) -> Option<PieceKind> {
        self.cells
            .get(pos.row as usize)
            .and_then(|line| line.get(pos.col as usize))
            .and_then(|cell| cell.checker_type)
    }

    /// Writes the occupant of `pos`. Off-board positions are ignored.
    pub fn set(&mut self, pos: Position, kind: Option<PieceKind>) {
        if let Some(cell) = self
            .cells
            .get_mut(pos.row as usize)
            .and_then(|line| line.get_mut(pos.col as usize))
        {
            cell.checker_type = kind;
        }
    }

    pub fn cells(&self) -> &[[Cell; N]; N] {
        &self.cells
    }

    /// Occupied squares in row-major order.
    pub fn iter_pieces(&self) -> impl Iterator<Item = (Position, PieceKind)> + '_ {
        self.cells
            .iter()
            .flatten()
            .filter_map(|cell| cell.checker_type.map(|kind| (cell.position(), kind)))
    }

    /// Returns `(red_count, black_count)`.
    pub fn count(&self) -> (u8, u8) {
        self.iter_pieces()
            .fold((0, 0), |(red, black), (_, kind)| match kind.side() {
                Side::Red => (red + 1, black),
                Side::Black => (red, black + 1),
            })
    }

    /// Returns a copy with the piece on `from` moved to `to`, every square in
    /// `captured` cleared, and a man on its back rank crowned.
    /// Legality is the caller's concern.
    pub fn apply_move(&self, from: Position, to: Position, captured: &[Position]) -> Board {
        let mut next = *self;
        let mover = next.get(from);
        next.set(to, mover);
        if from != to {
            next.set(from, None);
        }
        for &pos in captured {
            next.set(pos, None);
        }
        next.promote_if_crowned(to);
        next
    }

    /// Crowns a man standing on its back rank. Returns true when it did.
    pub fn promote_if_crowned(&mut self, pos: Position) -> bool {
        match self.get(pos) {
            Some(kind) if !kind.is_king() && pos.row == kind.side().back_rank() => {
                self.set(pos, Some(kind.promoted()));
                true
            }
            _ => false,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::create(Side::default())
    }
}
