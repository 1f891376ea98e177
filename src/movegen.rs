use log::trace;

use crate::board::Board;
use crate::types::{GameState, Move, PieceKind, Position, Side};

const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const RED_FORWARD: [(i8, i8); 2] = [(-1, -1), (-1, 1)];
const BLACK_FORWARD: [(i8, i8); 2] = [(1, -1), (1, 1)];

fn directions(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::RedMan => &RED_FORWARD,
        PieceKind::BlackMan => &BLACK_FORWARD,
        PieceKind::RedKing | PieceKind::BlackKing => &DIAGONALS,
    }
}

/// Destinations to highlight for the piece on `pos` before it is dropped.
///
/// Looser than [`valid_moves`]: a man gets its forward steps and forward
/// single jumps, a king slides until anything blocks it and never captures.
pub fn advisory_moves(board: &Board, pos: Position) -> Vec<Move> {
    match board.get(pos) {
        None => Vec::new(),
        Some(kind) if kind.is_king() => king_slides(board, pos),
        Some(kind) => man_steps_and_jumps(board, pos, kind),
    }
}

fn man_steps_and_jumps(board: &Board, pos: Position, kind: PieceKind) -> Vec<Move> {
    let mut moves = Vec::new();
    for &(dr, dc) in directions(kind) {
        let Some(step) = pos.offset(dr, dc) else {
            continue;
        };
        match board.get(step) {
            None => moves.push(Move::step(pos, step)),
            Some(other) if other.is_enemy_of(kind) => {
                if let Some(landing) = step.offset(dr, dc)
                    && board.get(landing).is_none()
                {
                    moves.push(Move {
                        from: pos,
                        to: landing,
                        captured: vec![step],
                    });
                }
            }
            Some(_) => {}
        }
    }
    moves
}

fn king_slides(board: &Board, pos: Position) -> Vec<Move> {
    let mut moves = Vec::new();
    for (dr, dc) in DIAGONALS {
        let mut cursor = pos.offset(dr, dc);
        while let Some(target) = cursor {
            if board.get(target).is_some() {
                break;
            }
            moves.push(Move::step(pos, target));
            cursor = target.offset(dr, dc);
        }
    }
    moves
}

/// A partially explored jump chain. Each frame owns the board as it looks
/// after the jumps taken so far.
struct Chain {
    board: Board,
    at: Position,
    captured: Vec<Position>,
    landings: Vec<Position>,
}

enum Work {
    Found(Move),
    Extend(Chain),
}

/// Authoritative moves for the piece on `pos`.
///
/// Single steps are only offered when no jump has been taken; jump chains are
/// followed until they cannot continue and reported as one move from `pos` to
/// the last landing square. A chain never lands twice on the same square.
pub fn valid_moves(board: &Board, pos: Position) -> Vec<Move> {
    let Some(kind) = board.get(pos) else {
        return Vec::new();
    };

    let root = Chain {
        board: *board,
        at: pos,
        captured: Vec::new(),
        landings: Vec::new(),
    };

    let mut stack = Vec::new();
    for &(dr, dc) in directions(kind).iter().rev() {
        let Some(step) = pos.offset(dr, dc) else {
            continue;
        };
        if board.get(step).is_none() {
            stack.push(Work::Found(Move::step(pos, step)));
        } else if let Some(next) = jump(&root, kind, dr, dc) {
            stack.push(Work::Extend(next));
        }
    }

    let mut moves = Vec::new();
    while let Some(work) = stack.pop() {
        let chain = match work {
            Work::Found(mv) => {
                moves.push(mv);
                continue;
            }
            Work::Extend(chain) => chain,
        };

        let continuations = continue_chain(&chain);
        if continuations.is_empty() {
            trace!(
                "chain {} -> {} ends after {} capture(s)",
                pos,
                chain.at,
                chain.captured.len()
            );
            moves.push(Move {
                from: pos,
                to: chain.at,
                captured: chain.captured,
            });
        } else {
            stack.extend(continuations.into_iter().rev().map(Work::Extend));
        }
    }
    moves
}

fn continue_chain(chain: &Chain) -> Vec<Chain> {
    let Some(kind) = chain.board.get(chain.at) else {
        return Vec::new();
    };
    directions(kind)
        .iter()
        .filter_map(|&(dr, dc)| jump(chain, kind, dr, dc))
        .collect()
}

/// Takes the enemy next to `chain.at` in direction `(dr, dc)` if the square
/// behind it is free and unused by this chain.
fn jump(chain: &Chain, kind: PieceKind, dr: i8, dc: i8) -> Option<Chain> {
    let over = chain.at.offset(dr, dc)?;
    let victim = chain.board.get(over)?;
    if !victim.is_enemy_of(kind) {
        return None;
    }
    let landing = over.offset(dr, dc)?;
    if chain.board.get(landing).is_some() || chain.landings.contains(&landing) {
        return None;
    }

    let mut captured = chain.captured.clone();
    captured.push(over);
    let mut landings = chain.landings.clone();
    landings.push(landing);

    Some(Chain {
        board: chain.board.apply_move(chain.at, landing, &[over]),
        at: landing,
        captured,
        landings,
    })
}

/// All authoritative moves for `side`, scanning its men and kings row by row.
pub fn all_valid_moves(board: &Board, side: Side) -> Vec<Move> {
    board
        .iter_pieces()
        .filter(|(_, kind)| kind.side() == side)
        .flat_map(|(pos, _)| valid_moves(board, pos))
        .collect()
}

/// True when a cached possible move ends on `pos`.
pub fn is_highlighted(state: &GameState, pos: Position) -> bool {
    state.possible_moves.iter().any(|mv| mv.to == pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn board_with(pieces: &[(u8, u8, PieceKind)]) -> Board {
        let mut board = Board::empty();
        for &(row, col, kind) in pieces {
            board.set(pos(row, col), Some(kind));
        }
        board
    }

    fn destinations(moves: &[Move]) -> Vec<Position> {
        let mut out: Vec<Position> = moves.iter().map(|mv| mv.to).collect();
        out.sort_by_key(|p| (p.row, p.col));
        out
    }

    #[test]
    fn empty_square_has_no_moves() {
        let board = Board::create(Side::Red);

        assert!(valid_moves(&board, pos(3, 2)).is_empty());
        assert!(advisory_moves(&board, pos(3, 2)).is_empty());
    }

    #[test]
    fn off_board_origin_has_no_moves() {
        let board = Board::create(Side::Red);

        assert!(valid_moves(&board, pos(9, 9)).is_empty());
        assert!(advisory_moves(&board, pos(9, 9)).is_empty());
        assert!(valid_moves(&board, pos(5, 8)).is_empty());
    }

    #[test]
    fn men_step_forward_only() {
        let board = board_with(&[(5, 2, PieceKind::RedMan), (2, 3, PieceKind::BlackMan)]);

        let red = valid_moves(&board, pos(5, 2));
        let black = valid_moves(&board, pos(2, 3));

        assert_eq!(destinations(&red), vec![pos(4, 1), pos(4, 3)]);
        assert_eq!(destinations(&black), vec![pos(3, 2), pos(3, 4)]);
    }

    #[test]
    fn opening_position_red_has_seven_steps() {
        let board = Board::create(Side::Red);

        let moves = all_valid_moves(&board, Side::Red);

        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|mv| !mv.is_capture() && mv.from.row == 5));
    }

    #[test]
    fn single_jump_is_generated_and_removes_only_the_jumped_piece() {
        let board = board_with(&[
            (4, 3, PieceKind::RedMan),
            (3, 4, PieceKind::BlackMan),
            (1, 0, PieceKind::BlackMan),
        ]);

        let moves = valid_moves(&board, pos(4, 3));
        let jump = moves
            .iter()
            .find(|mv| mv.is_capture())
            .expect("capture available");

        assert_eq!(jump.to, pos(2, 5));
        assert_eq!(jump.captured, vec![pos(3, 4)]);

        let next = board.apply_move(jump.from, jump.to, &jump.captured);
        assert_eq!(next.get(pos(3, 4)), None);
        assert_eq!(next.get(pos(1, 0)), Some(PieceKind::BlackMan));
        assert_eq!(next.get(pos(2, 5)), Some(PieceKind::RedMan));
        assert_eq!(next.count(), (1, 1));
    }

    #[test]
    fn double_jump_is_reported_as_one_chain() {
        let board = board_with(&[
            (5, 2, PieceKind::RedMan),
            (4, 3, PieceKind::BlackMan),
            (2, 5, PieceKind::BlackMan),
        ]);

        let moves = valid_moves(&board, pos(5, 2));
        let captures: Vec<&Move> = moves.iter().filter(|mv| mv.is_capture()).collect();

        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].from, pos(5, 2));
        assert_eq!(captures[0].to, pos(1, 6));
        assert_eq!(captures[0].captured, vec![pos(4, 3), pos(2, 5)]);
        assert!(moves.iter().all(|mv| mv.to != pos(3, 4)));
    }

    #[test]
    fn branching_chain_reports_every_leaf() {
        // After the first jump to (3, 4) the chain can go left over (2, 3) or right over (2, 5).
        let board = board_with(&[
            (5, 2, PieceKind::RedMan),
            (4, 3, PieceKind::BlackMan),
            (2, 3, PieceKind::BlackMan),
            (2, 5, PieceKind::BlackMan),
        ]);

        let moves = valid_moves(&board, pos(5, 2));
        let mut chains: Vec<(Position, Vec<Position>)> = moves
            .into_iter()
            .filter(|mv| mv.is_capture())
            .map(|mv| (mv.to, mv.captured))
            .collect();
        chains.sort_by_key(|(to, _)| (to.row, to.col));

        assert_eq!(
            chains,
            vec![
                (pos(1, 2), vec![pos(4, 3), pos(2, 3)]),
                (pos(1, 6), vec![pos(4, 3), pos(2, 5)]),
            ]
        );
    }

    #[test]
    fn no_simple_steps_after_a_jump() {
        let board = board_with(&[(5, 2, PieceKind::RedMan), (4, 3, PieceKind::BlackMan)]);

        let moves = valid_moves(&board, pos(5, 2));

        assert_eq!(destinations(&moves), vec![pos(3, 4), pos(4, 1)]);
    }

    #[test]
    fn capture_off_the_board_is_discarded() {
        let board = board_with(&[(2, 1, PieceKind::RedMan), (1, 0, PieceKind::BlackMan)]);

        let moves = valid_moves(&board, pos(2, 1));

        assert_eq!(destinations(&moves), vec![pos(1, 2)]);
    }

    #[test]
    fn friendly_pieces_block_and_are_never_jumped() {
        let board = board_with(&[
            (5, 2, PieceKind::RedMan),
            (4, 1, PieceKind::RedMan),
            (4, 3, PieceKind::RedKing),
        ]);

        assert!(valid_moves(&board, pos(5, 2)).is_empty());
        assert!(advisory_moves(&board, pos(5, 2)).is_empty());
    }

    #[test]
    fn king_steps_one_square_in_every_direction() {
        let board = board_with(&[(4, 3, PieceKind::BlackKing)]);

        let moves = valid_moves(&board, pos(4, 3));

        assert_eq!(
            destinations(&moves),
            vec![pos(3, 2), pos(3, 4), pos(5, 2), pos(5, 4)]
        );
    }

    #[test]
    fn king_captures_backwards() {
        let board = board_with(&[(3, 2, PieceKind::RedKing), (4, 3, PieceKind::BlackMan)]);

        let moves = valid_moves(&board, pos(3, 2));
        let capture = moves.iter().find(|mv| mv.is_capture()).expect("capture");

        assert_eq!(capture.to, pos(5, 4));
        assert_eq!(capture.captured, vec![pos(4, 3)]);
    }

    #[test]
    fn king_chain_cannot_reland_on_a_used_square() {
        // Entering (5, 3) over (6, 2) opens a loop of four jumps that would land on (5, 3) again.
        let board = board_with(&[
            (7, 1, PieceKind::RedKing),
            (6, 2, PieceKind::BlackMan),
            (4, 4, PieceKind::BlackMan),
            (2, 4, PieceKind::BlackMan),
            (2, 2, PieceKind::BlackMan),
            (4, 2, PieceKind::BlackMan),
        ]);

        let moves = valid_moves(&board, pos(7, 1));
        let mut chains: Vec<(Position, Vec<Position>)> = moves
            .into_iter()
            .filter(|mv| mv.is_capture())
            .map(|mv| (mv.to, mv.captured))
            .collect();
        chains.sort_by_key(|(to, _)| (to.row, to.col));

        assert_eq!(
            chains,
            vec![
                (pos(3, 1), vec![pos(6, 2), pos(4, 4), pos(2, 4), pos(2, 2)]),
                (pos(3, 5), vec![pos(6, 2), pos(4, 2), pos(2, 2), pos(2, 4)]),
            ]
        );
    }

    #[test]
    fn chain_may_finish_on_its_own_origin() {
        let board = board_with(&[
            (5, 3, PieceKind::BlackKing),
            (4, 4, PieceKind::RedMan),
            (2, 4, PieceKind::RedMan),
            (2, 2, PieceKind::RedMan),
            (4, 2, PieceKind::RedMan),
        ]);

        let moves = valid_moves(&board, pos(5, 3));
        let full_loop = moves
            .iter()
            .find(|mv| mv.captured.len() == 4)
            .expect("four-jump loop");

        assert_eq!(full_loop.to, pos(5, 3));
        let next = board.apply_move(full_loop.from, full_loop.to, &full_loop.captured);
        assert_eq!(next.get(pos(5, 3)), Some(PieceKind::BlackKing));
        assert_eq!(next.count(), (0, 1));
    }

    #[test]
    fn man_crowned_mid_chain_continues_as_king() {
        // (2, 5) jumps onto row 0, is crowned, then jumps back down over (1, 2).
        let board = board_with(&[
            (2, 5, PieceKind::RedMan),
            (1, 4, PieceKind::BlackMan),
            (1, 2, PieceKind::BlackMan),
        ]);

        let moves = valid_moves(&board, pos(2, 5));
        let captures: Vec<&Move> = moves.iter().filter(|mv| mv.is_capture()).collect();

        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].to, pos(2, 1));
        assert_eq!(captures[0].captured, vec![pos(1, 4), pos(1, 2)]);
        assert!(moves.iter().all(|mv| mv.to != pos(0, 3)));
    }

    #[test]
    fn advisory_man_shows_forward_steps_and_jump() {
        let board = board_with(&[(5, 2, PieceKind::RedMan), (4, 3, PieceKind::BlackMan)]);

        let moves = advisory_moves(&board, pos(5, 2));

        assert_eq!(destinations(&moves), vec![pos(3, 4), pos(4, 1)]);
    }

    #[test]
    fn advisory_king_slides_until_blocked_without_capturing() {
        let board = board_with(&[
            (4, 3, PieceKind::RedKing),
            (2, 1, PieceKind::BlackMan),
            (6, 5, PieceKind::RedMan),
        ]);

        let moves = advisory_moves(&board, pos(4, 3));

        assert!(moves.iter().all(|mv| !mv.is_capture()));
        assert_eq!(
            destinations(&moves),
            vec![
                pos(0, 7),
                pos(1, 6),
                pos(2, 5),
                pos(3, 2),
                pos(3, 4),
                pos(5, 2),
                pos(5, 4),
                pos(6, 1),
                pos(7, 0),
            ]
        );
    }

    #[test]
    fn highlight_matches_cached_destinations() {
        let board = Board::create(Side::Red);
        let mut state = GameState::new(board);
        state.possible_moves = advisory_moves(&board, pos(5, 2));

        assert!(is_highlighted(&state, pos(4, 1)));
        assert!(is_highlighted(&state, pos(4, 3)));
        assert!(!is_highlighted(&state, pos(5, 2)));
    }
}
