use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::board::Board;
use crate::game::MoveSelector;
use crate::movegen::all_valid_moves;
use crate::types::{Move, Side};

/// Picks one move, drawing only from the captures when there are any.
/// `pick(len)` must return an index below `len`; larger values are clamped.
pub fn choose_preferring_captures(
    moves: Vec<Move>,
    pick: impl FnOnce(usize) -> usize,
) -> Option<Move> {
    let (captures, quiet): (Vec<Move>, Vec<Move>) = moves.into_iter().partition(Move::is_capture);
    let mut pool = if captures.is_empty() { quiet } else { captures };
    if pool.is_empty() {
        return None;
    }
    let idx = pick(pool.len()).min(pool.len() - 1);
    Some(pool.swap_remove(idx))
}

/// Automated opponent: uniform choice among captures, otherwise among steps.
#[derive(Debug, Clone)]
pub struct RandomMoveSelector<R: Rng + Send = SmallRng> {
    rng: R,
}

impl<R: Rng + Send> RandomMoveSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomMoveSelector<SmallRng> {
    /// Seeds from the wall clock, which is available in the browser as well.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl Default for RandomMoveSelector<SmallRng> {
    fn default() -> Self {
        Self::from_clock()
    }
}

impl<R: Rng + Send> MoveSelector for RandomMoveSelector<R> {
    fn select_move(&mut self, board: &Board, side: Side) -> Option<Move> {
        let rng = &mut self.rng;
        choose_preferring_captures(all_valid_moves(board, side), |len| rng.gen_range(0..len))
    }
}
