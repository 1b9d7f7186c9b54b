//! The puzzle generator (§6, "Puzzle generator"): reverse-scrambles a solved
//! board into a puzzle, for fixtures and the `generate` CLI subcommand.
//!
//! Grounded on `cli/src/generate.rs`'s `Generate` subcommand shape (build a
//! structure, then hand it to the caller to write out and log); this module
//! owns only the scrambling algorithm, leaving file writing to the CLI layer
//! the way the teacher's `Generate::run` leaves encoding to `EncoderDecoder`.

use crate::board::{Board, Move};
use crate::tile::Tile;

/// A small xorshift PRNG seeded from a plain `u64`, avoiding a `rand`
/// dependency the teacher doesn't carry (mirrors the load-balancing RNG in
/// [`crate::frontier::Frontier`]).
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}

/// Builds the solved board of shape `rows x cols`: every tile in row r has
/// color r and `remaining == 0`.
#[must_use]
pub fn solved_board(rows: usize, cols: usize) -> Board {
    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for _ in 0..cols {
            cells.push(Tile::new(r as u16, 0));
        }
    }
    Board::new(rows, cols, cells)
}

/// Reverse-scrambles a solved `rows x cols` board by repeatedly picking a
/// random same-row or same-column pair and swapping it with its `remaining`
/// *incremented* instead of decremented — the exact inverse of
/// [`Board::swap`] (§3). After `moves` steps, the returned board requires at
/// least `moves` forward moves to re-solve (a scramble step can "undo" a
/// previous one, so the true distance may be shorter; this matches how any
/// reverse-scrambling generator produces puzzles, not a shortest-path
/// guarantee).
#[must_use]
pub fn scramble(rows: usize, cols: usize, moves: usize, seed: u64) -> Board {
    let mut board = solved_board(rows, cols);
    let mut rng = Rng::new(seed);
    let mut applied = 0;
    // A generous cap on retries per step guards against pathological R x C
    // shapes (e.g. 1x1) where no pair ever exists; such shapes simply yield
    // fewer scramble steps than requested.
    let mut retries_left = moves.saturating_mul(64).max(64);

    while applied < moves && retries_left > 0 {
        retries_left -= 1;
        let Some(m) = random_pair(rows, cols, &mut rng) else {
            break;
        };
        board = reverse_swap(&board, m);
        applied += 1;
    }
    board
}

/// Picks a uniformly random same-row or same-column pair of distinct
/// positions, or `None` if the board is 1x1.
fn random_pair(rows: usize, cols: usize, rng: &mut Rng) -> Option<Move> {
    if rows * cols < 2 {
        return None;
    }
    loop {
        let horizontal = if cols < 2 {
            false
        } else if rows < 2 {
            true
        } else {
            rng.below(2) == 0
        };
        if horizontal {
            let r = rng.below(rows);
            let c1 = rng.below(cols);
            let c2 = rng.below(cols);
            if c1 == c2 {
                continue;
            }
            let (c1, c2) = (c1.min(c2), c1.max(c2));
            return Some(Move::new(r, c1, r, c2));
        } else if rows >= 2 {
            let c = rng.below(cols);
            let r1 = rng.below(rows);
            let r2 = rng.below(rows);
            if r1 == r2 {
                continue;
            }
            let (r1, r2) = (r1.min(r2), r1.max(r2));
            return Some(Move::new(r1, c, r2, c));
        }
    }
}

/// The spatial inverse of [`Board::swap`]: exchanges the two tiles and
/// *increments* each one's `remaining` instead of decrementing it.
fn reverse_swap(board: &Board, m: Move) -> Board {
    let t1 = board.get(m.r1, m.c1);
    let t2 = board.get(m.r2, m.c2);
    let mut cells: Vec<Tile> = (0..board.rows())
        .flat_map(|r| board.row(r).iter().copied())
        .collect();
    let idx = |r: usize, c: usize| r * board.cols() + c;
    cells[idx(m.r1, m.c1)] = Tile::new(t2.color, t2.remaining + 1);
    cells[idx(m.r2, m.c2)] = Tile::new(t1.color, t1.remaining + 1);
    Board::new(board.rows(), board.cols(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solved_board_reports_solved() {
        let b = solved_board(3, 3);
        assert!(b.is_solved());
    }

    #[test]
    fn scramble_is_deterministic_for_a_fixed_seed() {
        let a = scramble(3, 3, 9, 42);
        let b = scramble(3, 3, 9, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_scramble_differently() {
        let a = scramble(3, 3, 9, 1);
        let b = scramble(3, 3, 9, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn scrambled_board_carries_nonzero_remaining_budget() {
        let b = scramble(3, 3, 9, 7);
        let total: u32 = (0..b.rows())
            .flat_map(|r| b.row(r).iter().map(|t| u32::from(t.remaining)))
            .sum();
        assert!(total > 0);
        assert!(!b.is_solved());
    }

    #[test]
    fn scramble_on_a_single_cell_board_is_a_no_op() {
        let b = scramble(1, 1, 5, 1);
        assert!(b.is_solved());
    }
}
