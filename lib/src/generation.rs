//! The move generator (§4.2): produces the filtered successor-move list for
//! a state, including the two perfect-swap short-circuits that force
//! provably optimal endgame swaps.
//!
//! Grounded on the teacher's `Generator`/`PosHandler` split: a struct that
//! owns no state at all here (the policy knob is the only configuration),
//! mirroring the teacher's pattern of a small struct driving a pluggable
//! strategy.

use arrayvec::ArrayVec;

use crate::board::{Board, Move};

/// Move-ordering policy (§4.2 point 6): reorders exploration, never affects
/// reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveOrder {
    #[default]
    None,
    SmallestFirst,
    LargestFirst,
}

/// Bound on how many moves a single call to [`generate_moves`] can return
/// before falling back to heap allocation; chosen generously for boards up
/// to ~16x16. Mirrors the teacher's use of `arrayvec` for small bounded
/// collections produced in a hot loop.
const INLINE_MOVE_CAPACITY: usize = 64;

/// Produces the ordered list of moves to explore from `board` (§4.2).
///
/// Returns a single move when either perfect-swap short-circuit fires
/// (points 2 and 3); otherwise every eligible, last-move-filtered move,
/// ordered per `order`.
#[must_use]
pub fn generate_moves(board: &Board, order: MoveOrder) -> Vec<Move> {
    if let Some(m) = horizontal_perfect_swap(board) {
        return vec![m];
    }
    if let Some(m) = vertical_perfect_swap(board) {
        return vec![m];
    }

    let mut moves: ArrayVec<Move, INLINE_MOVE_CAPACITY> = ArrayVec::new();
    let mut overflow = Vec::new();
    let mut push = |m: Move| {
        if moves.try_push(m).is_err() {
            overflow.push(m);
        }
    };

    for r in 0..board.rows() {
        let row = board.row(r);
        for c1 in 0..row.len() {
            if !row[c1].is_eligible() {
                continue;
            }
            for c2 in (c1 + 1)..row.len() {
                if !row[c2].is_eligible() {
                    continue;
                }
                let m = Move::new(r, c1, r, c2);
                if last_move_filter_ok(board, m) {
                    push(m);
                }
            }
        }
    }
    for c in 0..board.cols() {
        for r1 in 0..board.rows() {
            let t1 = board.get(r1, c);
            if !t1.is_eligible() {
                continue;
            }
            for r2 in (r1 + 1)..board.rows() {
                let t2 = board.get(r2, c);
                if !t2.is_eligible() {
                    continue;
                }
                let m = Move::new(r1, c, r2, c);
                if last_move_filter_ok(board, m) {
                    push(m);
                }
            }
        }
    }

    let mut all: Vec<Move> = moves.into_iter().chain(overflow).collect();
    order_moves(board, &mut all, order);
    all
}

/// Last-move filtering (§4.2 point 4): drop a move that would spend a
/// tile's final unit of budget anywhere but its own target row.
fn last_move_filter_ok(board: &Board, m: Move) -> bool {
    let t1 = board.get(m.r1, m.c1);
    let t2 = board.get(m.r2, m.c2);
    let ok1 = t1.remaining != 1 || m.r2 == t1.color as usize;
    let ok2 = t2.remaining != 1 || m.r1 == t2.color as usize;
    ok1 && ok2
}

/// Horizontal perfect-swap short-circuit (§4.2 point 2).
fn horizontal_perfect_swap(board: &Board) -> Option<Move> {
    'rows: for r in 0..board.rows() {
        let row = board.row(r);
        let mut ones: ArrayVec<usize, INLINE_MOVE_CAPACITY> = ArrayVec::new();
        for (c, t) in row.iter().enumerate() {
            if !t.is_home(r) {
                continue 'rows;
            }
            if !matches!(t.remaining, 0 | 1) {
                continue 'rows;
            }
            if t.remaining == 1 {
                let _ = ones.try_push(c);
            }
        }
        if ones.len() >= 2 && ones.len() % 2 == 0 {
            return Some(Move::new(r, ones[0], r, ones[1]));
        }
    }
    None
}

/// Vertical perfect-swap short-circuit (§4.2 point 3).
fn vertical_perfect_swap(board: &Board) -> Option<Move> {
    for c in 0..board.cols() {
        for r1 in 0..board.rows() {
            let t1 = board.get(r1, c);
            if t1.remaining != 1 {
                continue;
            }
            let r2 = t1.color as usize;
            if r2 <= r1 || r2 >= board.rows() {
                continue;
            }
            let t2 = board.get(r2, c);
            if t2.remaining == 1 && t2.color as usize == r1 {
                return Some(Move::new(r1, c, r2, c));
            }
        }
    }
    None
}

fn order_moves(board: &Board, moves: &mut [Move], order: MoveOrder) {
    let weight = |m: &Move| -> u32 {
        u32::from(board.get(m.r1, m.c1).remaining) + u32::from(board.get(m.r2, m.c2).remaining)
    };
    match order {
        MoveOrder::None => {}
        MoveOrder::SmallestFirst => moves.sort_by_key(weight),
        MoveOrder::LargestFirst => moves.sort_by_key(|m| std::cmp::Reverse(weight(m))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    #[test]
    fn horizontal_perfect_swap_emits_exactly_one_move(
        // Row A already color-aligned, two 1-move tiles, rest at 0 (§8).
    ) {
        let board = Board::new(
            1,
            4,
            vec![Tile::new(0, 1), Tile::new(0, 0), Tile::new(0, 1), Tile::new(0, 0)],
        );
        let moves = generate_moves(&board, MoveOrder::None);
        assert_eq!(moves.len(), 1);
        let after = board.swap(moves[0]);
        assert!(after.row(0).iter().all(|t| t.is_home(0)));
        assert_eq!(
            after.row(0).iter().filter(|t| t.remaining > 0).count(),
            0
        );
    }

    #[test]
    fn vertical_perfect_swap_lands_both_tiles_home() {
        // (0,1): color 1, remaining 1 ; (1,1): color 0, remaining 1.
        let board = Board::new(
            2,
            2,
            vec![
                Tile::new(0, 0),
                Tile::new(1, 1),
                Tile::new(1, 0),
                Tile::new(0, 1),
            ],
        );
        let moves = generate_moves(&board, MoveOrder::None);
        assert_eq!(moves.len(), 1);
        let after = board.swap(moves[0]);
        assert_eq!(after.get(0, 1), Tile::new(0, 0));
        assert_eq!(after.get(1, 1), Tile::new(1, 0));
    }

    #[test]
    fn last_move_filter_drops_moves_wasting_final_budget() {
        // Tile at (0,0) has 1 move left and belongs in row 1; swapping with
        // (0,1) (also row 0) would waste it, so this move must be dropped.
        let board = Board::new(
            2,
            2,
            vec![
                Tile::new(1, 1),
                Tile::new(0, 5),
                Tile::new(0, 5),
                Tile::new(1, 5),
            ],
        );
        let moves = generate_moves(&board, MoveOrder::None);
        assert!(!moves.contains(&Move::new(0, 0, 0, 1)));
    }

    #[test]
    fn duplicate_pairs_are_not_generated_twice() {
        let board = Board::new(1, 3, vec![Tile::new(0, 3), Tile::new(0, 3), Tile::new(0, 3)]);
        let moves = generate_moves(&board, MoveOrder::None);
        let mut seen = std::collections::HashSet::new();
        for m in &moves {
            assert!(seen.insert((m.r1, m.c1, m.r2, m.c2)));
            assert!(m.c1 < m.c2 || m.r1 < m.r2);
        }
    }

    #[test]
    fn smallest_first_orders_by_ascending_tile_weight() {
        let board = Board::new(1, 3, vec![Tile::new(0, 3), Tile::new(0, 1), Tile::new(0, 2)]);
        let moves = generate_moves(&board, MoveOrder::SmallestFirst);
        let weights: Vec<u32> = moves
            .iter()
            .map(|m| u32::from(board.get(m.r1, m.c1).remaining) + u32::from(board.get(m.r2, m.c2).remaining))
            .collect();
        let mut sorted = weights.clone();
        sorted.sort_unstable();
        assert_eq!(weights, sorted);
    }
}
