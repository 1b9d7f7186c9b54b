//! The invalidity suite (§4.3): five pure predicates that classify a state
//! as provably unsolvable. False positives here would silently prune away
//! real solutions, so each predicate only returns `true` when no sequence
//! of well-formed moves can possibly reach a solved board.
//!
//! The teacher's `PosHandler` trait is a pluggable, stateless classification
//! step invoked once per generated position; per the "Thread-safe
//! singletons of predicates" design note (§9), these predicates need no
//! object identity at all and collapse to plain module-level functions
//! dispatched from a fixed, ordered slice.

use crate::board::Board;
use crate::state::BoardState;

/// Identifies which predicate fired, for the optional per-predicate
/// statistics (§4.4, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    BlockedSwap,
    StuckTiles,
    IsolatedTile,
    Stalemate,
    WrongRowZeroMoves,
}

impl Predicate {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BlockedSwap => "BlockedSwap",
            Self::StuckTiles => "StuckTiles",
            Self::IsolatedTile => "IsolatedTile",
            Self::Stalemate => "Stalemate",
            Self::WrongRowZeroMoves => "WrongRowZeroMoves",
        }
    }
}

/// Evaluates the suite in the documented fastest-first order and returns
/// the first predicate that fires, or `None` if the state passes all five.
#[must_use]
pub fn classify(state: &BoardState) -> Option<Predicate> {
    let rows = state.affected_rows();
    if blocked_swap(state, &rows) {
        return Some(Predicate::BlockedSwap);
    }
    if stuck_tiles(state, &rows) {
        return Some(Predicate::StuckTiles);
    }
    if isolated_tile(state, &rows) {
        return Some(Predicate::IsolatedTile);
    }
    if stalemate(state) {
        return Some(Predicate::Stalemate);
    }
    if wrong_row_zero_moves(state, &rows) {
        return Some(Predicate::WrongRowZeroMoves);
    }
    None
}

/// 1. BlockedSwap (§4.3).
///
/// Scoped to the endpoints of `last_move` (or the whole board initially):
/// a tile one move from home must have a swappable blocker waiting at its
/// destination; a tile with no moves left must not be sitting on a column
/// another tile needs in order to come home.
fn blocked_swap(state: &BoardState, affected_rows: &[usize]) -> bool {
    let board = &state.board;
    for &r in affected_rows {
        for c in 0..board.cols() {
            let t = board.get(r, c);
            // Blocked side.
            if t.remaining == 1 && !t.is_home(r) {
                let blocker = board.get(t.color as usize, c);
                if !blocker.is_eligible() {
                    return true;
                }
            }
            // Blocking side.
            if t.remaining == 0 {
                for (r2, t2) in board.column(c).enumerate() {
                    if r2 != r && t2.remaining == 1 && t2.color as usize == r {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// 2. StuckTiles / parity (§4.3). Row-local variant (§9 Open Question:
/// "If in doubt, implement the row-local variant").
///
/// Once every tile in a row is color-aligned, that row can only finish by
/// swapping tiles within itself; each intra-row swap reduces the row's
/// total `remaining` by exactly 2, so an odd row total can never reach 0.
fn stuck_tiles(state: &BoardState, affected_rows: &[usize]) -> bool {
    let board = &state.board;
    for &r in affected_rows {
        let row = board.row(r);
        let all_home = row.iter().all(|t| t.is_home(r));
        let all_small = row.iter().all(|t| t.remaining <= 2);
        if all_home && all_small {
            let total: u32 = row.iter().map(|t| u32::from(t.remaining)).sum();
            if total % 2 == 1 {
                return true;
            }
        }
    }
    false
}

/// 3. IsolatedTile (§4.3).
///
/// A tile with budget left but no eligible partner anywhere in its row or
/// column has no possible move at all.
fn isolated_tile(state: &BoardState, affected_rows: &[usize]) -> bool {
    let board = &state.board;
    for &r in affected_rows {
        for c in 0..board.cols() {
            let t = board.get(r, c);
            if t.remaining == 0 {
                continue;
            }
            let row_partner = board
                .row(r)
                .iter()
                .enumerate()
                .any(|(c2, t2)| c2 != c && t2.is_eligible());
            let col_partner = board
                .column(c)
                .enumerate()
                .any(|(r2, t2)| r2 != r && t2.is_eligible());
            if !row_partner && !col_partner {
                return true;
            }
        }
    }
    false
}

/// 4. Stalemate / global (§4.3).
///
/// If no row and no column has at least two eligible tiles, no move of any
/// kind remains possible anywhere on the board.
fn stalemate(state: &BoardState) -> bool {
    if state.is_solved() {
        return false;
    }
    let board = &state.board;
    let any_row_movable = (0..board.rows())
        .any(|r| board.row(r).iter().filter(|t| t.is_eligible()).count() >= 2);
    if any_row_movable {
        return false;
    }
    let any_col_movable =
        (0..board.cols()).any(|c| board.column(c).filter(|t| t.is_eligible()).count() >= 2);
    !any_col_movable
}

/// 5. WrongRowZeroMoves (§4.3).
///
/// A tile with no budget left that isn't already home can never be moved
/// there.
fn wrong_row_zero_moves(state: &BoardState, affected_rows: &[usize]) -> bool {
    let board = &state.board;
    for &r in affected_rows {
        for t in board.row(r) {
            if t.remaining == 0 && !t.is_home(r) {
                return true;
            }
        }
    }
    false
}

/// Exposed for tests and for the exhaustive reference-solver property check
/// (§8 property 4): runs every predicate against the whole board regardless
/// of `last_move`, as the initial-state fallback does.
#[must_use]
pub fn classify_whole_board(board: &Board) -> Option<Predicate> {
    let state = BoardState::initial(board.clone());
    classify(&state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    #[test]
    fn parity_deadlock_is_detected(
        // Row A is all color A with remaining (1,1,1,0): sum=3, odd (§8).
    ) {
        let board = Board::new(
            1,
            4,
            vec![Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 0)],
        );
        assert_eq!(classify_whole_board(&board), Some(Predicate::StuckTiles));
    }

    #[test]
    fn blocked_swap_is_detected_on_both_sides(
        // Tile A1=color-1/1 (needs row 1), tile B1=color-0/0 (blocker) (§8).
    ) {
        let board = Board::new(
            2,
            1,
            vec![Tile::new(1, 1), Tile::new(0, 0)],
        );
        assert_eq!(classify_whole_board(&board), Some(Predicate::BlockedSwap));
    }

    #[test]
    fn solved_board_is_never_invalid() {
        let board = Board::new(2, 2, vec![
            Tile::new(0, 0), Tile::new(0, 0),
            Tile::new(1, 0), Tile::new(1, 0),
        ]);
        assert_eq!(classify_whole_board(&board), None);
    }

    #[test]
    fn isolated_tile_with_no_partner_is_detected(
        // The only tile with budget left is already home but has no
        // eligible partner in its row or column, so it can never spend
        // that budget.
    ) {
        let board = Board::new(
            2,
            2,
            vec![
                Tile::new(0, 2),
                Tile::new(1, 0),
                Tile::new(0, 0),
                Tile::new(1, 0),
            ],
        );
        assert_eq!(classify_whole_board(&board), Some(Predicate::IsolatedTile));
    }

    #[test]
    fn stalemate_fires_when_no_tile_has_any_remaining_budget_left(
        // Two tiles permanently misplaced, all budgets already spent: no
        // row/column has even one eligible tile, let alone two, so no move
        // of any kind remains (§4.3 Stalemate).
    ) {
        let board = Board::new(
            2,
            2,
            vec![
                Tile::new(1, 0),
                Tile::new(0, 0),
                Tile::new(0, 0),
                Tile::new(1, 0),
            ],
        );
        assert_eq!(classify_whole_board(&board), Some(Predicate::Stalemate));
    }
}
