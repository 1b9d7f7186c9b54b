//! `BoardState` (§3): a node in the search graph.

use std::sync::Arc;

use crate::board::{Board, Move};

/// A node in the search graph: a board, the move and predecessor that
/// produced it, and two cached values (`remaining_moves`, `score`) so the
/// hot loop never recomputes them.
///
/// The `prev` link is an `Arc` rather than a plain reference or owned value:
/// many sibling states share the same history tail (§3, "Ownership model"),
/// and `Arc`'s reference counting releases a tail node automatically once
/// its last child is dropped, with no cycles to worry about.
#[derive(Debug, Clone)]
pub struct BoardState {
    pub board: Board,
    pub last_move: Option<Move>,
    pub prev: Option<Arc<BoardState>>,
    pub remaining_moves: u32,
    pub score: u32,
}

impl BoardState {
    /// Builds the initial state from a freshly parsed board: `remaining_moves`
    /// is computed from scratch as `(sum of tile.remaining) / 2` (§3).
    #[must_use]
    pub fn initial(board: Board) -> Self {
        let total: u32 = (0..board.rows())
            .flat_map(|r| board.row(r).iter())
            .map(|t| u32::from(t.remaining))
            .sum();
        debug_assert_eq!(total % 2, 0, "total remaining budget must be even");
        let score = board.score();
        Self {
            board,
            last_move: None,
            prev: None,
            remaining_moves: total / 2,
            score,
        }
    }

    /// Applies a move, producing a successor state. `remaining_moves` is
    /// derived by subtracting one from the predecessor's value rather than
    /// recomputed from the new board, matching the accounting invariant in
    /// §3/§8 property 2.
    ///
    /// # Panics
    /// Panics if `remaining_moves` is already zero: there is no eligible
    /// move to apply at that point (a runtime invariant violation, §7).
    #[must_use]
    pub fn apply_move(self: &Arc<Self>, m: Move) -> Self {
        assert!(
            self.remaining_moves > 0,
            "apply_move called with remaining_moves == 0"
        );
        let board = self.board.swap(m);
        let score = board.score();
        Self {
            board,
            last_move: Some(m),
            prev: Some(Arc::clone(self)),
            remaining_moves: self.remaining_moves - 1,
            score,
        }
    }

    /// A state is solved iff `remaining_moves == 0` and the board matches
    /// every tile to its row — the `remaining_moves` check is O(1) and is
    /// checked first so the full-board scan only runs when it might matter
    /// (§3).
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.remaining_moves == 0 && self.board.is_solved()
    }

    /// The rows touched by `last_move`, or every row when this is the
    /// initial state (§4.3: "must fall back to a full-board scan on the
    /// initial state").
    #[must_use]
    pub fn affected_rows(&self) -> Vec<usize> {
        match self.last_move {
            None => (0..self.board.rows()).collect(),
            Some(m) if m.r1 == m.r2 => vec![m.r1],
            Some(m) => vec![m.r1, m.r2],
        }
    }

    /// Walks `prev` back to the root and returns the move sequence from
    /// root to `self`, oldest first (used both for solution output and for
    /// checkpoint serialization, §4.7, §4.8).
    #[must_use]
    pub fn move_chain(&self) -> Vec<Move> {
        let mut chain = Vec::new();
        let mut cur = self;
        let mut owned;
        loop {
            if let Some(m) = cur.last_move {
                chain.push(m);
            }
            match &cur.prev {
                Some(p) => {
                    owned = Arc::clone(p);
                    cur = &owned;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }
}
