//! `Board` and `Move` (§3): the grid and the single allowed transition on it.

use std::fmt;

use crate::error::row_letter;
use crate::tile::Tile;

/// A swap between two tiles in the same row or column (§3).
///
/// `Move` is a plain value type; its only behavior is validating
/// well-formedness and rendering to/from the canonical notation used for
/// serialization (§3, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub r1: usize,
    pub c1: usize,
    pub r2: usize,
    pub c2: usize,
}

impl Move {
    #[must_use]
    pub const fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self { r1, c1, r2, c2 }
    }

    /// A move is well-formed iff it stays within one row or one column and
    /// both endpoints are distinct positions (§3).
    #[must_use]
    pub const fn is_well_formed(self) -> bool {
        (self.r1 == self.r2 || self.c1 == self.c2) && (self.r1 != self.r2 || self.c1 != self.c2)
    }

    #[must_use]
    pub const fn in_bounds(self, rows: usize, cols: usize) -> bool {
        self.r1 < rows && self.r2 < rows && self.c1 < cols && self.c2 < cols
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}{}",
            row_letter(self.r1),
            self.c1 + 1,
            row_letter(self.r2),
            self.c2 + 1
        )
    }
}

/// Parses the canonical `<RowLetter><ColNumber>-<RowLetter><ColNumber>`
/// notation, e.g. `A1-B1`. Returns `None` on any malformed input; the caller
/// (parser or checkpoint loader) decides how to report that.
#[must_use]
pub fn parse_move_notation(s: &str) -> Option<Move> {
    let (from, to) = s.split_once('-')?;
    let (r1, c1) = parse_position_notation(from)?;
    let (r2, c2) = parse_position_notation(to)?;
    Some(Move::new(r1, c1, r2, c2))
}

/// Parses a single `<RowLetter><ColNumber>` position, e.g. `C3` -> `(2, 2)`.
#[must_use]
pub fn parse_position_notation(s: &str) -> Option<(usize, usize)> {
    let letters_end = s.find(|c: char| !c.is_ascii_alphabetic())?;
    if letters_end == 0 {
        return None;
    }
    let (letters, digits) = s.split_at(letters_end);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut row: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_uppercase() {
            return None;
        }
        row = row * 26 + usize::from(b - b'A') + 1;
    }
    let col: usize = digits.parse().ok()?;
    if col == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// A fixed-size R×C grid of tiles (§3).
///
/// Stored as a flat row-major buffer rather than a `Vec<Vec<_>>`: the
/// dominant cost in `swap` is a bulk copy of the grid, and a flat buffer
/// copies with a single `clone_from_slice` instead of one allocation per row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Box<[Tile]>,
}

impl Board {
    #[must_use]
    pub fn new(rows: usize, cols: usize, cells: Vec<Tile>) -> Self {
        assert_eq!(
            cells.len(),
            rows * cols,
            "cell count must equal rows*cols"
        );
        Self {
            rows,
            cols,
            cells: cells.into_boxed_slice(),
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, r: usize, c: usize) -> usize {
        debug_assert!(r < self.rows && c < self.cols, "({r},{c}) out of bounds");
        r * self.cols + c
    }

    #[must_use]
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Tile {
        self.cells[self.index(r, c)]
    }

    /// All tiles in row `r`, in column order.
    #[must_use]
    pub fn row(&self, r: usize) -> &[Tile] {
        &self.cells[r * self.cols..(r + 1) * self.cols]
    }

    /// All tiles in column `c`, in row order.
    pub fn column(&self, c: usize) -> impl Iterator<Item = Tile> + '_ {
        (0..self.rows).map(move |r| self.get(r, c))
    }

    /// Produces a new board with the two positions exchanged, each losing
    /// one unit of `remaining` (§3, §4.1).
    ///
    /// # Panics
    /// Panics (a runtime-invariant violation, §7) if the move is not
    /// well-formed, is out of bounds, or either endpoint is ineligible.
    #[must_use]
    pub fn swap(&self, m: Move) -> Self {
        assert!(m.is_well_formed(), "ineligible move applied: {m:?}");
        assert!(
            m.in_bounds(self.rows, self.cols),
            "move out of bounds: {m:?}"
        );
        let t1 = self.get(m.r1, m.c1);
        let t2 = self.get(m.r2, m.c2);
        assert!(
            t1.is_eligible() && t2.is_eligible(),
            "swap endpoints must both have remaining >= 1: {t1:?} {t2:?}"
        );
        let mut cells = self.cells.clone();
        let i1 = self.index(m.r1, m.c1);
        let i2 = self.index(m.r2, m.c2);
        cells[i1] = t2.decremented();
        cells[i2] = t1.decremented();
        Self {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// A board is solved iff every cell's tile matches its row's target
    /// color and has no remaining budget (§3).
    #[must_use]
    pub fn is_solved(&self) -> bool {
        (0..self.rows).all(|r| {
            self.row(r)
                .iter()
                .all(|t| t.is_home(r) && t.remaining == 0)
        })
    }

    /// Sum of `remaining` across every tile with a color that doesn't match
    /// its current row — an admissible lower bound on moves needed (§4.5).
    #[must_use]
    pub fn score(&self) -> u32 {
        (0..self.rows)
            .flat_map(|r| self.row(r).iter().map(move |t| (r, t)))
            .filter(|(r, t)| !t.is_home(*r))
            .map(|(_, t)| u32::from(t.remaining))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Row 0 is already home and fully spent; row 1 is home-colored but
    /// each tile still owes one move, so the single same-row swap within
    /// row 1 is the horizontal perfect-swap short-circuit scenario (§8).
    fn two_by_two() -> Board {
        Board::new(
            2,
            2,
            vec![
                Tile::new(1, 1),
                Tile::new(1, 1),
                Tile::new(0, 0),
                Tile::new(0, 0),
            ],
        )
    }

    fn solvable_2x2() -> Board {
        Board::new(
            2,
            2,
            vec![
                Tile::new(0, 0),
                Tile::new(0, 0),
                Tile::new(1, 1),
                Tile::new(1, 1),
            ],
        )
    }

    #[test]
    fn swap_decrements_both_endpoints_and_solves_trivial_2x2() {
        let b = solvable_2x2();
        let after = b.swap(Move::new(1, 0, 1, 1));
        assert_eq!(after.get(0, 0), Tile::new(0, 0));
        assert_eq!(after.get(0, 1), Tile::new(0, 0));
        assert_eq!(after.get(1, 0), Tile::new(1, 0));
        assert_eq!(after.get(1, 1), Tile::new(1, 0));
        assert!(after.is_solved());
    }

    #[test]
    fn swap_round_trip_reduces_remaining_by_two_each(
        // property 1 (§8): swap then spatial-inverse swap
    ) {
        let b = Board::new(
            2,
            2,
            vec![
                Tile::new(0, 0),
                Tile::new(1, 2),
                Tile::new(0, 0),
                Tile::new(0, 2),
            ],
        );
        let m = Move::new(0, 1, 1, 1);
        let once = b.swap(m);
        // the spatial inverse of swapping (r1,c1)<->(r2,c2) is the same pair
        let twice = once.swap(m);
        assert_eq!(twice.get(0, 1).color, b.get(0, 1).color);
        assert_eq!(twice.get(1, 1).color, b.get(1, 1).color);
        assert_eq!(twice.get(0, 1).remaining, b.get(0, 1).remaining - 2);
        assert_eq!(twice.get(1, 1).remaining, b.get(1, 1).remaining - 2);
    }

    #[test]
    #[should_panic(expected = "ineligible move applied")]
    fn swap_rejects_malformed_move() {
        two_by_two().swap(Move::new(0, 0, 1, 1));
    }

    #[test]
    fn is_solved_requires_both_color_and_zero_remaining() {
        let b = Board::new(1, 1, vec![Tile::new(0, 0)]);
        assert!(b.is_solved());
        let not_home = Board::new(1, 1, vec![Tile::new(1, 0)]);
        assert!(!not_home.is_solved());
        let not_spent = Board::new(1, 1, vec![Tile::new(0, 1)]);
        assert!(!not_spent.is_solved());
    }

    #[test]
    fn move_notation_round_trips() {
        let m = Move::new(0, 1, 2, 1);
        assert_eq!(m.to_string(), "A2-C2");
        assert_eq!(parse_move_notation("A2-C2"), Some(m));
    }

    #[test]
    fn move_notation_rejects_garbage() {
        assert_eq!(parse_move_notation("A2C2"), None);
        assert_eq!(parse_move_notation("A0-C2"), None);
        assert_eq!(parse_move_notation("1A-C2"), None);
    }

    #[test]
    fn score_counts_only_misplaced_remaining() {
        let b = two_by_two();
        assert_eq!(b.score(), 2); // both B tiles are misplaced, 1 remaining each
    }
}
