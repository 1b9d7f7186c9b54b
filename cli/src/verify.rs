use std::path::PathBuf;

use clap::Args;
use log::{error, info};

use tilematch::{parse_move_notation, parse_puzzle};

/// Replays a `.solution.txt` file against its puzzle and confirms every
/// intermediate board was reached via an eligible move, ending solved.
#[derive(Args, Debug)]
pub struct Verify {
    #[arg(help = "path to the puzzle file")]
    puzzle: PathBuf,
    #[arg(help = "path to the .solution.txt file; defaults to <puzzle>.solution.txt")]
    solution: Option<PathBuf>,
}

impl Verify {
    pub fn run(self) -> i32 {
        let solution_path = self
            .solution
            .unwrap_or_else(|| tilematch::solution_path(&self.puzzle));

        let puzzle_text = match std::fs::read_to_string(&self.puzzle) {
            Ok(t) => t,
            Err(e) => {
                error!("failed to read {}: {e}", self.puzzle.display());
                return 1;
            }
        };
        let state = match parse_puzzle(&puzzle_text) {
            Ok(p) => p.state,
            Err(e) => {
                error!("failed to parse {}: {e}", self.puzzle.display());
                return 1;
            }
        };

        let solution_text = match std::fs::read_to_string(&solution_path) {
            Ok(t) => t,
            Err(e) => {
                error!("failed to read {}: {e}", solution_path.display());
                return 1;
            }
        };

        let mut board = state.board;
        let mut applied = 0;
        for line in solution_text.lines() {
            let Some(m) = parse_move_notation(line.trim()) else {
                continue;
            };
            if !m.is_well_formed() || !m.in_bounds(board.rows(), board.cols()) {
                error!("move {m} at step {applied} is not well-formed or out of bounds");
                return 1;
            }
            let (t1, t2) = (board.get(m.r1, m.c1), board.get(m.r2, m.c2));
            if !t1.is_eligible() || !t2.is_eligible() {
                error!("move {m} at step {applied} touches a spent tile: {t1:?}, {t2:?}");
                return 1;
            }
            board = board.swap(m);
            applied += 1;
        }

        if board.is_solved() {
            info!("verified {applied} move(s); final board is solved");
            0
        } else {
            error!("replayed {applied} move(s) but the final board is not solved");
            1
        }
    }
}
