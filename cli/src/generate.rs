use std::path::PathBuf;

use clap::Args;
use log::info;

use tilematch::scramble;

#[derive(Args, Debug)]
pub struct Generate {
    #[arg(short, long, help = "number of rows (= number of colors)")]
    rows: usize,
    #[arg(short, long, help = "number of columns")]
    cols: usize,
    #[arg(short, long, default_value_t = 20, help = "number of reverse-scramble steps")]
    moves: usize,
    #[arg(long, default_value_t = 1, help = "scramble RNG seed")]
    seed: u64,
    #[arg(short, long, help = "output puzzle file path")]
    output: PathBuf,
}

impl Generate {
    pub fn run(self) -> i32 {
        let board = scramble(self.rows, self.cols, self.moves, self.seed);
        let text = render_format_a(&board);
        if let Err(e) = std::fs::write(&self.output, text) {
            log::error!("failed to write {}: {e}", self.output.display());
            return 1;
        }
        info!(
            "generated {}x{} puzzle with {} scramble steps to {}",
            self.rows,
            self.cols,
            self.moves,
            self.output.display()
        );
        0
    }
}

/// Renders a board as Format A (§6), the preferred puzzle file grammar.
fn render_format_a(board: &tilematch::Board) -> String {
    let mut out = String::new();
    out.push_str(&format!("ROWS {}\n", board.rows()));
    out.push_str(&format!("COLS {}\n", board.cols()));
    out.push_str("BOARD\n");
    for color in 0..board.rows() {
        let mut line = format!("COLOR{color}");
        for r in 0..board.rows() {
            for c in 0..board.cols() {
                let t = board.get(r, c);
                if usize::from(t.color) == color {
                    line.push(' ');
                    line.push_str(&tilematch::row_letter(r));
                    line.push_str(&(c + 1).to_string());
                    line.push(' ');
                    line.push_str(&t.remaining.to_string());
                }
            }
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
