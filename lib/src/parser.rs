//! The puzzle file parser (§6): reads Format A (`BOARD`) or Format B
//! (`COLORS`/`TARGETS`/`TILES`) into an initial [`BoardState`].
//!
//! Grounded on the teacher's config-file readers (small hand-rolled
//! line-oriented parsers that build a typed error per malformed line rather
//! than panicking), generalized to two accepted grammars sharing one error
//! taxonomy.

use std::collections::HashMap;

use crate::board::{parse_move_notation, parse_position_notation, Board, Move};
use crate::color;
use crate::error::{ParseError, Position};
use crate::state::BoardState;
use crate::tile::Tile;

/// The result of parsing a puzzle file: the initial state, plus the
/// normalized color name declared for each row/color id (§6, "Color
/// naming") for human-facing rendering downstream.
#[derive(Debug, Clone)]
pub struct ParsedPuzzle {
    pub state: BoardState,
    pub color_names: Vec<String>,
}

/// Parses a complete puzzle file (either format) into an initial
/// [`BoardState`], including replaying any trailing `MOVES` block (§6).
pub fn parse(text: &str) -> Result<ParsedPuzzle, ParseError> {
    let lines = strip_comments_and_blanks(text);
    let rows = read_kv_usize(&lines, "ROWS")?;
    let cols = read_kv_usize(&lines, "COLS")?;

    let (board, color_names) = if find_section(&lines, "BOARD").is_some() {
        parse_format_a(&lines, rows, cols)?
    } else if find_section(&lines, "COLORS").is_some() {
        parse_format_b(&lines, rows, cols)?
    } else {
        return Err(ParseError::MissingSection { section: "BOARD/COLORS" });
    };

    let board = apply_moves_section(&lines, board)?;
    Ok(ParsedPuzzle { state: BoardState::initial(board), color_names })
}

struct Line<'a> {
    number: usize,
    text: &'a str,
}

fn strip_comments_and_blanks(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let without_comment = raw.split('#').next().unwrap_or("").trim();
            if without_comment.is_empty() {
                None
            } else {
                Some(Line { number: i + 1, text: without_comment })
            }
        })
        .collect()
}

fn find_section(lines: &[Line], header: &str) -> Option<usize> {
    lines.iter().position(|l| l.text == header)
}

fn read_kv_usize(lines: &[Line], key: &'static str) -> Result<usize, ParseError> {
    let line = lines
        .iter()
        .find(|l| l.text.split_whitespace().next() == Some(key))
        .ok_or(ParseError::MissingSection { section: key })?;
    let mut parts = line.text.split_whitespace();
    parts.next();
    let value: i64 = parts
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ParseError::Malformed {
            line: line.number,
            expected: key,
            found: line.text.to_string(),
        })?;
    if value <= 0 {
        return Err(ParseError::NonPositiveDimensions { rows: value, cols: value });
    }
    Ok(value as usize)
}

/// Format A: `BOARD` followed by one line per row, each listing every tile
/// of that row's target color as `<pos> <moves>` pairs (§6).
fn parse_format_a(lines: &[Line], rows: usize, cols: usize) -> Result<(Board, Vec<String>), ParseError> {
    let start = find_section(lines, "BOARD").expect("checked by caller") + 1;
    let mut cells: Vec<Option<Tile>> = vec![None; rows * cols];
    let mut seen = std::collections::HashSet::new();
    let mut color_names: Vec<String> = Vec::with_capacity(rows);

    for (row, line) in lines[start..].iter().take(rows).enumerate() {
        if line.text == "MOVES" {
            return Err(ParseError::Malformed {
                line: line.number,
                expected: "a BOARD row",
                found: line.text.to_string(),
            });
        }
        let mut tokens = line.text.split_whitespace();
        let color_name = tokens.next().ok_or_else(|| ParseError::Malformed {
            line: line.number,
            expected: "a color name",
            found: line.text.to_string(),
        })?;
        color_names.push(color::normalize(color_name));
        let rest: Vec<&str> = tokens.collect();
        if rest.len() % 2 != 0 {
            return Err(ParseError::Malformed {
                line: line.number,
                expected: "pairs of <pos> <moves>",
                found: line.text.to_string(),
            });
        }
        for pair in rest.chunks(2) {
            let (r, c) = parse_position_notation(pair[0])
                .ok_or_else(|| ParseError::BadPosition(pair[0].to_string()))?;
            if r >= rows || c >= cols {
                return Err(ParseError::BadPosition(pair[0].to_string()));
            }
            let remaining: u8 = pair[1].parse().map_err(|_| ParseError::Malformed {
                line: line.number,
                expected: "a remaining-moves count",
                found: pair[1].to_string(),
            })?;
            let idx = r * cols + c;
            if !seen.insert((r, c)) {
                return Err(ParseError::DuplicatePosition(Position { row: r, col: c }));
            }
            cells[idx] = Some(Tile::new(row as u16, remaining));
        }
    }

    Ok((finish_cells(cells, rows, cols)?, color_names))
}

/// Format B: explicit `COLORS`/`TARGETS`/`TILES` sections (§6, legacy).
fn parse_format_b(lines: &[Line], rows: usize, cols: usize) -> Result<(Board, Vec<String>), ParseError> {
    let colors_start = find_section(lines, "COLORS").expect("checked by caller") + 1;
    let mut name_to_id: HashMap<String, u16> = HashMap::new();
    let mut id_to_name: HashMap<u16, String> = HashMap::new();
    let mut idx = colors_start;
    while idx < lines.len() && !lines[idx].text.starts_with("TARGETS") {
        let line = &lines[idx];
        let mut tokens = line.text.split_whitespace();
        let name = tokens.next().ok_or_else(|| ParseError::Malformed {
            line: line.number,
            expected: "a color name",
            found: line.text.to_string(),
        })?;
        let id: u16 = tokens
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ParseError::Malformed {
                line: line.number,
                expected: "a color id",
                found: line.text.to_string(),
            })?;
        let normalized = color::normalize(name);
        id_to_name.insert(id, normalized.clone());
        name_to_id.insert(normalized, id);
        idx += 1;
    }

    let targets_line = lines
        .get(idx)
        .filter(|l| l.text.starts_with("TARGETS"))
        .ok_or(ParseError::MissingSection { section: "TARGETS" })?;
    let targets: Vec<u16> = targets_line
        .text
        .split_whitespace()
        .skip(1)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| ParseError::Malformed {
            line: targets_line.number,
            expected: "row target color ids",
            found: targets_line.text.to_string(),
        })?;
    if targets.len() != rows {
        return Err(ParseError::Malformed {
            line: targets_line.number,
            expected: "one target per row",
            found: targets_line.text.to_string(),
        });
    }
    let declared_ids: std::collections::HashSet<u16> = name_to_id.values().copied().collect();
    for &id in &targets {
        if !declared_ids.contains(&id) {
            return Err(ParseError::UnknownColor(id.to_string()));
        }
    }
    idx += 1;

    if lines.get(idx).map(|l| l.text) != Some("TILES") {
        return Err(ParseError::MissingSection { section: "TILES" });
    }
    idx += 1;

    let mut cells: Vec<Option<Tile>> = vec![None; rows * cols];
    let mut seen = std::collections::HashSet::new();
    while idx < lines.len() && lines[idx].text != "MOVES" {
        let line = &lines[idx];
        let mut tokens = line.text.split_whitespace();
        let pos = tokens.next().ok_or_else(|| ParseError::Malformed {
            line: line.number,
            expected: "a position",
            found: line.text.to_string(),
        })?;
        let id: u16 = tokens
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ParseError::Malformed {
                line: line.number,
                expected: "a color id",
                found: line.text.to_string(),
            })?;
        let remaining: u8 = tokens
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ParseError::Malformed {
                line: line.number,
                expected: "a remaining-moves count",
                found: line.text.to_string(),
            })?;
        if !targets.contains(&id) {
            return Err(ParseError::UnknownColor(id.to_string()));
        }
        let (r, c) = parse_position_notation(pos).ok_or_else(|| ParseError::BadPosition(pos.to_string()))?;
        if r >= rows || c >= cols {
            return Err(ParseError::BadPosition(pos.to_string()));
        }
        if !seen.insert((r, c)) {
            return Err(ParseError::DuplicatePosition(Position { row: r, col: c }));
        }
        cells[r * cols + c] = Some(Tile::new(id, remaining));
        idx += 1;
    }

    let color_names = (0..rows as u16)
        .map(|id| id_to_name.get(&id).cloned().unwrap_or_else(|| id.to_string()))
        .collect();
    Ok((finish_cells(cells, rows, cols)?, color_names))
}

fn finish_cells(cells: Vec<Option<Tile>>, rows: usize, cols: usize) -> Result<Board, ParseError> {
    let found = cells.iter().filter(|c| c.is_some()).count();
    if found != rows * cols {
        return Err(ParseError::TileCountMismatch { expected: rows * cols, found });
    }
    let cells: Vec<Tile> = cells.into_iter().map(|c| c.expect("checked above")).collect();
    Ok(Board::new(rows, cols, cells))
}

/// Replays an optional trailing `MOVES` block against the declared board
/// (§6).
fn apply_moves_section(lines: &[Line], board: Board) -> Result<Board, ParseError> {
    let Some(start) = find_section(lines, "MOVES") else {
        return Ok(board);
    };
    let mut board = board;
    for line in &lines[start + 1..] {
        for token in line.text.split_whitespace() {
            let m: Move = parse_move_notation(token)
                .ok_or_else(|| ParseError::BadMove(token.to_string()))?;
            if !m.is_well_formed() || !m.in_bounds(board.rows(), board.cols()) {
                return Err(ParseError::BadMove(token.to_string()));
            }
            board = board.swap(m);
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trivial_format_a_board() {
        // Row 0's line declares every RED (id 0) tile, row 1's every BLUE
        // (id 1) tile, regardless of which cell each sits in.
        let text = "\
ROWS 2
COLS 2
BOARD
RED A1 0 B2 0
BLUE A2 1 B1 1
";
        let parsed = parse(text).expect("should parse");
        assert_eq!(parsed.state.board.rows(), 2);
        assert_eq!(parsed.state.board.get(0, 0), Tile::new(0, 0));
        assert_eq!(parsed.state.board.get(1, 1), Tile::new(0, 0));
        assert_eq!(parsed.state.board.get(0, 1), Tile::new(1, 1));
        assert_eq!(parsed.state.board.get(1, 0), Tile::new(1, 1));
        assert_eq!(parsed.color_names, vec!["RED".to_string(), "BLUE".to_string()]);
    }

    #[test]
    fn parses_format_b_legacy_board() {
        let text = "\
ROWS 1
COLS 2
COLORS
RED 0
TARGETS 0
TILES
A1 0 1
A2 0 1
";
        let parsed = parse(text).expect("should parse");
        assert_eq!(parsed.state.board.get(0, 0), Tile::new(0, 1));
        assert_eq!(parsed.state.board.get(0, 1), Tile::new(0, 1));
        assert_eq!(parsed.color_names, vec!["RED".to_string()]);
    }

    #[test]
    fn rejects_duplicate_positions() {
        let text = "\
ROWS 1
COLS 2
BOARD
RED A1 0 A1 0
";
        assert!(matches!(parse(text), Err(ParseError::DuplicatePosition(_))));
    }

    #[test]
    fn rejects_tile_count_mismatch() {
        let text = "\
ROWS 1
COLS 2
BOARD
RED A1 0
";
        assert!(matches!(parse(text), Err(ParseError::TileCountMismatch { .. })));
    }

    #[test]
    fn moves_section_replays_against_declared_board() {
        let text = "\
ROWS 2
COLS 2
BOARD
RED A1 0 A2 0
BLUE B1 2 B2 2
MOVES
B1-B2
";
        let parsed = parse(text).expect("should parse");
        assert_eq!(parsed.state.board.get(1, 0).remaining, 1);
        assert_eq!(parsed.state.board.get(1, 1).remaining, 1);
        assert_eq!(parsed.state.board.get(0, 0).remaining, 0);
    }

    #[test]
    fn rejects_nonpositive_dimensions() {
        let text = "ROWS 0\nCOLS 2\nBOARD\n";
        assert!(matches!(
            parse(text),
            Err(ParseError::NonPositiveDimensions { .. })
        ));
    }
}
