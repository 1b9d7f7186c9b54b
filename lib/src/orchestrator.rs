//! The orchestrator (§4.7): wires the frontier, workers, reporter, parser,
//! and checkpoint together into one solve run.
//!
//! Grounded on `TableBaseBuilder::build`, the teacher's single entry point
//! that owns the full generate-then-tag pipeline end to end; generalized
//! from a sequential two-pass build to a parallel worker pool bounded by a
//! duration deadline and a solution/exhaustion race.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::checkpoint;
use crate::color;
use crate::error::ParseError;
use crate::frontier::Frontier;
use crate::generation::MoveOrder;
use crate::parser;
use crate::report;
use crate::state::BoardState;
use crate::worker::{self, WorkerConfig};

/// How long the orchestrator waits, once the stop flag is raised, for
/// workers to quiesce before it gives up on a clean drain and checkpoints
/// whatever `collect_all` returns (§4.7).
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// How often the orchestrator's own wait loop polls frontier state while
/// idle, distinct from the reporter's display interval.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run configuration, one field per CLI flag in §6.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub threads: usize,
    pub reporter_interval: Duration,
    pub cache_threshold: u32,
    pub shards: usize,
    /// `None` disables the duration deadline (§4.7: "Zero/negative disables
    /// the deadline").
    pub duration: Option<Duration>,
    pub disable_empty_termination: bool,
    pub track_invalidity: bool,
    pub move_order: MoveOrder,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            threads: 2,
            reporter_interval: Duration::from_secs(5),
            cache_threshold: worker::DEFAULT_CACHE_THRESHOLD,
            shards: crate::frontier::DEFAULT_SHARDS,
            duration: None,
            disable_empty_termination: false,
            track_invalidity: false,
            move_order: MoveOrder::None,
        }
    }
}

/// Why a [`solve`] call ended (§4.7, §6 exit codes).
#[derive(Debug)]
pub enum SolveOutcome {
    /// A solution was found; `moves` is the root-to-goal sequence.
    Solved { moves: Vec<crate::board::Move> },
    /// The frontier (and every worker's cache) ran dry with no solution.
    Exhausted,
    /// The configured duration elapsed before either of the above.
    TimedOut,
}

impl SolveOutcome {
    /// The process exit code this outcome maps to (§6).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Solved { .. } => 0,
            Self::Exhausted | Self::TimedOut => 1,
        }
    }
}

/// Derives the resume-file path from a puzzle path: `foo.txt` ->
/// `foo.state.txt` (§4.8). Puzzle paths without a `.txt` extension simply
/// get `.state.txt` appended.
#[must_use]
pub fn resume_path(puzzle_path: &Path) -> PathBuf {
    let mut s = puzzle_path.to_string_lossy().into_owned();
    if let Some(stripped) = s.strip_suffix(".txt") {
        s = stripped.to_string();
    }
    s.push_str(".state.txt");
    PathBuf::from(s)
}

/// Derives the solution-file path: `foo.txt` -> `foo.solution.txt` (§6).
#[must_use]
pub fn solution_path(puzzle_path: &Path) -> PathBuf {
    let mut s = puzzle_path.to_string_lossy().into_owned();
    if let Some(stripped) = s.strip_suffix(".txt") {
        s = stripped.to_string();
    }
    s.push_str(".solution.txt");
    PathBuf::from(s)
}

/// Parses `text` as s/m/h/d/w-suffixed duration (§4.7); default unit is
/// minutes when no suffix is given. Returns `None` for zero or negative
/// values (the "disabled" sentinel) and for unparsable input.
#[must_use]
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    let (digits, unit_secs) = match text.chars().last() {
        Some('s') => (&text[..text.len() - 1], 1u64),
        Some('m') => (&text[..text.len() - 1], 60),
        Some('h') => (&text[..text.len() - 1], 3600),
        Some('d') => (&text[..text.len() - 1], 86_400),
        Some('w') => (&text[..text.len() - 1], 604_800),
        _ => (text, 60),
    };
    let value: f64 = digits.parse().ok()?;
    if value <= 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(value * unit_secs as f64))
}

/// Runs a complete solve attempt against `puzzle_path` (§4.7): parses the
/// puzzle, resumes from a checkpoint if one exists, spawns workers and a
/// reporter, waits for a terminal condition, and on non-solution writes a
/// fresh checkpoint (deleting any prior one on solution).
///
/// # Errors
/// Returns the [`ParseError`] from reading the puzzle file unchanged; no
/// other step in this function is fallible in a way that aborts the run
/// (resume/checkpoint I/O failures are logged and treated as "no resume
/// data"/"best effort", per §7).
pub fn solve(puzzle_path: &Path, config: &SolveConfig) -> Result<SolveOutcome, ParseError> {
    let text = std::fs::read_to_string(puzzle_path).map_err(|_| ParseError::MissingSection {
        section: "<puzzle file>",
    })?;
    let parsed = parser::parse(&text)?;
    let color_names = parsed.color_names;
    let root = Arc::new(parsed.state);

    let frontier = Arc::new(Frontier::new(root.score, config.shards, config.track_invalidity));
    let resume = resume_path(puzzle_path);
    let mut resumed_any = false;
    if let Ok(file) = std::fs::File::open(&resume) {
        let reader = std::io::BufReader::new(file);
        let states = checkpoint::load(reader, &root);
        resumed_any = !states.is_empty();
        for s in states {
            frontier.add(s);
        }
        info!("resumed {} state(s) from {}", frontier.size(), resume.display());
    }
    if !resumed_any {
        frontier.add(Arc::clone(&root));
    }

    let stop = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();
    for _ in 0..config.threads.max(1) {
        let frontier = Arc::clone(&frontier);
        let stop = Arc::clone(&stop);
        let worker_config = WorkerConfig {
            cache_threshold: config.cache_threshold,
            move_order: config.move_order,
            track_invalidity: config.track_invalidity,
            disable_empty_termination: config.disable_empty_termination,
        };
        handles.push(std::thread::spawn(move || worker::run(&frontier, &stop, worker_config)));
    }
    if !config.reporter_interval.is_zero() {
        let frontier = Arc::clone(&frontier);
        let stop = Arc::clone(&stop);
        let interval = config.reporter_interval;
        handles.push(std::thread::spawn(move || report::run(&frontier, &stop, interval)));
    }

    loop {
        if frontier.is_solved() {
            stop.store(true, Ordering::Release);
            break;
        }
        if frontier.all_idle() && !config.disable_empty_termination {
            stop.store(true, Ordering::Release);
            break;
        }
        if let Some(duration) = config.duration {
            if start.elapsed() >= duration {
                stop.store(true, Ordering::Release);
                break;
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    // Bounded shutdown grace (§4.7): poll until every worker/reporter thread
    // has observed `stop` and returned, or the grace window elapses,
    // whichever comes first. A hung worker no longer blocks the run
    // forever -- the checkpoint below is written from whatever
    // `collect_all` returns even if some threads are still draining.
    let shutdown_start = Instant::now();
    while shutdown_start.elapsed() < SHUTDOWN_GRACE && handles.iter().any(|h| !h.is_finished()) {
        std::thread::sleep(POLL_INTERVAL);
    }
    if handles.iter().any(|h| !h.is_finished()) {
        warn!("shutdown grace window of {SHUTDOWN_GRACE:?} elapsed with thread(s) still running; checkpointing anyway");
    } else {
        for handle in handles {
            let _ = handle.join();
        }
    }

    if let Some(solution) = frontier.take_solution() {
        let _ = std::fs::remove_file(&resume);
        let moves = solution.move_chain();
        write_solution_file(puzzle_path, &root, &moves, &color_names);
        return Ok(SolveOutcome::Solved { moves });
    }

    let timed_out = config
        .duration
        .is_some_and(|d| start.elapsed() >= d && !frontier.all_idle());
    let pending = frontier.collect_all();
    if let Err(e) = checkpoint::save(&resume, &pending) {
        warn!("failed to write checkpoint to {}: {e}", resume.display());
    } else {
        info!("checkpointed {} pending state(s) to {}", pending.len(), resume.display());
    }

    Ok(if timed_out {
        SolveOutcome::TimedOut
    } else {
        SolveOutcome::Exhausted
    })
}

/// Writes `<puzzlePath>.solution.txt`: the move notation sequence, one per
/// line, followed by the board rendered after each step (§6).
fn write_solution_file(
    puzzle_path: &Path,
    root: &Arc<BoardState>,
    moves: &[crate::board::Move],
    color_names: &[String],
) {
    let mut out = String::new();
    let mut state = Arc::clone(root);
    for m in moves {
        out.push_str(&m.to_string());
        out.push('\n');
        state = Arc::new(state.apply_move(*m));
        out.push_str(&render_board(&state, color_names));
        out.push('\n');
    }
    let path = solution_path(puzzle_path);
    if let Err(e) = std::fs::write(&path, out) {
        warn!("failed to write solution file {}: {e}", path.display());
    }
}

/// A plain human-readable rendering of a board's tiles, row by row, using
/// each tile's declared color name abbreviation rather than its raw numeric
/// id (§6, "Color naming").
fn render_board(state: &BoardState, color_names: &[String]) -> String {
    let board = &state.board;
    let mut out = String::new();
    for r in 0..board.rows() {
        let cells: Vec<String> = board
            .row(r)
            .iter()
            .map(|t| {
                let name = color_names
                    .get(usize::from(t.color))
                    .map_or_else(|| t.color.to_string(), |n| color::abbreviate(n));
                format!("{name}/{}", t.remaining)
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}
