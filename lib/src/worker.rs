//! The worker (§4.6): a long-running thread that polls the frontier,
//! generates and classifies successors, and either finishes, caches, or
//! re-enqueues each one.
//!
//! Grounded on the teacher's `available_parallelism()`-sized thread pool
//! (each thread independently draining a shared work source, flushing
//! batched counters) generalized from table-building passes to frontier
//! exploration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::frontier::Frontier;
use crate::generation::{generate_moves, MoveOrder};
use crate::invalidity::classify;
use crate::state::BoardState;

/// Threshold below which a successor is kept on the worker's private LIFO
/// cache instead of going back to the shared frontier (§4.6).
pub const DEFAULT_CACHE_THRESHOLD: u32 = 4;

/// Capacity pre-reserved for the worker's LIFO cache (§4.6).
const CACHE_RESERVE: usize = 100_000;

/// Backoff sleep used when both the cache and the worker's drawn shard are
/// empty (§4.6, §5).
const BACKOFF: Duration = Duration::from_millis(20);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

/// Per-worker configuration (§4.6, §6: `-c`, ordering flags).
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub cache_threshold: u32,
    pub move_order: MoveOrder,
    pub track_invalidity: bool,
    /// `-d`: disables empty-frontier termination, for debugging (§6).
    pub disable_empty_termination: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_threshold: DEFAULT_CACHE_THRESHOLD,
            move_order: MoveOrder::None,
            track_invalidity: false,
            disable_empty_termination: false,
        }
    }
}

/// Runs one worker's loop to completion (§4.6). Returns when the solution is
/// found, the frontier and this worker's cache are both exhausted, or `stop`
/// is raised by the orchestrator.
pub fn run(frontier: &Frontier, stop: &AtomicBool, config: WorkerConfig) {
    let mut cache: Vec<Arc<BoardState>> = Vec::with_capacity(CACHE_RESERVE);
    let mut backoff = BACKOFF;

    loop {
        if frontier.is_solved() {
            return;
        }
        if stop.load(Ordering::Acquire) {
            // Drain the private cache back to the shared frontier so a
            // subsequent checkpoint sees every live state exactly once (§8
            // property 8), rather than silently dropping it here.
            for s in cache.drain(..) {
                frontier.add(s);
            }
            return;
        }

        let state = match cache.pop() {
            Some(s) => s,
            None => frontier.poll(),
        };

        let state = match state {
            Some(s) => s,
            None => {
                if cache.is_empty() && frontier.is_empty() && !config.disable_empty_termination {
                    return;
                }
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };
        backoff = BACKOFF;
        frontier.mark_busy();

        if state.is_solved() {
            frontier.publish_solution(state);
            frontier.mark_idle();
            return;
        }

        let moves = generate_moves(&state.board, config.move_order);
        let mut local_generated: u64 = 0;
        let mut local_pruned: u64 = 0;

        for m in moves {
            if frontier.is_solved() {
                break;
            }
            let next = Arc::new(state.apply_move(m));
            local_generated += 1;

            if next.is_solved() {
                frontier.publish_solution(next);
                flush(frontier, &mut local_generated, &mut local_pruned);
                frontier.mark_idle();
                return;
            }

            if let Some(predicate) = classify(&next) {
                local_pruned += 1;
                if config.track_invalidity {
                    frontier.invalidity.bump(next.remaining_moves, predicate);
                }
                continue;
            }

            if next.remaining_moves < config.cache_threshold {
                cache.push(next);
            } else {
                frontier.add(next);
            }
        }

        flush(frontier, &mut local_generated, &mut local_pruned);
        frontier.mark_idle();
    }
}

fn flush(frontier: &Frontier, generated: &mut u64, pruned: &mut u64) {
    frontier.add_batch(1, *generated, *pruned);
    *generated = 0;
    *pruned = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Move};
    use crate::tile::Tile;

    /// Row 0 already home and spent; row 1 home-colored with one move owed
    /// by each tile -- solved by the horizontal perfect-swap short-circuit.
    fn trivial_2x2() -> Board {
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
    fn worker_finds_the_trivial_solution() {
        let frontier = Frontier::new(2, 1, false);
        frontier.add(Arc::new(BoardState::initial(trivial_2x2())));
        let stop = AtomicBool::new(false);
        run(&frontier, &stop, WorkerConfig::default());
        assert!(frontier.is_solved());
        let solution = frontier.take_solution().expect("solution should be published");
        assert!(solution.is_solved());
        assert_eq!(solution.move_chain(), vec![Move::new(1, 0, 1, 1)]);
    }

    #[test]
    fn worker_terminates_on_empty_frontier_without_solution() {
        // A board that is immediately a parity deadlock: never solved.
        let board = Board::new(
            1,
            4,
            vec![Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 0)],
        );
        let frontier = Frontier::new(BoardState::initial(board.clone()).score, 1, false);
        frontier.add(Arc::new(BoardState::initial(board)));
        let stop = AtomicBool::new(false);
        run(&frontier, &stop, WorkerConfig::default());
        assert!(!frontier.is_solved());
        assert!(frontier.is_empty());
    }

    #[test]
    fn worker_stops_immediately_when_stop_flag_is_set() {
        let frontier = Frontier::new(2, 1, false);
        frontier.add(Arc::new(BoardState::initial(trivial_2x2())));
        let stop = AtomicBool::new(true);
        run(&frontier, &stop, WorkerConfig::default());
        assert!(!frontier.is_solved());
        assert_eq!(frontier.size(), 1);
    }

    #[test]
    fn worker_drains_its_cache_back_to_the_frontier_on_stop() {
        // A board whose first successor lands in the cache (remaining_moves
        // stays above 0 but below the threshold) and is never solved, so the
        // worker is still holding it when `stop` is observed.
        let board = Board::new(
            1,
            4,
            vec![Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 1), Tile::new(0, 1)],
        );
        let root = Arc::new(BoardState::initial(board));
        let frontier = Arc::new(Frontier::new(root.score, 1, false));
        frontier.add(root);
        let stop = Arc::new(AtomicBool::new(false));
        let config = WorkerConfig { cache_threshold: 100, disable_empty_termination: true, ..WorkerConfig::default() };

        let handle = {
            let frontier = Arc::clone(&frontier);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || run(&frontier, &stop, config))
        };
        // Give the worker time to draw the root, push its successor(s) into
        // the private cache, and loop back around at least once.
        std::thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Release);
        handle.join().expect("worker thread should not panic");

        assert!(!frontier.is_solved());
        assert!(
            !frontier.is_empty(),
            "cached successors must be drained back to the frontier on stop"
        );
    }
}
