use std::path::PathBuf;

use clap::{ArgAction, Args};
use log::{error, info};

use tilematch::{parse_duration, solve, MoveOrder, SolveConfig, SolveOutcome, DEFAULT_SHARDS};

#[derive(Args, Debug)]
pub struct Solve {
    #[arg(help = "path to the puzzle file")]
    puzzle: PathBuf,
    #[arg(short = 't', long, default_value_t = 2, help = "worker thread count")]
    threads: usize,
    #[arg(short = 'r', long = "report", default_value_t = 5, help = "reporter interval in seconds, 0 to disable")]
    report_secs: u64,
    #[arg(short = 'c', long, default_value_t = tilematch::DEFAULT_CACHE_THRESHOLD, help = "cache threshold for near-goal states")]
    cache_threshold: u32,
    #[arg(long = "repl", default_value_t = DEFAULT_SHARDS, help = "frontier shard count")]
    shards: usize,
    #[arg(long = "dur", help = "run duration, e.g. 30s, 5m, 2h; default unit minutes")]
    duration: Option<String>,
    #[arg(short = 'd', action = ArgAction::SetTrue, help = "debug: disable empty-frontier termination")]
    disable_empty_termination: bool,
    #[arg(short = 'i', action = ArgAction::SetTrue, help = "track and print per-predicate invalidity stats")]
    track_invalidity: bool,
    #[arg(long = "smallestFirst", action = ArgAction::SetTrue)]
    smallest_first: bool,
    #[arg(long = "largestFirst", action = ArgAction::SetTrue)]
    largest_first: bool,
}

impl Solve {
    pub fn run(self) -> i32 {
        let move_order = match (self.smallest_first, self.largest_first) {
            (true, true) => {
                error!("--smallestFirst and --largestFirst are mutually exclusive");
                return 2;
            }
            (true, false) => MoveOrder::SmallestFirst,
            (false, true) => MoveOrder::LargestFirst,
            (false, false) => MoveOrder::None,
        };

        let duration = match self.duration.as_deref() {
            None => None,
            Some(text) => match parse_duration(text) {
                Some(d) => Some(d),
                None => {
                    error!("invalid --dur value {text:?}");
                    return 2;
                }
            },
        };

        let config = SolveConfig {
            threads: self.threads,
            reporter_interval: std::time::Duration::from_secs(self.report_secs),
            cache_threshold: self.cache_threshold,
            shards: self.shards,
            duration,
            disable_empty_termination: self.disable_empty_termination,
            track_invalidity: self.track_invalidity,
            move_order,
        };

        match solve(&self.puzzle, &config) {
            Ok(SolveOutcome::Solved { moves }) => {
                let rendered: Vec<String> = moves.iter().map(ToString::to_string).collect();
                println!("{}", rendered.join(" "));
                info!("solved in {} moves", moves.len());
                0
            }
            Ok(SolveOutcome::Exhausted) => {
                info!("frontier exhausted without a solution");
                1
            }
            Ok(SolveOutcome::TimedOut) => {
                info!("duration elapsed without a solution; checkpoint written");
                1
            }
            Err(e) => {
                error!("failed to parse {}: {e}", self.puzzle.display());
                1
            }
        }
    }
}
