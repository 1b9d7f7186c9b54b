//! The progress reporter (§4.9): a dedicated thread that periodically
//! snapshots the frontier's counters and prints one status line (plus an
//! optional invalidity histogram).
//!
//! Grounded on the teacher's single dedicated background thread pattern
//! (used there to drive a terminal progress bar), generalized from a
//! single-line bar to a periodic multi-line textual ticker, since the
//! display this spec asks for is a status tick rather than a fill-bar.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::info;

use crate::frontier::Frontier;

/// Formats a count with a K/M/B/T suffix and one decimal place (§4.9),
/// e.g. `1_234_000` -> `"1.2M"`. Values under 1000 render as plain integers.
#[must_use]
pub fn format_count(n: u64) -> String {
    const UNITS: &[(u64, &str)] = &[
        (1_000_000_000_000, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];
    for &(scale, suffix) in UNITS {
        if n >= scale {
            return format!("{:.1}{suffix}", n as f64 / scale as f64);
        }
    }
    n.to_string()
}

/// Formats an elapsed duration as `hhh:mm:ss` (§4.9).
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:03}:{m:02}:{s:02}")
}

/// Renders one tick's status line, matching the documented format exactly:
/// `[hhh:mm:ss] Processed: <cnt> | Pruned: <pct>% | Queues: b0:sz0 b1:sz1 … | Rate: <states/sec> | Avg: <ms>`
#[must_use]
pub fn render_line(elapsed: Duration, frontier: &Frontier, rate_window: Duration) -> String {
    let (processed, generated, pruned) = frontier.counters.snapshot();
    let pruned_pct = if generated == 0 {
        0.0
    } else {
        100.0 * pruned as f64 / generated as f64
    };
    let queues: Vec<String> = frontier
        .bucket_sizes()
        .iter()
        .enumerate()
        .map(|(b, sz)| format!("b{b}:{sz}"))
        .collect();
    let secs = rate_window.as_secs_f64().max(1e-6);
    let rate = processed as f64 / secs;
    let avg_ms = if processed == 0 {
        0.0
    } else {
        1000.0 * secs / processed as f64
    };
    format!(
        "[{}] Processed: {} | Pruned: {pruned_pct:.1}% | Queues: {} | Rate: {}/s | Avg: {avg_ms:.2}ms",
        format_elapsed(elapsed),
        format_count(processed),
        queues.join(" "),
        format_count(rate as u64),
    )
}

/// Renders the optional per-`(move_count, predicate)` invalidity histogram
/// (§4.9), one row per populated key, sorted for stable output.
#[must_use]
pub fn render_invalidity_table(frontier: &Frontier) -> Option<String> {
    if !frontier.invalidity.is_enabled() {
        return None;
    }
    let rows = frontier.invalidity.snapshot();
    if rows.is_empty() {
        return Some("(no invalidity hits yet)".to_string());
    }
    let mut out = String::from("move_count | predicate | count\n");
    for ((move_count, predicate), count) in rows {
        out.push_str(&format!("{move_count:>10} | {predicate:<18} | {count}\n"));
    }
    Some(out)
}

/// Runs the reporter loop on the calling thread until `stop` is raised. The
/// orchestrator is expected to spawn this in its own `std::thread` (§4.9,
/// §5). `interval == Duration::ZERO` disables the reporter entirely.
pub fn run(frontier: &Frontier, stop: &AtomicBool, interval: Duration) {
    if interval.is_zero() {
        return;
    }
    let start = Instant::now();
    let mut last_tick = start;
    while !stop.load(Ordering::Acquire) {
        sleep_interruptible(interval, stop);
        if stop.load(Ordering::Acquire) {
            break;
        }
        let now = Instant::now();
        info!("{}", render_line(now - start, frontier, now - last_tick));
        if let Some(table) = render_invalidity_table(frontier) {
            info!("\n{table}");
        }
        last_tick = now;
    }
}

/// Sleeps for `interval` but wakes early if `stop` flips, via a condvar the
/// orchestrator can signal on shutdown rather than a plain blocking sleep.
fn sleep_interruptible(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}
