//! The frontier (§4.4): a sharded, priority-bucketed structure holding
//! pending states, plus the solution flag and batched counters.
//!
//! Grounded on the teacher's `Queue`/`MateInQueue` (`queue.rs`): a struct
//! wrapping per-bucket collections indexed by a derived key, generalized
//! from a single packed-bitset queue over one material configuration to a
//! `[bucket][shard]` grid of `Mutex<VecDeque<_>>`. See DESIGN.md for why
//! this uses fine-grained mutexes rather than a literal lock-free
//! structure: stable safe Rust (and this workspace's dependency set) has no
//! off-the-shelf intrusive lock-free MPMC deque, so contention is instead
//! diffused by sharding+bucketing, with the counters and active-flags that
//! must be checked on every `poll` kept genuinely lock-free via atomics.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::invalidity::Predicate;
use crate::state::BoardState;

/// Default number of shards (`-repl`, §6).
pub const DEFAULT_SHARDS: usize = 3;

/// `score + 8`: comfortably inside the "initial score + small constant"
/// policy band named in §4.5/§9.
const SCORE_HEADROOM: u32 = 8;

struct Bucket {
    shards: Vec<Mutex<VecDeque<Arc<BoardState>>>>,
    active: Vec<AtomicBool>,
}

impl Bucket {
    fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards).map(|_| Mutex::new(VecDeque::new())).collect(),
            active: (0..shards).map(|_| AtomicBool::new(false)).collect(),
        }
    }
}

/// Batched, eventually-consistent statistics (§4.4, §9 "Atomic traffic"):
/// workers accumulate locals during one state's processing and flush once.
#[derive(Debug, Default)]
pub struct Counters {
    pub states_processed: AtomicU64,
    pub states_generated: AtomicU64,
    pub states_pruned: AtomicU64,
}

impl Counters {
    fn add_batch(&self, processed: u64, generated: u64, pruned: u64) {
        self.states_processed.fetch_add(processed, Ordering::Relaxed);
        self.states_generated.fetch_add(generated, Ordering::Relaxed);
        self.states_pruned.fetch_add(pruned, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> (u64, u64, u64) {
        (
            self.states_processed.load(Ordering::Relaxed),
            self.states_generated.load(Ordering::Relaxed),
            self.states_pruned.load(Ordering::Relaxed),
        )
    }
}

/// Per-`(move_count, predicate)` invalidity histogram, populated only when
/// the reporter is configured to track it (§4.4, §4.9).
#[derive(Debug, Default)]
pub struct InvalidityCounters {
    enabled: bool,
    counts: Mutex<FxHashMap<(u32, &'static str), u64>>,
}

impl InvalidityCounters {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            counts: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bump(&self, move_count: u32, predicate: Predicate) {
        if !self.enabled {
            return;
        }
        let mut counts = self.counts.lock().expect("invalidity counters poisoned");
        *counts.entry((move_count, predicate.name())).or_insert(0) += 1;
    }

    /// Snapshot sorted by `(move_count, predicate name)` for stable
    /// rendering in the progress reporter.
    #[must_use]
    pub fn snapshot(&self) -> Vec<((u32, &'static str), u64)> {
        let counts = self.counts.lock().expect("invalidity counters poisoned");
        let mut v: Vec<_> = counts.iter().map(|(k, v)| (*k, *v)).collect();
        v.sort_unstable_by_key(|(k, _)| *k);
        v
    }
}

/// The sharded, priority-bucketed pending-state structure (§4.4).
pub struct Frontier {
    buckets: Vec<Bucket>,
    max_score: u32,
    shards: usize,
    solution_found: AtomicBool,
    solution: Mutex<Option<Arc<BoardState>>>,
    pub counters: Counters,
    pub invalidity: InvalidityCounters,
    rng_seed: AtomicU64,
    /// Count of workers currently holding a drawn state (processing it, not
    /// yet back to an empty-handed poll). Distinct from queue occupancy:
    /// the orchestrator's "frontier empty AND all workers idle" shutdown
    /// condition (§4.7) needs both to be true, not just the former.
    busy: AtomicUsize,
}

impl Frontier {
    /// Sizes the bucket count from the initial state's score (§4.7).
    #[must_use]
    pub fn new(initial_score: u32, shards: usize, track_invalidity: bool) -> Self {
        let max_score = initial_score + SCORE_HEADROOM;
        // bucket `max_score` itself is the overflow bucket.
        let buckets = (0..=max_score).map(|_| Bucket::new(shards)).collect();
        Self {
            buckets,
            max_score,
            shards,
            solution_found: AtomicBool::new(false),
            solution: Mutex::new(None),
            counters: Counters::default(),
            invalidity: InvalidityCounters::new(track_invalidity),
            rng_seed: AtomicU64::new(0x9E37_79B9_7F4A_7C15),
            busy: AtomicUsize::new(0),
        }
    }

    /// Marks one worker as holding a drawn state, about to process it.
    pub fn mark_busy(&self) {
        self.busy.fetch_add(1, Ordering::AcqRel);
    }

    /// Marks that worker as done with the state it drew.
    pub fn mark_idle(&self) {
        self.busy.fetch_sub(1, Ordering::AcqRel);
    }

    /// True iff no state is queued anywhere AND no worker currently holds
    /// one mid-processing (§4.7's shutdown condition).
    #[must_use]
    pub fn all_idle(&self) -> bool {
        self.busy.load(Ordering::Acquire) == 0 && self.is_empty()
    }

    #[must_use]
    pub const fn shard_count(&self) -> usize {
        self.shards
    }

    /// A fast, allocation-free xorshift step used only to pick a shard
    /// index; this is a load-balancing detail, not a correctness-relevant
    /// random source (no crypto, no determinism requirement beyond spread).
    fn next_shard(&self) -> usize {
        let mut x = self.rng_seed.load(Ordering::Relaxed);
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_seed.store(x, Ordering::Relaxed);
        (x as usize) % self.shards
    }

    fn bucket_for_score(&self, score: u32) -> usize {
        score.min(self.max_score) as usize
    }

    /// Enqueues a state into the bucket matching its score, in a randomly
    /// chosen shard (§4.4).
    pub fn add(&self, state: Arc<BoardState>) {
        let b = self.bucket_for_score(state.score);
        let s = self.next_shard();
        let bucket = &self.buckets[b];
        bucket.active[s].store(true, Ordering::Release);
        let mut q = lock(&bucket.shards[s]);
        q.push_back(state);
    }

    /// Picks a random shard, scans buckets lowest-first, and dequeues the
    /// first non-empty one found in that shard (§4.4). Returns `None` if
    /// that shard is currently empty (the caller backs off and retries,
    /// possibly landing on a different shard next time).
    #[must_use]
    pub fn poll(&self) -> Option<Arc<BoardState>> {
        let s = self.next_shard();
        for bucket in &self.buckets {
            if !bucket.active[s].load(Ordering::Acquire) {
                continue;
            }
            let mut q = lock(&bucket.shards[s]);
            if let Some(state) = q.pop_front() {
                if q.is_empty() {
                    bucket.active[s].store(false, Ordering::Release);
                }
                return Some(state);
            }
        }
        None
    }

    /// True iff every shard of every bucket is empty (§4.4).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets
            .iter()
            .all(|b| b.active.iter().all(|a| !a.load(Ordering::Acquire)))
    }

    /// Approximate total pending count, summed under concurrency (§4.4).
    #[must_use]
    pub fn size(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|b| b.shards.iter())
            .map(|q| lock(q).len())
            .sum()
    }

    /// Per-bucket size, for the progress reporter's queue summary (§4.9).
    #[must_use]
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .map(|b| b.shards.iter().map(|q| lock(q).len()).sum())
            .collect()
    }

    /// Drains every pending state for checkpointing (§4.4, §4.8). Callers
    /// must only invoke this after workers have quiesced; it is not required
    /// to be linearizable with ongoing `add`s.
    pub fn collect_all(&self) -> Vec<Arc<BoardState>> {
        let mut out = Vec::new();
        for bucket in &self.buckets {
            for (s, q) in bucket.shards.iter().enumerate() {
                let mut q = lock(q);
                out.extend(q.drain(..));
                bucket.active[s].store(false, Ordering::Release);
            }
        }
        out
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solution_found.load(Ordering::Acquire)
    }

    /// Idempotent: only the first caller's state is kept (§4.6).
    pub fn publish_solution(&self, state: Arc<BoardState>) {
        let mut slot = self.solution.lock().expect("solution slot poisoned");
        if slot.is_none() {
            *slot = Some(state);
            self.solution_found.store(true, Ordering::Release);
        }
    }

    #[must_use]
    pub fn take_solution(&self) -> Option<Arc<BoardState>> {
        self.solution.lock().expect("solution slot poisoned").clone()
    }

    pub fn add_batch(&self, processed: u64, generated: u64, pruned: u64) {
        self.counters.add_batch(processed, generated, pruned);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
