//! Slowsort with depth-bounded fork/join parallelism.
//!
//! The algorithm is the classic "multiply and surrender" slowsort:
//!
//! 1. A range of zero or one element is already sorted.
//! 2. Split at `mid = (start + end) / 2`.
//! 3. Sort `[start, mid]` and `[mid + 1, end]`. Below `max_depth` the two
//!    halves are sorted on their own threads and joined; at or beyond it
//!    they are sorted one after the other on the current thread.
//! 4. Swap `end` and `mid` if `seq[end] < seq[mid]`, which moves the maximum
//!    of the range into `end`.
//! 5. Sort `[start, end - 1]`.
//!
//! Every recursive call, including step 5, runs one level deeper.
//!
//! # Disjointness
//!
//! The halves in step 3 are produced with [`slice::split_at_mut`] from
//! [`IndexRange::halves`], so the borrow checker guarantees the two child
//! tasks never alias. Step 4 only runs after both children are joined.
//!
//! # Task bound
//!
//! Only frames shallower than `max_depth` fork, and a forking frame is
//! suspended until its children finish. At most `2^max_depth` sort tasks are
//! therefore runnable at any instant; [`SortStats::peak_running_tasks`]
//! records the observed high-water mark.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::config::{SortConfig, MAX_PARALLEL_DEPTH};
use crate::error::{ConfigError, SortError};
use crate::fork_join;

// ---------------------------------------------------------------------------
// IndexRange
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` bounds into a sequence.
///
/// `start >= end` denotes an empty or single-element range, which is sorted
/// by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The range covering a whole sequence of `len` elements, or `None` for
    /// an empty sequence.
    pub fn full(len: usize) -> Option<Self> {
        len.checked_sub(1).map(|end| Self::new(0, end))
    }

    /// Whether the range holds at most one element.
    pub fn is_trivial(&self) -> bool {
        self.start >= self.end
    }

    /// Number of elements covered (0 for an inverted range).
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mid(&self) -> usize {
        self.start + (self.end - self.start) / 2
    }

    /// Split into `[start, mid]` and `[mid + 1, end]`.
    ///
    /// Only meaningful for non-trivial ranges; the two halves are adjacent
    /// and never overlap.
    pub fn halves(&self) -> (IndexRange, IndexRange) {
        let mid = self.mid();
        (
            IndexRange::new(self.start, mid),
            IndexRange::new(mid + 1, self.end),
        )
    }

    /// The range minus its last element.
    pub fn without_last(&self) -> IndexRange {
        IndexRange::new(self.start, self.end.saturating_sub(1))
    }

    fn check_bounds(&self, len: usize) -> Result<(), SortError> {
        if self.end >= len {
            return Err(SortError::RangeOutOfBounds { range: *self, len });
        }
        Ok(())
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters gathered over one sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Recursive invocations, trivial ones included.
    pub calls: u64,
    /// Child tasks started by forking frames.
    pub tasks_spawned: u64,
    /// Swaps performed in step 4.
    pub swaps: u64,
    /// Most sort tasks observed running (not suspended in a join) at once,
    /// counting the calling thread.
    pub peak_running_tasks: usize,
}

#[derive(Default)]
struct Counters {
    calls: AtomicU64,
    tasks_spawned: AtomicU64,
    swaps: AtomicU64,
    running: AtomicUsize,
    peak_running: AtomicUsize,
}

impl Counters {
    fn start() -> Self {
        let counters = Self::default();
        counters.task_started();
        counters
    }

    fn task_started(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(now, Ordering::SeqCst);
    }

    fn task_suspended(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> SortStats {
        SortStats {
            calls: self.calls.load(Ordering::Relaxed),
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
            peak_running_tasks: self.peak_running.load(Ordering::SeqCst),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Sort `seq[range.start..=range.end]` in place.
///
/// Elements outside `range` are never touched. `cur_depth` is the depth the
/// call starts at; top-level callers pass 0. Fails if `max_depth` exceeds
/// [`MAX_PARALLEL_DEPTH`], if a non-trivial `range` reaches past the end of
/// `seq`, or if a child task cannot be started or panics.
pub fn slow_sort<T: Ord + Send>(
    seq: &mut [T],
    range: IndexRange,
    max_depth: usize,
    cur_depth: usize,
) -> Result<(), SortError> {
    run(seq, range, max_depth, cur_depth).map(|_| ())
}

/// Sort a whole sequence. An empty sequence is a no-op.
pub fn sort_all<T: Ord + Send>(seq: &mut [T], max_depth: usize) -> Result<(), SortError> {
    match IndexRange::full(seq.len()) {
        Some(range) => slow_sort(seq, range, max_depth, 0),
        None => check_depth(max_depth),
    }
}

/// A configured sorter that also reports [`SortStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sorter {
    config: SortConfig,
}

impl Sorter {
    pub fn new(config: SortConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    pub fn sort<T: Ord + Send>(&self, seq: &mut [T]) -> Result<SortStats, SortError> {
        match IndexRange::full(seq.len()) {
            Some(range) => self.sort_range(seq, range),
            None => Ok(SortStats::default()),
        }
    }

    pub fn sort_range<T: Ord + Send>(
        &self,
        seq: &mut [T],
        range: IndexRange,
    ) -> Result<SortStats, SortError> {
        run(seq, range, self.config.max_depth, 0)
    }
}

fn check_depth(max_depth: usize) -> Result<(), SortError> {
    if max_depth > MAX_PARALLEL_DEPTH {
        return Err(SortError::DepthTooLarge {
            requested: max_depth,
            limit: MAX_PARALLEL_DEPTH,
        });
    }
    Ok(())
}

fn run<T: Ord + Send>(
    seq: &mut [T],
    range: IndexRange,
    max_depth: usize,
    cur_depth: usize,
) -> Result<SortStats, SortError> {
    check_depth(max_depth)?;
    let counters = Counters::start();
    if range.is_trivial() {
        counters.calls.fetch_add(1, Ordering::Relaxed);
        return Ok(counters.snapshot());
    }
    range.check_bounds(seq.len())?;

    tracing::debug!(%range, max_depth, cur_depth, "slow sort started");
    let window = &mut seq[range.start..=range.end];
    sort_window(window, range.start, max_depth, cur_depth, &counters)?;

    let stats = counters.snapshot();
    tracing::debug!(
        %range,
        calls = stats.calls,
        tasks = stats.tasks_spawned,
        swaps = stats.swaps,
        peak_running = stats.peak_running_tasks,
        "slow sort finished"
    );
    Ok(stats)
}

/// Recursive step over `window`, which starts at `offset` in the caller's
/// sequence. `offset` only feeds task labels.
fn sort_window<T: Ord + Send>(
    window: &mut [T],
    offset: usize,
    max_depth: usize,
    depth: usize,
    counters: &Counters,
) -> Result<(), SortError> {
    counters.calls.fetch_add(1, Ordering::Relaxed);

    let range = match IndexRange::full(window.len()) {
        Some(range) if !range.is_trivial() => range,
        _ => return Ok(()),
    };
    let mid = range.mid();
    let end = range.end;
    let (left_range, right_range) = range.halves();

    {
        let (left, right) = window.split_at_mut(right_range.start);
        let right_offset = offset + right_range.start;

        if depth < max_depth {
            let label = format!("slowsort-{}-{}", offset, offset + end);
            tracing::trace!(task = %label, depth, left = %left_range, right = %right_range, "forking");

            counters.tasks_spawned.fetch_add(2, Ordering::Relaxed);
            counters.task_suspended();
            let joined = fork_join::join(
                &label,
                || run_child(left, offset, max_depth, depth + 1, counters),
                || run_child(right, right_offset, max_depth, depth + 1, counters),
            );
            counters.task_started();

            let (left_result, right_result) = joined?;
            left_result?;
            right_result?;
        } else {
            sort_window(left, offset, max_depth, depth + 1, counters)?;
            sort_window(right, right_offset, max_depth, depth + 1, counters)?;
        }
    }

    if window[end] < window[mid] {
        window.swap(end, mid);
        counters.swaps.fetch_add(1, Ordering::Relaxed);
    }

    sort_window(&mut window[..end], offset, max_depth, depth + 1, counters)
}

fn run_child<T: Ord + Send>(
    window: &mut [T],
    offset: usize,
    max_depth: usize,
    depth: usize,
    counters: &Counters,
) -> Result<(), SortError> {
    counters.task_started();
    let result = sort_window(window, offset, max_depth, depth, counters);
    counters.task_suspended();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
