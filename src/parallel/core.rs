use crossbeam::channel::{Receiver, Sender, bounded};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::cancel::{CancellationToken, is_cancelled};
use crate::error::TaskError;
use crate::factor::{Classification, DivisorList};
use crate::sink::ResultSink;

/// Task-scheduling policy used to drive a range through the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single control thread, input order, no cancellation checks
    Sequential,
    /// One thread per integer with no cap on live threads
    Unbounded,
    /// Fixed worker pool feeding a completion channel
    Pool,
    /// Rayon parallel iterator over the range
    Stream,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Unbounded,
        Strategy::Pool,
        Strategy::Stream,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Unbounded => "unbounded",
            Strategy::Pool => "pool",
            Strategy::Stream => "stream",
        }
    }

    /// Numeric selector used by the line-mode prompt
    pub fn selector(&self) -> u8 {
        match self {
            Strategy::Sequential => 1,
            Strategy::Unbounded => 2,
            Strategy::Pool => 3,
            Strategy::Stream => 4,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "sequential" | "unthreaded" => Ok(Strategy::Sequential),
            "2" | "unbounded" | "threaded" => Ok(Strategy::Unbounded),
            "3" | "pool" | "threadpool" => Ok(Strategy::Pool),
            "4" | "stream" | "streams" => Ok(Strategy::Stream),
            other => Err(format!(
                "unknown strategy '{other}' (expected sequential, unbounded, pool, stream or 1-4)"
            )),
        }
    }
}

/// Default pool capacity: available hardware concurrency plus one
pub fn default_pool_workers() -> usize {
    num_cpus::get() + 1
}

/// Counters a dispatcher hands back once every task has finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Integers handed to the classifier as jobs
    pub submitted: usize,
    /// Jobs dropped because their execution failed
    pub failed: usize,
    /// Worker threads used; `None` when the policy does not fix a count
    pub workers: Option<usize>,
}

/// Everything a dispatcher needs for one run
pub struct Dispatch<'a, F> {
    range: RangeInclusive<u64>,
    sink: &'a ResultSink,
    token: Option<&'a CancellationToken>,
    factor: F,
}

impl<'a, F> Dispatch<'a, F>
where
    F: Fn(u64) -> DivisorList + Sync,
{
    pub fn new(range: RangeInclusive<u64>, sink: &'a ResultSink, factor: F) -> Self {
        Self {
            range,
            sink,
            token: None,
            factor,
        }
    }

    pub fn with_token(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.token = token;
        self
    }

    /// Number of integers in the range
    pub fn len(&self) -> usize {
        if self.range.is_empty() {
            0
        } else {
            (self.range.end() - self.range.start()) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Drive the range to completion with the chosen policy
    ///
    /// `workers` is only consulted by the pool; callers validate it beforehand.
    pub fn run(&self, strategy: Strategy, workers: usize) -> DispatchStats {
        tracing::trace!(
            "dispatching {} integers with {} strategy",
            self.len(),
            strategy
        );
        match strategy {
            Strategy::Sequential => SequentialExecutor::execute(self),
            Strategy::Unbounded => UnboundedExecutor::execute(self),
            Strategy::Pool => PoolExecutor::new(workers).execute(self),
            Strategy::Stream => StreamExecutor::execute(self),
        }
    }

    /// Classify `n`, converting a panic inside the classifier into a task error
    fn classify(&self, n: u64) -> Result<Classification, TaskError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            Classification::from_divisors(n, (self.factor)(n))
        }))
        .map_err(|payload| TaskError::from_panic(n, payload))
    }

    /// One cooperative unit of work: check, classify, check, write
    ///
    /// Returns `false` when the task failed.
    fn cooperative_task(&self, n: u64) -> bool {
        if is_cancelled(self.token) {
            return true;
        }

        let classification = match self.classify(n) {
            Ok(classification) => classification,
            Err(e) => {
                tracing::error!("{e}; dropping {n} from results");
                return false;
            }
        };

        // Cancelled while classifying: the result is discarded, not written
        if is_cancelled(self.token) {
            return true;
        }

        self.sink.record(classification);
        true
    }
}

/// Single-threaded pass in input order
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<F>(dispatch: &Dispatch<'_, F>) -> DispatchStats
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let mut failed = 0;

        for n in dispatch.range.clone() {
            match dispatch.classify(n) {
                Ok(classification) => dispatch.sink.record(classification),
                Err(e) => {
                    tracing::error!("{e}; dropping {n} from results");
                    failed += 1;
                }
            }
        }

        DispatchStats {
            submitted: dispatch.len(),
            failed,
            workers: Some(1),
        }
    }
}

/// Spawns a dedicated thread for every integer in the range
///
/// Kept as the baseline for comparison; it degrades badly on large ranges.
pub struct UnboundedExecutor;

impl UnboundedExecutor {
    pub fn execute<F>(dispatch: &Dispatch<'_, F>) -> DispatchStats
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let failed = AtomicUsize::new(0);
        let mut submitted = 0;

        let scope_result = crossbeam::thread::scope(|s| {
            for n in dispatch.range.clone() {
                if is_cancelled(dispatch.token) {
                    tracing::trace!("cancelled; not spawning threads from {n} onwards");
                    break;
                }
                submitted += 1;

                let failed = &failed;
                let spawned = s
                    .builder()
                    .name(format!("factor-{n}"))
                    .spawn(move |_| {
                        if !dispatch.cooperative_task(n) {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    });

                if let Err(e) = spawned {
                    // The OS refused another thread; do the work here instead of losing it
                    tracing::warn!("could not spawn thread for {n}: {e}; classifying inline");
                    if !dispatch.cooperative_task(n) {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });

        if scope_result.is_err() {
            tracing::error!("a classification thread panicked outside its task boundary");
        }

        DispatchStats {
            submitted,
            failed: failed.into_inner(),
            workers: None,
        }
    }
}

/// What a pool worker reports for each job it pulls
#[derive(Debug)]
enum Completion {
    Classified(Classification),
    Failed(TaskError),
    /// Job observed cancellation before classifying
    Skipped(u64),
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<'a, 'd, F> {
    worker_id: usize,
    work_rx: Receiver<u64>,
    completion_tx: Sender<Completion>,
    dispatch: &'a Dispatch<'d, F>,
}

/// Fixed-size worker pool with a completion channel
///
/// Jobs go onto a shared queue, `W` workers pull and classify them, and the
/// dispatching thread drains exactly one completion per submitted job in
/// arrival order, writing each into the sink.
pub struct PoolExecutor {
    max_workers: usize,
}

impl PoolExecutor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn execute<F>(&self, dispatch: &Dispatch<'_, F>) -> DispatchStats
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        if dispatch.is_empty() {
            return DispatchStats {
                submitted: 0,
                failed: 0,
                workers: Some(0),
            };
        }

        let total = dispatch.len();
        let actual_workers = std::cmp::min(self.max_workers, total);
        // Sized from the live worker count; the requested capacity may be huge
        let buffer_size = actual_workers.saturating_mul(2);
        let (work_tx, work_rx): (Sender<u64>, Receiver<u64>) = bounded(buffer_size);
        let (completion_tx, completion_rx): (Sender<Completion>, Receiver<Completion>) =
            bounded(buffer_size);

        let scope_result = crossbeam::thread::scope(|s| {
            // Spawn worker threads
            let mut spawned = 0;
            for worker_id in 0..actual_workers {
                let ctx = WorkerContext {
                    worker_id,
                    work_rx: work_rx.clone(),
                    completion_tx: completion_tx.clone(),
                    dispatch,
                };

                match s
                    .builder()
                    .name(format!("factor-worker-{worker_id}"))
                    .spawn(move |_| Self::worker_thread(ctx))
                {
                    Ok(_) => spawned += 1,
                    Err(e) => tracing::warn!("could not spawn pool worker {worker_id}: {e}"),
                }
            }

            // Producer thread: submit one job per integer
            let range = dispatch.range.clone();
            s.spawn(move |_| {
                let mut submitted = 0usize;
                for n in range {
                    if work_tx.send(n).is_err() {
                        break; // Workers dropped
                    }
                    submitted += 1;
                }
                tracing::trace!("producer submitted {submitted} jobs");
                // work_tx drops here, closing the queue once it drains
            });

            // Drop the originals so channel closure tracks only live workers
            drop(work_rx);
            drop(completion_tx);

            let failed = self.collect_completions(dispatch, completion_rx, total);
            (spawned, failed)
        });

        let (workers, failed) = match scope_result {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("a pool worker panicked outside its task boundary");
                (actual_workers, 0)
            }
        };
        tracing::trace!("worker pool shut down ({workers} workers)");

        DispatchStats {
            submitted: total,
            failed,
            workers: Some(workers),
        }
    }

    fn worker_thread<F>(ctx: WorkerContext<'_, '_, F>)
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let mut handled = 0usize;

        while let Ok(n) = ctx.work_rx.recv() {
            let completion = if is_cancelled(ctx.dispatch.token) {
                Completion::Skipped(n)
            } else {
                match ctx.dispatch.classify(n) {
                    Ok(classification) => Completion::Classified(classification),
                    Err(e) => Completion::Failed(e),
                }
            };

            if ctx.completion_tx.send(completion).is_err() {
                break; // Collector dropped
            }
            handled += 1;
        }

        tracing::trace!("worker-{} exiting after {handled} jobs", ctx.worker_id);
    }

    /// Drain exactly `total` completions and write each into the sink
    ///
    /// Returns the number of jobs that failed or never reported back.
    fn collect_completions<F>(
        &self,
        dispatch: &Dispatch<'_, F>,
        completion_rx: Receiver<Completion>,
        total: usize,
    ) -> usize
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let mut drained = 0;
        let mut failed = 0;

        while drained < total {
            let Ok(completion) = completion_rx.recv() else {
                break; // Every worker is gone
            };
            drained += 1;

            match completion {
                Completion::Classified(classification) => {
                    if !is_cancelled(dispatch.token) {
                        dispatch.sink.record(classification);
                    }
                }
                Completion::Failed(e) => {
                    tracing::error!("{e}; dropping it from results");
                    failed += 1;
                }
                Completion::Skipped(n) => tracing::trace!("{n} skipped after cancellation"),
            }
        }

        if drained < total {
            let missing = total - drained;
            tracing::error!("{missing} of {total} jobs never completed; worker pool unavailable");
            failed += missing;
        }

        failed
    }
}

/// Data-parallel fan-out over the range on rayon's global pool
pub struct StreamExecutor;

impl StreamExecutor {
    pub fn execute<F>(dispatch: &Dispatch<'_, F>) -> DispatchStats
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let failed = AtomicUsize::new(0);

        dispatch.range.clone().into_par_iter().for_each(|n| {
            if !dispatch.cooperative_task(n) {
                failed.fetch_add(1, Ordering::Relaxed);
            }
        });

        DispatchStats {
            submitted: dispatch.len(),
            failed: failed.into_inner(),
            workers: Some(rayon::current_num_threads()),
        }
    }
}
