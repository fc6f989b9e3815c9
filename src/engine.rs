//! Single entry point for classifying a range
//!
//! Validates a request, picks the dispatcher, times the run, fires the
//! completion notification and summarises the sink into a [`RunReport`].

use serde::{Deserialize, Serialize, Serializer};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::ClassifyError;
use crate::factor::{DivisorList, factors};
use crate::parallel::{CancellationToken, Dispatch, Strategy, default_pool_workers};
use crate::sink::ResultSink;

/// Smallest value that is either prime or composite
const FIRST_CLASSIFIABLE: u64 = 2;

/// What a caller asks for: an inclusive range, a strategy and an optional pool size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub lo: i64,
    pub hi: i64,
    pub strategy: Strategy,
    /// Pool capacity; `None` means hardware concurrency + 1
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl ClassifyRequest {
    pub fn new(lo: i64, hi: i64, strategy: Strategy) -> Self {
        Self {
            lo,
            hi,
            strategy,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Check the request and return the integers that will actually be classified
    ///
    /// 0 and 1 are accepted in a range but skipped, so the returned range may be empty.
    pub fn validate(&self) -> Result<RangeInclusive<u64>, ClassifyError> {
        if self.lo < 0 || self.hi < 0 || self.lo > self.hi {
            return Err(ClassifyError::InvalidRange {
                lo: self.lo,
                hi: self.hi,
            });
        }
        if let Some(0) = self.capacity {
            return Err(ClassifyError::InvalidCapacity(0));
        }

        let lo = (self.lo as u64).max(FIRST_CLASSIFIABLE);
        Ok(lo..=self.hi as u64)
    }

    /// Pool capacity this request resolves to
    pub fn workers(&self) -> usize {
        self.capacity.unwrap_or_else(default_pool_workers)
    }
}

/// Summary of one finished (or cancelled) run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub strategy: Strategy,
    pub lo: i64,
    pub hi: i64,
    pub workers: Option<usize>,
    pub submitted: usize,
    pub failed: usize,
    pub cancelled: bool,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub primes: usize,
    pub nonprimes: usize,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

type CompletionHook<'a> = Box<dyn FnOnce(&RunReport) + Send + 'a>;

/// Builder for a single run over a caller-owned sink
///
/// ```rust
/// use factorizer::engine::{ClassifyRequest, RangeRun};
/// use factorizer::parallel::Strategy;
/// use factorizer::sink::ResultSink;
///
/// let sink = ResultSink::new();
/// let report = RangeRun::new(ClassifyRequest::new(2, 13, Strategy::Stream), &sink)
///     .on_complete(|report| println!("done in {:?}", report.elapsed))
///     .run()?;
///
/// assert_eq!(report.primes, 6);
/// assert_eq!(sink.divisors_of(12), Some(vec![1, 2, 3, 4, 6, 12]));
/// # Ok::<(), factorizer::error::ClassifyError>(())
/// ```
pub struct RangeRun<'a> {
    request: ClassifyRequest,
    sink: &'a ResultSink,
    token: Option<CancellationToken>,
    on_complete: Option<CompletionHook<'a>>,
}

impl<'a> RangeRun<'a> {
    pub fn new(request: ClassifyRequest, sink: &'a ResultSink) -> Self {
        Self {
            request,
            sink,
            token: None,
            on_complete: None,
        }
    }

    pub fn token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Called exactly once after every worker has stopped, cancelled or not
    pub fn on_complete<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&RunReport) + Send + 'a,
    {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn run(self) -> Result<RunReport, ClassifyError> {
        self.run_with(factors)
    }

    /// Run with a custom per-integer classifier in place of trial division
    pub fn run_with<F>(self, factor: F) -> Result<RunReport, ClassifyError>
    where
        F: Fn(u64) -> DivisorList + Sync,
    {
        let range = self.request.validate()?;
        let strategy = self.request.strategy;
        let workers = self.request.workers();

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("classify", %run_id, %strategy);
        let _enter = span.enter();

        let dispatch = Dispatch::new(range, self.sink, factor).with_token(self.token.as_ref());
        tracing::debug!(
            "classifying [{}, {}] ({} candidates)",
            self.request.lo,
            self.request.hi,
            dispatch.len()
        );

        let start = Instant::now();
        let stats = dispatch.run(strategy, workers);
        let elapsed = start.elapsed();

        // Sequential never looks at the token, so it always runs to the end
        let cancelled = strategy != Strategy::Sequential
            && self.token.as_ref().is_some_and(CancellationToken::is_cancelled);

        let report = RunReport {
            run_id,
            strategy,
            lo: self.request.lo,
            hi: self.request.hi,
            workers: stats.workers,
            submitted: stats.submitted,
            failed: stats.failed,
            cancelled,
            elapsed,
            primes: self.sink.prime_count(),
            nonprimes: self.sink.nonprime_count(),
        };

        if report.cancelled {
            tracing::info!("run cancelled after {:?}", elapsed);
        } else {
            tracing::debug!(
                "run finished in {:?}: {} primes, {} nonprimes, {} failed",
                elapsed,
                report.primes,
                report.nonprimes,
                report.failed
            );
        }

        if let Some(hook) = self.on_complete {
            hook(&report);
        }

        Ok(report)
    }
}

/// Classify `[request.lo, request.hi]` into `sink`
pub fn classify_range(
    request: &ClassifyRequest,
    sink: &ResultSink,
    token: Option<&CancellationToken>,
) -> Result<RunReport, ClassifyError> {
    let mut run = RangeRun::new(*request, sink);
    if let Some(token) = token {
        run = run.token(token.clone());
    }
    run.run()
}
