//! Shared aggregation context for a classification run
//!
//! A `ResultSink` is created by the caller, handed to a dispatcher by reference
//! for the duration of one run, and read back afterwards. Workers write into it
//! concurrently; every insertion happens under the collection's lock so an
//! entry is never observed half-written.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::factor::{Classification, DivisorList};

/// Callback invoked with the running prime count each time a new prime lands
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Default)]
pub struct ResultSink {
    primes: Mutex<BTreeSet<u64>>,
    nonprimes: Mutex<BTreeMap<u64, DivisorList>>,
    // Mirrors primes.len(); readable without taking the lock
    prime_count: AtomicUsize,
    on_prime: Option<ProgressCallback>,
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("primes", &self.prime_count())
            .field("nonprimes", &self.nonprime_count())
            .field("has_progress", &self.on_prime.is_some())
            .finish()
    }
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that reports the prime count after every new prime
    pub fn with_progress<F>(on_prime: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        Self {
            on_prime: Some(Box::new(on_prime)),
            ..Self::default()
        }
    }

    pub fn record_prime(&self, n: u64) {
        let count = {
            let mut primes = lock(&self.primes);
            if !primes.insert(n) {
                return;
            }
            let count = primes.len();
            self.prime_count.store(count, Ordering::Release);
            count
        };

        // Invoked outside the lock so a slow sink consumer never blocks writers
        if let Some(ref on_prime) = self.on_prime {
            on_prime(count);
        }
    }

    pub fn record_composite(&self, n: u64, divisors: DivisorList) {
        lock(&self.nonprimes).insert(n, divisors);
    }

    /// Route a classification into the matching collection
    pub fn record(&self, classification: Classification) {
        match classification {
            Classification::Prime(n) => self.record_prime(n),
            Classification::Composite(n, divisors) => self.record_composite(n, divisors),
        }
    }

    /// Clear both collections ahead of the next run
    pub fn reset(&self) {
        let mut primes = lock(&self.primes);
        let mut nonprimes = lock(&self.nonprimes);
        primes.clear();
        nonprimes.clear();
        self.prime_count.store(0, Ordering::Release);
    }

    /// Number of primes recorded so far; safe to read while a run is in flight
    pub fn prime_count(&self) -> usize {
        self.prime_count.load(Ordering::Acquire)
    }

    pub fn nonprime_count(&self) -> usize {
        lock(&self.nonprimes).len()
    }

    pub fn is_empty(&self) -> bool {
        self.prime_count() == 0 && self.nonprime_count() == 0
    }

    pub fn contains_prime(&self, n: u64) -> bool {
        lock(&self.primes).contains(&n)
    }

    pub fn divisors_of(&self, n: u64) -> Option<DivisorList> {
        lock(&self.nonprimes).get(&n).cloned()
    }

    /// Snapshot of the prime set in ascending order
    pub fn primes(&self) -> BTreeSet<u64> {
        lock(&self.primes).clone()
    }

    /// Snapshot of the composite mapping in ascending key order
    pub fn nonprimes(&self) -> BTreeMap<u64, DivisorList> {
        lock(&self.nonprimes).clone()
    }
}

// A task that panicked never holds one of these locks while panicking, but a
// poisoned mutex must still not make the sink unusable for the next run.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_routes_by_classification() {
        let sink = ResultSink::new();
        sink.record(Classification::of(7));
        sink.record(Classification::of(8));

        assert!(sink.contains_prime(7));
        assert_eq!(sink.divisors_of(8), Some(vec![1, 2, 4, 8]));
        assert_eq!(sink.prime_count(), 1);
        assert_eq!(sink.nonprime_count(), 1);
    }

    #[test]
    fn test_duplicate_prime_does_not_notify_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let sink = ResultSink::with_progress(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        sink.record_prime(5);
        sink.record_prime(5);

        assert_eq!(sink.prime_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let sink = ResultSink::new();
        sink.record_prime(2);
        sink.record_composite(4, vec![1, 2, 4]);
        assert!(!sink.is_empty());

        sink.reset();

        assert!(sink.is_empty());
        assert_eq!(sink.prime_count(), 0);
        assert!(sink.primes().is_empty());
        assert!(sink.nonprimes().is_empty());
    }

    #[test]
    fn test_concurrent_writes_lose_nothing() {
        let sink = ResultSink::new();

        crossbeam::thread::scope(|s| {
            for worker in 0..8u64 {
                let sink = &sink;
                s.spawn(move |_| {
                    for i in 0..500u64 {
                        let n = worker * 1_000 + i;
                        if n % 2 == 0 {
                            sink.record_prime(n);
                        } else {
                            sink.record_composite(n, vec![1, n]);
                        }
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(sink.prime_count(), 8 * 250);
        assert_eq!(sink.primes().len(), 8 * 250);
        assert_eq!(sink.nonprime_count(), 8 * 250);
    }

    #[test]
    fn test_progress_counts_are_monotonic_per_prime() {
        let counts = Arc::new(Mutex::new(Vec::new()));
        let seen = counts.clone();
        let sink = ResultSink::with_progress(move |count| {
            seen.lock().unwrap().push(count);
        });

        for n in [2, 3, 5, 7] {
            sink.record_prime(n);
        }

        assert_eq!(*counts.lock().unwrap(), vec![1, 2, 3, 4]);
    }
}
