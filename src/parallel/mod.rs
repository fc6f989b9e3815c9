//! Execution strategies for range classification
//!
//! This module owns task scheduling. It knows nothing about how a number is
//! factored (that is the injected classifier function) or how results are
//! presented (that is the caller's business); it only decides which thread
//! classifies which integer and when the result is written.
//!
//! # Strategies
//!
//! ```text
//! Sequential   one control thread, input order
//! Unbounded    one thread per integer, no cap
//! Pool         W workers ──▶ completion channel ──▶ dispatching thread writes
//! Stream       rayon parallel iterator, runtime-managed worker count
//! ```
//!
//! Every strategy produces the same final sink contents for a completed run;
//! only the order in which primes are reported differs.
//!
//! # Cancellation
//!
//! The unbounded, pool and stream strategies take an optional
//! [`CancellationToken`]. Each task checks it before classifying and again
//! before writing. A task that sees the flag set simply does not publish.
//!
//! # Example Usage
//!
//! ```rust
//! use factorizer::factor::factors;
//! use factorizer::parallel::{Dispatch, Strategy};
//! use factorizer::sink::ResultSink;
//!
//! let sink = ResultSink::new();
//! let stats = Dispatch::new(2..=100, &sink, factors).run(Strategy::Pool, 4);
//!
//! assert_eq!(stats.submitted, 99);
//! assert_eq!(sink.prime_count(), 25);
//! ```

pub mod cancel;
pub mod core;
pub mod progress;

// Re-export main types for easier access
pub use cancel::CancellationToken;
pub use self::core::{
    Dispatch, DispatchStats, PoolExecutor, SequentialExecutor, StreamExecutor, Strategy,
    UnboundedExecutor, default_pool_workers,
};
pub use progress::PrimeProgress;
