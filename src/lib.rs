//! # Factorizer - prime/composite classification with pluggable concurrency
//!
//! Factorizer classifies every integer in a range as prime or composite and
//! records each composite with its full divisor list. The same workload can be
//! driven by four execution strategies so their throughput and responsiveness
//! can be compared:
//!
//! - **Sequential**: one control thread, input order
//! - **Unbounded**: one thread per integer, no cap (baseline, degrades on large ranges)
//! - **Pool**: fixed worker pool with a completion channel drained in arrival order
//! - **Stream**: rayon parallel iterator over the range
//!
//! ## Quick Start
//!
//! ```bash
//! # Classify [2, 100000] with the default (pool) strategy
//! factorizer run --end 100000
//!
//! # Same range, every strategy, side by side
//! factorizer compare --end 100000
//!
//! # Live prime counter, Ctrl-C to cancel
//! factorizer watch --start 2 --end 5000000
//! ```
//!
//! ## Library Usage
//!
//! ```rust
//! use factorizer::{ClassifyRequest, ResultSink, Strategy, classify_range};
//!
//! let sink = ResultSink::new();
//! let request = ClassifyRequest::new(2, 13, Strategy::Pool).with_capacity(4);
//! let report = classify_range(&request, &sink, None)?;
//!
//! assert_eq!(report.primes, 6);
//! assert_eq!(sink.divisors_of(12), Some(vec![1, 2, 3, 4, 6, 12]));
//! # Ok::<(), factorizer::ClassifyError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod factor;
pub mod parallel;
pub mod sink;

pub use engine::{ClassifyRequest, RangeRun, RunReport, classify_range};
pub use error::{ClassifyError, TaskError};
pub use parallel::{CancellationToken, Strategy};
pub use sink::ResultSink;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
