use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Live "Primes: N" display fed by a sink's progress callback
///
/// Cheap to clone; every clone drives the same bar, so it can be moved into a
/// sink callback and still be finished from the thread that owns the run.
#[derive(Clone)]
pub struct PrimeProgress {
    bar: ProgressBar,
    latest: Arc<AtomicUsize>,
}

impl PrimeProgress {
    /// Create a spinner that redraws at most every `refresh_ms` milliseconds
    pub fn new(label: &str, refresh_ms: u64) -> Self {
        let style =
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {prefix:.bold} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.set_message("Primes: 0");
        bar.enable_steady_tick(Duration::from_millis(refresh_ms.max(10)));

        Self {
            bar,
            latest: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A reporter that tracks counts but never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            latest: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Record a new prime count; safe to call from any worker thread
    ///
    /// Notifications from different workers can arrive out of order, so the
    /// display only ever moves forward.
    pub fn update(&self, count: usize) {
        let previous = self.latest.fetch_max(count, Ordering::AcqRel);
        if count > previous {
            self.bar.set_message(format!("Primes: {count}"));
        }
    }

    /// Highest count seen so far
    pub fn latest(&self) -> usize {
        self.latest.load(Ordering::Acquire)
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self, message: String) {
        self.bar.abandon_with_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_only_moves_forward() {
        let progress = PrimeProgress::hidden();
        progress.update(3);
        progress.update(1);
        progress.update(5);
        assert_eq!(progress.latest(), 5);
        progress.finish("done".to_string());
    }

    #[test]
    fn test_progress_shared_across_threads() {
        let progress = PrimeProgress::hidden();

        crossbeam::thread::scope(|s| {
            for worker in 0..4 {
                let progress = progress.clone();
                s.spawn(move |_| {
                    for i in 0..100 {
                        progress.update(worker * 100 + i);
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(progress.latest(), 399);
    }

    #[test]
    fn test_visible_progress_can_be_abandoned() {
        let progress = PrimeProgress::new("test", 50);
        progress.update(2);
        progress.abandon("cancelled".to_string());
    }
}
