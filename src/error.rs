use thiserror::Error;

/// Validation failures reported before a run starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("invalid range [{lo}, {hi}]: bounds must be non-negative and lo <= hi")]
    InvalidRange { lo: i64, hi: i64 },
    #[error("invalid pool capacity {0}: must be greater than zero")]
    InvalidCapacity(usize),
}

/// Failure of a single classification task
///
/// These never abort a run: the dispatcher logs them and drops the integer
/// from the results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("classification of {n} panicked: {message}")]
    Panicked { n: u64, message: String },
}

impl TaskError {
    pub(crate) fn from_panic(n: u64, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        TaskError::Panicked { n, message }
    }
}
