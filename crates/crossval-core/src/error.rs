use thiserror::Error;

/// Core error type for the resampling engine.
///
/// Per-partition model and metric failures are not represented here: they
/// are recovered locally by the executor and attached to the partition's
/// result as a [`crate::FailureNote`]. This enum covers the fatal cases.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("insufficient data: {reason} (n = {n})")]
    InsufficientData { n: usize, reason: String },

    #[error("column '{name}' not found in frame")]
    MissingColumn { name: String },

    #[error("column '{name}' has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("comparison precondition violated: {0}")]
    ComparatorPrecondition(String),

    #[error("posterior sampler failed: {0}")]
    Sampler(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    /// Shorthand for the generation-time size check failures.
    pub fn insufficient(n: usize, reason: impl Into<String>) -> Self {
        EvalError::InsufficientData {
            n,
            reason: reason.into(),
        }
    }
}
