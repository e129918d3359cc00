use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, cloneable across threads.
///
/// Cancellation is checked before each partition starts; work already
/// finished stays valid and is returned.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for one executor run.
///
/// `workers` follows the usual thread-count semantics: 0 = use the
/// ambient rayon pool, 1 = strictly sequential, n > 1 = a scoped pool of
/// exactly n threads. Memory scales with worker count, not partition
/// count, since each worker materializes only its own data slices.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Name of the frame column holding observed response values.
    pub response: String,
    /// Retain per-row (observed, predicted) pairs on each result.
    pub save_predictions: bool,
    pub workers: usize,
    pub cancel: Option<CancelToken>,
}

impl RunOptions {
    pub fn new(response: impl Into<String>) -> Self {
        RunOptions {
            response: response.into(),
            save_predictions: false,
            workers: 0,
            cancel: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_predictions(mut self) -> Self {
        self.save_predictions = true;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
