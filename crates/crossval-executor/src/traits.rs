use crossval_core::Frame;

/// Opaque collaborator failure, captured per partition by the executor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A black-box model: fit on analysis rows, predict on assessment rows.
///
/// The engine owns neither the algorithm nor its failure modes; anything
/// the collaborator returns as an error becomes a per-partition failure
/// note instead of aborting the run.
pub trait Estimator: Sync {
    type Fitted: Send;

    fn fit(&self, frame: &Frame, rows: &[usize]) -> Result<Self::Fitted, BoxError>;

    fn predict(
        &self,
        fitted: &Self::Fitted,
        frame: &Frame,
        rows: &[usize],
    ) -> Result<Vec<f64>, BoxError>;
}

/// A performance metric over observed vs predicted values.
pub trait Metric: Sync {
    fn name(&self) -> &str;

    fn compute(&self, observed: &[f64], predicted: &[f64]) -> Result<f64, BoxError>;
}

/// Capability for post-hoc inspection of a fitted model.
///
/// Applied per partition, independent of metric computation; the payload
/// is attached to the partition's result as-is.
pub trait Extract<F>: Sync {
    fn extract(&self, fitted: &F) -> serde_json::Value;
}

impl<F, T> Extract<F> for T
where
    T: Fn(&F) -> serde_json::Value + Sync,
{
    fn extract(&self, fitted: &F) -> serde_json::Value {
        self(fitted)
    }
}
