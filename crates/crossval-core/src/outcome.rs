use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::partition::PartitionId;

/// One retained prediction: frame row index, observed and predicted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub row: usize,
    pub observed: f64,
    pub predicted: f64,
}

/// Why a partition produced no usable metrics.
///
/// Captured per partition by the executor; the run itself keeps going.
/// Predict failures are recorded at the fit stage since the fit/predict
/// boundary is internal to the model collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureNote {
    Fit { message: String },
    Metric { metric: String, message: String },
}

impl FailureNote {
    pub fn message(&self) -> &str {
        match self {
            FailureNote::Fit { message } => message,
            FailureNote::Metric { message, .. } => message,
        }
    }
}

/// Outcome of one fit→predict→metric cycle, immutable once produced.
///
/// A failed partition carries its [`FailureNote`] and an empty metric map;
/// the collector excludes it from aggregation but keeps it reachable for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleResult {
    pub id: PartitionId,
    pub metrics: BTreeMap<String, f64>,
    pub predictions: Option<Vec<Prediction>>,
    pub extracted: Option<serde_json::Value>,
    pub failure: Option<FailureNote>,
}

impl ResampleResult {
    pub fn succeeded(id: PartitionId, metrics: BTreeMap<String, f64>) -> Self {
        ResampleResult {
            id,
            metrics,
            predictions: None,
            extracted: None,
            failure: None,
        }
    }

    pub fn failed(id: PartitionId, note: FailureNote) -> Self {
        ResampleResult {
            id,
            metrics: BTreeMap::new(),
            predictions: None,
            extracted: None,
            failure: Some(note),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Metric estimate by name, `None` on failed partitions.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}
