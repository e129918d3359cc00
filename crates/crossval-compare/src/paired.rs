use serde::{Deserialize, Serialize};

use crossval_core::{EvalError, EvalResult, ResampleResult};

use crate::align::complete_cases;
use crate::stat::{mean, sample_variance, t_quantile_two_tailed};

/// Paired frequentist contrast between two models on one metric.
///
/// Per-partition differences `d_i = metric_a_i − metric_b_i` cancel the
/// resample-to-resample correlation component shared by both models, so a
/// one-sample location estimate on `{d_i}` is the honest comparison where
/// an unpaired test of the raw means would not be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedContrast {
    pub metric: String,
    /// Mean of the per-partition differences (model A minus model B).
    pub mean_diff: f64,
    pub std_err: f64,
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    /// Number of complete pairs that contributed.
    pub n: usize,
}

/// Compute the paired contrast at confidence `level` (e.g. 0.95).
///
/// Both models must have been run over the same partition set; pairs
/// where either model failed are dropped.
pub fn paired_contrast(
    a: &[ResampleResult],
    b: &[ResampleResult],
    metric: &str,
    level: f64,
) -> EvalResult<PairedContrast> {
    if !(0.0 < level && level < 1.0) {
        return Err(EvalError::ComparatorPrecondition(format!(
            "confidence level must be in (0, 1), got {level}"
        )));
    }

    let cases = complete_cases(&[a, b], metric)?;
    let diffs: Vec<f64> = cases.iter().map(|(_, v)| v[0] - v[1]).collect();
    if diffs.len() < 2 {
        return Err(EvalError::ComparatorPrecondition(format!(
            "paired contrast needs at least 2 complete pairs, found {}",
            diffs.len()
        )));
    }

    let n = diffs.len();
    let mean_diff = mean(&diffs);
    let std_err = (sample_variance(&diffs) / n as f64).sqrt();
    let t = t_quantile_two_tailed(1.0 - level, n - 1);

    Ok(PairedContrast {
        metric: metric.to_string(),
        mean_diff,
        std_err,
        lower: mean_diff - t * std_err,
        upper: mean_diff + t * std_err,
        level,
        n,
    })
}
