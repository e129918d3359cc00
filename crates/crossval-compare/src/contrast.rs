use serde::{Deserialize, Serialize};

use crossval_core::{EvalError, EvalResult};

use crate::sampler::Posterior;
use crate::stat::{mean, quantile};

/// Posterior distribution of `mean(model_a) − mean(model_b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    pub model_a: String,
    pub model_b: String,
    pub diffs: Vec<f64>,
    pub warnings: Vec<String>,
}

/// Summary of a contrast distribution.
///
/// `prob_equivalent` is the practical-equivalence probability: the
/// posterior mass inside `[-effect_size, effect_size]`, the region within
/// which the two models are deemed practically indistinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastSummary {
    pub model_a: String,
    pub model_b: String,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    pub prob_positive: f64,
    pub prob_equivalent: f64,
    pub warnings: Vec<String>,
}

/// Contrast two models by subtracting their aligned posterior draws.
pub fn contrast(posterior: &Posterior, model_a: &str, model_b: &str) -> EvalResult<Contrast> {
    let a = posterior.model_draws(model_a)?;
    let b = posterior.model_draws(model_b)?;
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    if diffs.is_empty() {
        return Err(EvalError::ComparatorPrecondition(
            "posterior has no draws to contrast".into(),
        ));
    }
    Ok(Contrast {
        model_a: model_a.to_string(),
        model_b: model_b.to_string(),
        diffs,
        warnings: posterior.warnings.clone(),
    })
}

impl Contrast {
    /// Summarize with a central credible interval of mass `level` and a
    /// caller-supplied practical-equivalence half-width.
    ///
    /// `effect_size` is a subjective judgment about what difference
    /// matters in the metric's units; it is never inferred from the data.
    pub fn summarize(&self, effect_size: f64, level: f64) -> EvalResult<ContrastSummary> {
        if effect_size <= 0.0 {
            return Err(EvalError::ComparatorPrecondition(format!(
                "effect size must be positive, got {effect_size}"
            )));
        }
        if !(0.0 < level && level < 1.0) {
            return Err(EvalError::ComparatorPrecondition(format!(
                "credible level must be in (0, 1), got {level}"
            )));
        }

        let n = self.diffs.len() as f64;
        let tail = (1.0 - level) / 2.0;
        let prob_positive = self.diffs.iter().filter(|&&d| d > 0.0).count() as f64 / n;
        let prob_equivalent =
            self.diffs.iter().filter(|&&d| d.abs() <= effect_size).count() as f64 / n;

        Ok(ContrastSummary {
            model_a: self.model_a.clone(),
            model_b: self.model_b.clone(),
            estimate: mean(&self.diffs),
            lower: quantile(&self.diffs, tail),
            upper: quantile(&self.diffs, 1.0 - tail),
            level,
            prob_positive,
            prob_equivalent,
            warnings: self.warnings.clone(),
        })
    }
}
