use serde::{Deserialize, Serialize};

use crossval_core::{EvalError, EvalResult, ResampleResult};

use crate::align::complete_cases;

/// Long-format design for the hierarchical comparison model.
///
/// One row per `(model, partition)` pair: the response is the partition's
/// metric value, `model` indexes the fixed-effect indicator (the first
/// model passed in is the reference, index 0), and `partition` indexes the
/// random intercept shared by every model evaluated on that partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub response: Vec<f64>,
    pub model: Vec<usize>,
    pub partition: Vec<usize>,
    pub model_names: Vec<String>,
    pub n_partitions: usize,
}

impl Design {
    /// Build the design from aligned result collections on one metric.
    ///
    /// Only partitions where every model succeeded contribute rows.
    pub fn from_results(
        models: &[(&str, &[ResampleResult])],
        metric: &str,
    ) -> EvalResult<Design> {
        if models.len() < 2 {
            return Err(EvalError::ComparatorPrecondition(
                "hierarchical comparison needs at least 2 models".into(),
            ));
        }

        let runs: Vec<&[ResampleResult]> = models.iter().map(|(_, r)| *r).collect();
        let cases = complete_cases(&runs, metric)?;
        if cases.len() < 2 {
            return Err(EvalError::ComparatorPrecondition(format!(
                "hierarchical comparison needs at least 2 complete partitions, found {}",
                cases.len()
            )));
        }

        let n_models = models.len();
        let n_partitions = cases.len();
        let mut response = Vec::with_capacity(n_models * n_partitions);
        let mut model = Vec::with_capacity(n_models * n_partitions);
        let mut partition = Vec::with_capacity(n_models * n_partitions);

        for (j, (_, values)) in cases.iter().enumerate() {
            for (m, &value) in values.iter().enumerate() {
                response.push(value);
                model.push(m);
                partition.push(j);
            }
        }

        Ok(Design {
            response,
            model,
            partition,
            model_names: models.iter().map(|(name, _)| name.to_string()).collect(),
            n_partitions,
        })
    }

    pub fn n_models(&self) -> usize {
        self.model_names.len()
    }

    pub fn n_rows(&self) -> usize {
        self.response.len()
    }
}
