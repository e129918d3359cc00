use serde::{Deserialize, Serialize};

use crossval_core::{EvalError, EvalResult};

use crate::design::Design;

/// Prior configuration for the hierarchical comparison model.
///
/// Fixed-effect coefficients get a wide zero-centered normal prior of
/// scale `coef_scale` (uninformative by construction). Partition random
/// intercepts get a heavy-tailed zero-centered Student-t prior with
/// `intercept_df` degrees of freedom; the default of 1 suits the small
/// partition counts resampling produces. Residual and intercept scales
/// get positive, right-skewed priors governed by `sigma_scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    pub coef_scale: f64,
    pub intercept_df: f64,
    pub sigma_scale: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Priors {
            coef_scale: 10.0,
            intercept_df: 1.0,
            sigma_scale: 5.0,
        }
    }
}

/// Posterior draws of per-model mean performance.
///
/// `draws[m]` holds the combined post-warmup draws for model `m`, all
/// chains concatenated. Non-fatal sampler diagnostics (for instance a
/// convergence concern) land in `warnings` and are carried through every
/// downstream summary; validating convergence itself is the caller's
/// responsibility, not the engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    pub model_names: Vec<String>,
    pub draws: Vec<Vec<f64>>,
    pub warnings: Vec<String>,
}

impl Posterior {
    pub fn n_draws(&self) -> usize {
        self.draws.first().map_or(0, |d| d.len())
    }

    /// Draws for one model by name.
    pub fn model_draws(&self, name: &str) -> EvalResult<&[f64]> {
        self.model_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.draws[i].as_slice())
            .ok_or_else(|| {
                EvalError::ComparatorPrecondition(format!(
                    "model '{name}' is not part of this posterior"
                ))
            })
    }
}

/// The numerical sampling collaborator.
///
/// The engine specifies only this contract; any sampler that returns
/// per-model mean-performance draws can stand behind it. Implementations
/// must derive chain seeds deterministically from `seed` so identical
/// inputs reproduce identical posteriors, numerical nondeterminism of the
/// backend aside.
pub trait Sampler {
    fn sample(
        &self,
        design: &Design,
        priors: &Priors,
        chains: usize,
        iterations: usize,
        seed: u64,
    ) -> EvalResult<Posterior>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_draws_lookup() {
        let posterior = Posterior {
            model_names: vec!["lm".into(), "rf".into()],
            draws: vec![vec![0.1, 0.2], vec![0.3, 0.4]],
            warnings: vec![],
        };
        assert_eq!(posterior.n_draws(), 2);
        assert_eq!(posterior.model_draws("rf").unwrap(), &[0.3, 0.4]);
        assert!(posterior.model_draws("xgb").is_err());
    }
}
