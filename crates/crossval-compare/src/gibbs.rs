use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crossval_core::{stream_seed, EvalError, EvalResult};

use crate::design::Design;
use crate::sampler::{Posterior, Priors, Sampler};

/// Reference Gibbs sampler for the hierarchical comparison model.
///
/// Conjugate sweeps over: fixed-effect coefficients (normal), partition
/// random intercepts (normal given their latent scales), the Student-t
/// scale mixture variables, the intercept scale and the residual variance
/// (inverse-gamma). `iterations` counts retained draws per chain, taken
/// after `warmup` discarded sweeps. Chain seeds derive from the run seed,
/// so the posterior is reproducible bit-for-bit.
///
/// This is one implementation of [`Sampler`] like any external one; a
/// gradient-based backend can replace it without touching the engine.
#[derive(Debug, Clone)]
pub struct GibbsSampler {
    pub warmup: usize,
}

impl Default for GibbsSampler {
    fn default() -> Self {
        GibbsSampler { warmup: 500 }
    }
}

impl Sampler for GibbsSampler {
    fn sample(
        &self,
        design: &Design,
        priors: &Priors,
        chains: usize,
        iterations: usize,
        seed: u64,
    ) -> EvalResult<Posterior> {
        if chains == 0 || iterations == 0 {
            return Err(EvalError::Sampler(
                "chains and iterations must both be >= 1".into(),
            ));
        }
        if priors.coef_scale <= 0.0 || priors.intercept_df <= 0.0 || priors.sigma_scale <= 0.0 {
            return Err(EvalError::Sampler("prior scales must be positive".into()));
        }

        let chain_draws: Vec<Vec<Vec<f64>>> = (0..chains)
            .map(|c| run_chain(design, priors, self.warmup, iterations, stream_seed(seed, c as u64)))
            .collect();

        let m = design.n_models();
        let mut draws: Vec<Vec<f64>> = vec![Vec::with_capacity(chains * iterations); m];
        for chain in &chain_draws {
            for (model, series) in chain.iter().enumerate() {
                draws[model].extend_from_slice(series);
            }
        }

        let mut warnings = Vec::new();
        for model in 0..m {
            if let Some(rhat) = split_rhat(&chain_draws, model) {
                if rhat > 1.1 {
                    warnings.push(format!(
                        "potential non-convergence for model '{}' (split R-hat = {:.2})",
                        design.model_names[model], rhat
                    ));
                }
            }
        }

        Ok(Posterior {
            model_names: design.model_names.clone(),
            draws,
            warnings,
        })
    }
}

/// One chain; returns `iterations` retained draws of each model's mean.
fn run_chain(
    design: &Design,
    priors: &Priors,
    warmup: usize,
    iterations: usize,
    seed: u64,
) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let m = design.n_models();
    let j = design.n_partitions;
    let n = design.n_rows();
    let y = &design.response;

    let rows_by_model: Vec<Vec<usize>> = (0..m)
        .map(|k| (0..n).filter(|&i| design.model[i] == k).collect())
        .collect();
    let rows_by_partition: Vec<Vec<usize>> = (0..j)
        .map(|g| (0..n).filter(|&i| design.partition[i] == g).collect())
        .collect();

    let coef_prec = 1.0 / (priors.coef_scale * priors.coef_scale);
    let df = priors.intercept_df;

    // State. The intercept starts at the grand mean; everything else at
    // the prior center.
    let mut beta = vec![0.0; m];
    beta[0] = y.iter().sum::<f64>() / n as f64;
    let mut b = vec![0.0; j];
    let mut lambda = vec![1.0f64; j];
    let mut tau2 = 1.0f64;
    let mut sigma2 = residual_floor(y);

    let fitted = |i: usize, beta: &[f64], b: &[f64]| -> f64 {
        let k = design.model[i];
        let offset = if k == 0 { 0.0 } else { beta[k] };
        beta[0] + offset + b[design.partition[i]]
    };

    let mut draws: Vec<Vec<f64>> = vec![Vec::with_capacity(iterations); m];
    for sweep in 0..(warmup + iterations) {
        // Fixed effects, coordinate-wise. The intercept sees every row;
        // coefficient k sees only model k's rows.
        for k in 0..m {
            let mut sum_r = 0.0;
            let mut count = 0usize;
            if k == 0 {
                for i in 0..n {
                    let model_i = design.model[i];
                    let offset = if model_i == 0 { 0.0 } else { beta[model_i] };
                    sum_r += y[i] - offset - b[design.partition[i]];
                    count += 1;
                }
            } else {
                for &i in &rows_by_model[k] {
                    sum_r += y[i] - beta[0] - b[design.partition[i]];
                    count += 1;
                }
            }
            let prec = count as f64 / sigma2 + coef_prec;
            let mean = (sum_r / sigma2) / prec;
            beta[k] = mean + standard_normal(&mut rng) / prec.sqrt();
        }

        // Partition random intercepts.
        for g in 0..j {
            let rows = &rows_by_partition[g];
            let mut sum_r = 0.0;
            for &i in rows {
                let k = design.model[i];
                let offset = if k == 0 { 0.0 } else { beta[k] };
                sum_r += y[i] - beta[0] - offset;
            }
            let prior_prec = 1.0 / (tau2 * lambda[g]).max(1e-12);
            let prec = rows.len() as f64 / sigma2 + prior_prec;
            let mean = (sum_r / sigma2) / prec;
            b[g] = mean + standard_normal(&mut rng) / prec.sqrt();
        }

        // Latent scales of the Student-t intercept prior.
        for g in 0..j {
            let shape = (df + 1.0) / 2.0;
            let scale = (df + b[g] * b[g] / tau2.max(1e-12)) / 2.0;
            lambda[g] = inverse_gamma(shape, scale, &mut rng);
        }

        // Intercept scale.
        let ss_b: f64 = (0..j).map(|g| b[g] * b[g] / lambda[g].max(1e-12)).sum();
        tau2 = inverse_gamma(1.0 + j as f64 / 2.0, priors.sigma_scale + 0.5 * ss_b, &mut rng);

        // Residual variance.
        let ss: f64 = (0..n)
            .map(|i| {
                let r = y[i] - fitted(i, &beta, &b);
                r * r
            })
            .sum();
        sigma2 = inverse_gamma(1.0 + n as f64 / 2.0, priors.sigma_scale + 0.5 * ss, &mut rng);

        if sweep >= warmup {
            for k in 0..m {
                let mean = if k == 0 { beta[0] } else { beta[0] + beta[k] };
                draws[k].push(mean);
            }
        }
    }
    draws
}

/// Starting residual variance: the response variance, floored away from 0.
fn residual_floor(y: &[f64]) -> f64 {
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    let var = y.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / y.len() as f64;
    var.max(1e-6)
}

/// Standard normal via Box-Muller.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Gamma(shape, scale 1) via Marsaglia–Tsang squeeze.
fn gamma(shape: f64, rng: &mut StdRng) -> f64 {
    if shape < 1.0 {
        // Boost: Gamma(a) = Gamma(a + 1) * U^(1/a).
        let u: f64 = rng.gen::<f64>().max(1e-10);
        return gamma(shape + 1.0, rng) * u.powf(1.0 / shape);
    }
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u: f64 = rng.gen::<f64>().max(1e-10);
        if u < 1.0 - 0.0331 * x * x * x * x {
            return d * v;
        }
        if u.ln() < 0.5 * x * x + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

/// InverseGamma(shape, scale): `scale / Gamma(shape, 1)`.
fn inverse_gamma(shape: f64, scale: f64, rng: &mut StdRng) -> f64 {
    (scale / gamma(shape, rng)).max(1e-12)
}

/// Split R-hat over the retained draws of one model, `None` when there is
/// too little data or the chains are degenerate.
fn split_rhat(chain_draws: &[Vec<Vec<f64>>], model: usize) -> Option<f64> {
    let mut sequences: Vec<&[f64]> = Vec::new();
    for chain in chain_draws {
        let series = &chain[model];
        if series.len() < 4 {
            return None;
        }
        let half = series.len() / 2;
        sequences.push(&series[..half]);
        sequences.push(&series[half..half * 2]);
    }

    let len = sequences[0].len() as f64;
    let means: Vec<f64> = sequences
        .iter()
        .map(|s| s.iter().sum::<f64>() / s.len() as f64)
        .collect();
    let vars: Vec<f64> = sequences
        .iter()
        .zip(&means)
        .map(|(s, m)| s.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (s.len() - 1) as f64)
        .collect();

    let w = vars.iter().sum::<f64>() / vars.len() as f64;
    if w < 1e-12 {
        return None;
    }
    let grand = means.iter().sum::<f64>() / means.len() as f64;
    let b = len * means.iter().map(|m| (m - grand) * (m - grand)).sum::<f64>()
        / (means.len() - 1) as f64;
    let var_plus = (len - 1.0) / len * w + b / len;
    Some((var_plus / w).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossval_core::{PartitionId, ResampleResult};
    use std::collections::BTreeMap;

    fn run_values(values: &[f64]) -> Vec<ResampleResult> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut metrics = BTreeMap::new();
                metrics.insert("rmse".to_string(), v);
                ResampleResult::succeeded(PartitionId::fold(i as u32), metrics)
            })
            .collect()
    }

    fn test_priors() -> Priors {
        Priors {
            sigma_scale: 1.0,
            ..Priors::default()
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let a = run_values(&[1.0, 1.2, 0.9, 1.1, 1.3, 0.8]);
        let b = run_values(&[1.4, 1.7, 1.2, 1.6, 1.8, 1.1]);
        let design = Design::from_results(&[("a", &a), ("b", &b)], "rmse").unwrap();

        let sampler = GibbsSampler { warmup: 100 };
        let p1 = sampler.sample(&design, &test_priors(), 2, 200, 42).unwrap();
        let p2 = sampler.sample(&design, &test_priors(), 2, 200, 42).unwrap();
        assert_eq!(p1.draws, p2.draws);

        let p3 = sampler.sample(&design, &test_priors(), 2, 200, 43).unwrap();
        assert_ne!(p1.draws, p3.draws);
    }

    #[test]
    fn test_recovers_model_offset() {
        // Model B sits a constant 1.0 above model A on every partition.
        let base: Vec<f64> = (0..10).map(|i| 1.0 + 0.05 * i as f64).collect();
        let shifted: Vec<f64> = base.iter().map(|v| v + 1.0).collect();
        let a = run_values(&base);
        let b = run_values(&shifted);
        let design = Design::from_results(&[("a", &a), ("b", &b)], "rmse").unwrap();

        let sampler = GibbsSampler { warmup: 500 };
        let posterior = sampler.sample(&design, &test_priors(), 2, 1000, 7).unwrap();

        let mean_a: f64 = posterior.model_draws("a").unwrap().iter().sum::<f64>() / 2000.0;
        let mean_b: f64 = posterior.model_draws("b").unwrap().iter().sum::<f64>() / 2000.0;
        assert!(
            ((mean_b - mean_a) - 1.0).abs() < 0.3,
            "recovered offset {}",
            mean_b - mean_a
        );
    }

    #[test]
    fn test_draw_counts() {
        let a = run_values(&[1.0, 2.0, 3.0]);
        let b = run_values(&[1.1, 2.1, 3.1]);
        let design = Design::from_results(&[("a", &a), ("b", &b)], "rmse").unwrap();
        let posterior = GibbsSampler { warmup: 50 }
            .sample(&design, &test_priors(), 3, 100, 1)
            .unwrap();
        assert_eq!(posterior.n_draws(), 300);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let a = run_values(&[1.0, 2.0]);
        let b = run_values(&[1.1, 2.1]);
        let design = Design::from_results(&[("a", &a), ("b", &b)], "rmse").unwrap();
        let sampler = GibbsSampler::default();
        assert!(sampler.sample(&design, &test_priors(), 0, 100, 1).is_err());
        let bad = Priors {
            coef_scale: -1.0,
            ..Priors::default()
        };
        assert!(sampler.sample(&design, &bad, 2, 100, 1).is_err());
    }
}
