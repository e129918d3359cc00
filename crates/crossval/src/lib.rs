//! # crossval
//!
//! A resampling-based model evaluation and comparison engine.
//!
//! ## Modules
//!
//! - **core** — Shared data model: `Frame`, `Partition`, `ResampleResult`, errors, seed streams
//! - **partition** — Deterministic partition generation: v-fold, repeated/stratified v-fold,
//!   bootstrap, Monte Carlo CV, rolling origin, validation split, leave-one-out
//! - **executor** — Parallel fit→predict→metric cycles with per-partition failure isolation,
//!   optional prediction retention, extraction hooks and cancellation
//! - **metrics** — Built-in regression metrics (RMSE, MAE, R²) and result aggregation:
//!   raw and summarized tables, failure diagnostics, CSV export
//! - **compare** — Paired frequentist contrasts and hierarchical Bayesian comparison with
//!   credible intervals and practical-equivalence probabilities
//!
//! Every stage is a pure function of its inputs plus an explicit seed, so a
//! whole run is recomputable from `(dataset, scheme, seed, config)`.

/// Shared data model.
pub use crossval_core as core;

/// Partition generation.
pub use crossval_partition as partition;

/// Resample execution.
pub use crossval_executor as executor;

/// Metrics and aggregation.
pub use crossval_metrics as metrics;

/// Model comparison.
pub use crossval_compare as compare;

pub use crossval_core::{EvalError, EvalResult, Frame, Partition, PartitionId, ResampleResult};
pub use crossval_executor::{run, Estimator, Metric, RunOptions};
pub use crossval_partition::Scheme;

#[cfg(test)]
mod tests {
    use super::*;
    use crossval_compare::{contrast, paired_contrast, Design, GibbsSampler, Priors, Sampler};
    use crossval_executor::BoxError;
    use crossval_metrics::{summarize, Mae, Rmse};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// y = 2x + 1 plus uniform noise.
    fn linear_frame(n: usize, noise: f64, seed: u64) -> Frame {
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| 2.0 * xi + 1.0 + noise * (rng.gen::<f64>() - 0.5))
            .collect();
        Frame::from_columns(vec![("x", x), ("y", y)]).unwrap()
    }

    /// Ordinary least squares on a single predictor column.
    struct SlopeModel;

    impl Estimator for SlopeModel {
        type Fitted = (f64, f64);

        fn fit(&self, frame: &Frame, rows: &[usize]) -> Result<(f64, f64), BoxError> {
            let x = frame.column("x").map_err(|e| e.to_string())?;
            let y = frame.column("y").map_err(|e| e.to_string())?;
            let n = rows.len() as f64;
            let mx = rows.iter().map(|&i| x[i]).sum::<f64>() / n;
            let my = rows.iter().map(|&i| y[i]).sum::<f64>() / n;
            let sxy: f64 = rows.iter().map(|&i| (x[i] - mx) * (y[i] - my)).sum();
            let sxx: f64 = rows.iter().map(|&i| (x[i] - mx) * (x[i] - mx)).sum();
            if sxx.abs() < 1e-12 {
                return Err("degenerate predictor".into());
            }
            let slope = sxy / sxx;
            Ok((my - slope * mx, slope))
        }

        fn predict(
            &self,
            fitted: &(f64, f64),
            frame: &Frame,
            rows: &[usize],
        ) -> Result<Vec<f64>, BoxError> {
            let x = frame.column("x").map_err(|e| e.to_string())?;
            Ok(rows.iter().map(|&i| fitted.0 + fitted.1 * x[i]).collect())
        }
    }

    /// Ignores the predictors entirely.
    struct MeanModel;

    impl Estimator for MeanModel {
        type Fitted = f64;

        fn fit(&self, frame: &Frame, rows: &[usize]) -> Result<f64, BoxError> {
            let y = frame.column("y").map_err(|e| e.to_string())?;
            Ok(rows.iter().map(|&i| y[i]).sum::<f64>() / rows.len() as f64)
        }

        fn predict(&self, fitted: &f64, _: &Frame, rows: &[usize]) -> Result<Vec<f64>, BoxError> {
            Ok(vec![*fitted; rows.len()])
        }
    }

    #[test]
    fn test_full_pipeline_favors_the_better_model() {
        let frame = linear_frame(60, 0.1, 21);
        let parts = Scheme::VFold { v: 10 }.partitions(&frame, 42).unwrap();
        let opts = RunOptions::new("y").with_workers(2);

        let slope_results = run(&frame, &parts, &SlopeModel, &[&Rmse, &Mae], None, &opts).unwrap();
        let mean_results = run(&frame, &parts, &MeanModel, &[&Rmse, &Mae], None, &opts).unwrap();

        let slope_summary = summarize(&slope_results);
        let mean_summary = summarize(&mean_results);
        assert_eq!(slope_summary.len(), 2);
        let slope_rmse = slope_summary.iter().find(|s| s.metric == "rmse").unwrap();
        let mean_rmse = mean_summary.iter().find(|s| s.metric == "rmse").unwrap();
        assert_eq!(slope_rmse.n, 10);
        assert!(slope_rmse.mean < mean_rmse.mean);

        // Paired contrast on the shared folds: slope minus mean is negative.
        let pc = paired_contrast(&slope_results, &mean_results, "rmse", 0.95).unwrap();
        assert_eq!(pc.n, 10);
        assert!(pc.mean_diff < 0.0);
        assert!(pc.upper < 0.0, "interval should exclude zero, got {pc:?}");

        // Bayesian comparison agrees on the direction.
        let design = Design::from_results(
            &[("slope", &slope_results), ("mean", &mean_results)],
            "rmse",
        )
        .unwrap();
        let priors = Priors {
            sigma_scale: 0.1,
            ..Priors::default()
        };
        let posterior = GibbsSampler { warmup: 500 }
            .sample(&design, &priors, 2, 1000, 42)
            .unwrap();
        let summary = contrast(&posterior, "slope", "mean")
            .unwrap()
            .summarize(0.01, 0.9)
            .unwrap();
        assert!(summary.estimate < 0.0);
        assert!(summary.prob_positive < 0.2, "p+ = {}", summary.prob_positive);
    }

    #[test]
    fn test_identical_models_are_practically_equivalent() {
        let frame = linear_frame(50, 0.2, 3);
        let parts = Scheme::VFold { v: 10 }.partitions(&frame, 7).unwrap();
        let opts = RunOptions::new("y");

        let a = run(&frame, &parts, &MeanModel, &[&Rmse], None, &opts).unwrap();
        let b = run(&frame, &parts, &MeanModel, &[&Rmse], None, &opts).unwrap();
        assert_eq!(a, b);

        let design = Design::from_results(&[("a", &a), ("b", &b)], "rmse").unwrap();
        let priors = Priors {
            sigma_scale: 0.1,
            ..Priors::default()
        };
        let posterior = GibbsSampler { warmup: 500 }
            .sample(&design, &priors, 2, 2000, 11)
            .unwrap();
        let summary = contrast(&posterior, "a", "b")
            .unwrap()
            .summarize(0.5, 0.95)
            .unwrap();

        // Identical per-partition values: the difference posterior is
        // centered on zero and lives inside any generous equivalence region.
        assert!(
            (0.35..=0.65).contains(&summary.prob_positive),
            "p+ = {}",
            summary.prob_positive
        );
        assert!(
            summary.prob_equivalent > 0.95,
            "rope = {}",
            summary.prob_equivalent
        );
    }

    #[test]
    fn test_reproducible_from_seed_and_config() {
        let frame = linear_frame(40, 0.3, 5);
        let scheme = Scheme::RepeatedVFold { v: 5, repeats: 2 };

        let run_once = || {
            let parts = scheme.partitions(&frame, 99).unwrap();
            run(
                &frame,
                &parts,
                &SlopeModel,
                &[&Rmse],
                None,
                &RunOptions::new("y").with_workers(4),
            )
            .unwrap()
        };
        assert_eq!(run_once(), run_once());
    }
}
