use std::collections::BTreeMap;

use crossval_core::{EvalResult, FailureNote, Frame, Partition, Prediction, ResampleResult};

use crate::options::RunOptions;
use crate::parallel::run_with_workers;
use crate::traits::{Estimator, Extract, Metric};

/// Run fit→predict→metric cycles over `partitions`.
///
/// Each partition is independent: a fit, predict or metric failure is
/// recorded as that partition's [`FailureNote`] and the remaining
/// partitions keep running. Results are sorted by partition id, so the
/// output order is deterministic regardless of the execution schedule.
///
/// A missing response column is fatal and reported before any fitting.
/// When a cancel token fires, partitions that have not started are
/// skipped and the finished results are returned.
pub fn run<E: Estimator>(
    frame: &Frame,
    partitions: &[Partition],
    estimator: &E,
    metrics: &[&dyn Metric],
    extractor: Option<&dyn Extract<E::Fitted>>,
    opts: &RunOptions,
) -> EvalResult<Vec<ResampleResult>> {
    let observed_col = frame.column(&opts.response)?;

    let n = frame.n_rows();
    for partition in partitions {
        let out_of_range = partition
            .analysis
            .iter()
            .chain(partition.assessment.iter())
            .any(|&row| row >= n);
        if out_of_range {
            return Err(crossval_core::EvalError::insufficient(
                n,
                format!("partition {} indexes rows outside the frame", partition.id),
            ));
        }
    }

    let mut results: Vec<ResampleResult> = run_with_workers(opts.workers, |parallelism| {
        parallelism.maybe_par_map(partitions, |partition| {
            if opts.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                return None;
            }
            Some(evaluate_partition(
                frame,
                partition,
                estimator,
                metrics,
                extractor,
                opts,
                observed_col,
            ))
        })
    })
    .into_iter()
    .flatten()
    .collect();

    results.sort_by_key(|r| r.id);
    Ok(results)
}

fn evaluate_partition<E: Estimator>(
    frame: &Frame,
    partition: &Partition,
    estimator: &E,
    metrics: &[&dyn Metric],
    extractor: Option<&dyn Extract<E::Fitted>>,
    opts: &RunOptions,
    observed_col: &[f64],
) -> ResampleResult {
    let fitted = match estimator.fit(frame, &partition.analysis) {
        Ok(fitted) => fitted,
        Err(e) => {
            return ResampleResult::failed(
                partition.id,
                FailureNote::Fit {
                    message: e.to_string(),
                },
            )
        }
    };

    let predicted = match estimator.predict(&fitted, frame, &partition.assessment) {
        Ok(predicted) => predicted,
        Err(e) => {
            return ResampleResult::failed(
                partition.id,
                FailureNote::Fit {
                    message: e.to_string(),
                },
            )
        }
    };

    let observed: Vec<f64> = partition
        .assessment
        .iter()
        .map(|&row| observed_col[row])
        .collect();

    let mut estimates = BTreeMap::new();
    for metric in metrics {
        match metric.compute(&observed, &predicted) {
            Ok(value) => {
                estimates.insert(metric.name().to_string(), value);
            }
            Err(e) => {
                return ResampleResult::failed(
                    partition.id,
                    FailureNote::Metric {
                        metric: metric.name().to_string(),
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    let mut result = ResampleResult::succeeded(partition.id, estimates);
    if opts.save_predictions {
        result.predictions = Some(
            partition
                .assessment
                .iter()
                .zip(predicted.iter())
                .map(|(&row, &predicted)| Prediction {
                    row,
                    observed: observed_col[row],
                    predicted,
                })
                .collect(),
        );
    }
    result.extracted = extractor.map(|ex| ex.extract(&fitted));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CancelToken;
    use crate::traits::BoxError;
    use crossval_partition::vfold;

    /// Predicts the mean of the analysis-side response.
    struct MeanModel {
        response: &'static str,
    }

    impl Estimator for MeanModel {
        type Fitted = f64;

        fn fit(&self, frame: &Frame, rows: &[usize]) -> Result<f64, BoxError> {
            let y = frame.column(self.response).map_err(|e| e.to_string())?;
            if rows.is_empty() {
                return Err("empty analysis set".into());
            }
            Ok(rows.iter().map(|&i| y[i]).sum::<f64>() / rows.len() as f64)
        }

        fn predict(&self, fitted: &f64, _: &Frame, rows: &[usize]) -> Result<Vec<f64>, BoxError> {
            Ok(vec![*fitted; rows.len()])
        }
    }

    /// Fails to fit whenever the analysis set excludes a marked row.
    struct FailOnFold {
        inner: MeanModel,
        poison_row: usize,
    }

    impl Estimator for FailOnFold {
        type Fitted = f64;

        fn fit(&self, frame: &Frame, rows: &[usize]) -> Result<f64, BoxError> {
            if !rows.contains(&self.poison_row) {
                return Err("synthetic fit failure".into());
            }
            self.inner.fit(frame, rows)
        }

        fn predict(&self, fitted: &f64, frame: &Frame, rows: &[usize]) -> Result<Vec<f64>, BoxError> {
            self.inner.predict(fitted, frame, rows)
        }
    }

    struct MeanAbsErr;

    impl Metric for MeanAbsErr {
        fn name(&self) -> &str {
            "mae"
        }

        fn compute(&self, observed: &[f64], predicted: &[f64]) -> Result<f64, BoxError> {
            if observed.is_empty() {
                return Err("no assessment rows".into());
            }
            Ok(observed
                .iter()
                .zip(predicted)
                .map(|(o, p)| (o - p).abs())
                .sum::<f64>()
                / observed.len() as f64)
        }
    }

    fn test_frame(n: usize) -> Frame {
        Frame::from_columns(vec![("y", (0..n).map(|i| i as f64).collect::<Vec<_>>())]).unwrap()
    }

    #[test]
    fn test_run_sorted_and_complete() {
        let frame = test_frame(20);
        let parts = vfold(20, 4, 3).unwrap();
        let model = MeanModel { response: "y" };
        let results = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y").with_workers(2),
        )
        .unwrap();

        assert_eq!(results.len(), 4);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.id.fold, i as u32);
            assert!(!r.is_failure());
            assert!(r.metric("mae").unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_partial_failure_is_isolated() {
        let frame = test_frame(10);
        let parts = vfold(10, 5, 1).unwrap();
        // The fold whose assessment set holds the poison row makes fit fail
        // (the analysis side no longer contains it); all others succeed.
        let model = FailOnFold {
            inner: MeanModel { response: "y" },
            poison_row: 7,
        };
        let results = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y"),
        )
        .unwrap();

        assert_eq!(results.len(), 5);
        let failed: Vec<_> = results.iter().filter(|r| r.is_failure()).collect();
        assert_eq!(failed.len(), 1);
        assert!(matches!(failed[0].failure, Some(FailureNote::Fit { .. })));
        assert_eq!(results.iter().filter(|r| !r.is_failure()).count(), 4);
    }

    #[test]
    fn test_missing_response_is_fatal() {
        let frame = test_frame(10);
        let parts = vfold(10, 5, 1).unwrap();
        let model = MeanModel { response: "y" };
        let err = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("nope"),
        )
        .unwrap_err();
        assert!(matches!(err, crossval_core::EvalError::MissingColumn { .. }));
    }

    #[test]
    fn test_save_predictions() {
        let frame = test_frame(12);
        let parts = vfold(12, 3, 5).unwrap();
        let model = MeanModel { response: "y" };
        let results = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y").with_predictions(),
        )
        .unwrap();

        for r in &results {
            let preds = r.predictions.as_ref().unwrap();
            assert_eq!(preds.len(), 4);
            for p in preds {
                assert_eq!(p.observed, p.row as f64);
            }
        }
    }

    #[test]
    fn test_extractor_payload_attached() {
        let frame = test_frame(9);
        let parts = vfold(9, 3, 2).unwrap();
        let model = MeanModel { response: "y" };
        let extract = |fitted: &f64| serde_json::json!({ "mean": fitted });
        let results = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            Some(&extract),
            &RunOptions::new("y"),
        )
        .unwrap();

        for r in &results {
            let payload = r.extracted.as_ref().unwrap();
            assert!(payload["mean"].is_f64());
        }
    }

    #[test]
    fn test_cancelled_run_keeps_finished_results() {
        let frame = test_frame(10);
        let parts = vfold(10, 5, 1).unwrap();
        let model = MeanModel { response: "y" };
        let token = CancelToken::new();
        token.cancel();
        let results = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y").with_cancel(token),
        )
        .unwrap();
        // Cancelled before anything started: nothing computed, nothing lost.
        assert!(results.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let frame = test_frame(30);
        let parts = vfold(30, 6, 11).unwrap();
        let model = MeanModel { response: "y" };
        let sequential = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y").with_workers(1),
        )
        .unwrap();
        let parallel = run(
            &frame,
            &parts,
            &model,
            &[&MeanAbsErr],
            None,
            &RunOptions::new("y").with_workers(4),
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }
}
