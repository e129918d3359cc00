use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crossval_core::{EvalResult, FailureNote, PartitionId, ResampleResult};

/// One raw estimate: `(partition, metric, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: PartitionId,
    pub metric: String,
    pub estimate: f64,
}

/// One summarized metric across the successful partitions.
///
/// `std_err` is the n−1 sample standard deviation over `sqrt(n)`; with a
/// single surviving partition it is `NaN` rather than a fabricated zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: String,
    pub mean: f64,
    pub std_err: f64,
    pub n: usize,
}

/// Raw table: one row per successful partition and metric, in partition
/// order. Failed partitions are excluded; see [`failures`].
pub fn collect(results: &[ResampleResult]) -> Vec<MetricRow> {
    results
        .iter()
        .filter(|r| !r.is_failure())
        .flat_map(|r| {
            r.metrics.iter().map(|(metric, &estimate)| MetricRow {
                id: r.id,
                metric: metric.clone(),
                estimate,
            })
        })
        .collect()
}

/// Summary table: per metric mean, standard error and the number of
/// successful partitions that contributed.
pub fn summarize(results: &[ResampleResult]) -> Vec<MetricSummary> {
    let mut by_metric: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in results.iter().filter(|r| !r.is_failure()) {
        for (metric, &estimate) in &r.metrics {
            by_metric.entry(metric).or_default().push(estimate);
        }
    }

    by_metric
        .into_iter()
        .map(|(metric, values)| {
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let std_err = if n > 1 {
                let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>()
                    / (n - 1) as f64;
                (var / n as f64).sqrt()
            } else {
                f64::NAN
            };
            MetricSummary {
                metric: metric.to_string(),
                mean,
                std_err,
                n,
            }
        })
        .collect()
}

/// The partitions excluded from aggregation, with their failure notes.
pub fn failures(results: &[ResampleResult]) -> Vec<(PartitionId, &FailureNote)> {
    results
        .iter()
        .filter_map(|r| r.failure.as_ref().map(|note| (r.id, note)))
        .collect()
}

/// Write the raw table as CSV: `partition,metric,estimate`.
pub fn write_raw_csv<P: AsRef<Path>>(path: P, results: &[ResampleResult]) -> EvalResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.write_record(["partition", "metric", "estimate"])?;
    for row in collect(results) {
        wtr.write_record([row.id.to_string(), row.metric, row.estimate.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the summary table as CSV: `metric,mean,std_err,n`.
pub fn write_summary_csv<P: AsRef<Path>>(path: P, results: &[ResampleResult]) -> EvalResult<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.write_record(["metric", "mean", "std_err", "n"])?;
    for row in summarize(results) {
        wtr.write_record([
            row.metric,
            row.mean.to_string(),
            row.std_err.to_string(),
            row.n.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
