use crossval_core::{EvalError, EvalResult, PartitionId, ResampleResult};

/// Verify that every model was run over the same partition id set.
///
/// Comparing models resampled under different partition sequences would
/// break the partition-level pairing the whole comparison rests on, so a
/// mismatch is fatal before any statistics are computed.
pub fn check_aligned(runs: &[&[ResampleResult]]) -> EvalResult<()> {
    let Some(first) = runs.first() else {
        return Err(EvalError::ComparatorPrecondition(
            "no model results to compare".into(),
        ));
    };
    let reference: Vec<PartitionId> = id_set(first);

    for (idx, run) in runs.iter().enumerate().skip(1) {
        if id_set(run) != reference {
            return Err(EvalError::ComparatorPrecondition(format!(
                "model {idx} was run over a different partition set than model 0"
            )));
        }
    }
    Ok(())
}

/// Per-partition metric values for partitions where every model succeeded
/// and produced the metric, ordered by partition id.
///
/// Partitions where any model failed are dropped from pairing; their
/// diagnostics stay on the individual result collections.
pub fn complete_cases(
    runs: &[&[ResampleResult]],
    metric: &str,
) -> EvalResult<Vec<(PartitionId, Vec<f64>)>> {
    check_aligned(runs)?;

    let sorted: Vec<Vec<&ResampleResult>> = runs
        .iter()
        .map(|run| {
            let mut v: Vec<&ResampleResult> = run.iter().collect();
            v.sort_by_key(|r| r.id);
            v
        })
        .collect();

    let n = sorted[0].len();
    let mut cases = Vec::with_capacity(n);
    for i in 0..n {
        let id = sorted[0][i].id;
        let values: Option<Vec<f64>> = sorted
            .iter()
            .map(|run| run[i].metric(metric))
            .collect();
        if let Some(values) = values {
            cases.push((id, values));
        }
    }
    Ok(cases)
}

fn id_set(run: &[ResampleResult]) -> Vec<PartitionId> {
    let mut ids: Vec<PartitionId> = run.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids
}
