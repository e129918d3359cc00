use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crossval_core::{stream_seed, EvalError, EvalResult, Partition, PartitionId};

/// V-fold cross-validation: shuffle `[0, n)`, split into `v` folds.
///
/// Fold sizes follow the remainder-first policy: the first `n % v` folds
/// get `n / v + 1` rows, the rest `n / v`. Each fold is the assessment set
/// of exactly one partition; its complement is the analysis set.
pub fn vfold(n: usize, v: usize, seed: u64) -> EvalResult<Vec<Partition>> {
    let mut rng = StdRng::seed_from_u64(seed);
    vfold_with(n, v, 0, &mut rng)
}

/// V-fold repeated `repeats` times under independent seed streams.
/// Produces exactly `v * repeats` partitions tagged `(repeat, fold)`.
pub fn repeated_vfold(n: usize, v: usize, repeats: usize, seed: u64) -> EvalResult<Vec<Partition>> {
    if repeats == 0 {
        return Err(EvalError::insufficient(n, "repeated v-fold requires repeats >= 1"));
    }
    let mut partitions = Vec::with_capacity(v * repeats);
    for r in 0..repeats {
        let mut rng = StdRng::seed_from_u64(stream_seed(seed, r as u64));
        partitions.extend(vfold_with(n, v, r as u32, &mut rng)?);
    }
    Ok(partitions)
}

fn vfold_with(n: usize, v: usize, repeat: u32, rng: &mut StdRng) -> EvalResult<Vec<Partition>> {
    check_v(n, v)?;

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut folds = Vec::with_capacity(v);
    let mut start = 0;
    for size in fold_sizes(n, v) {
        folds.push(order[start..start + size].to_vec());
        start += size;
    }

    Ok(assemble_folds(&folds, repeat))
}

/// V-fold applied independently inside strata derived from `strata`.
///
/// Values are grouped by identity when at most `bins` distinct values
/// exist, otherwise by step-function quantile cut-points. A bin with fewer
/// than `v` members is merged into the following bin (the last bin merges
/// backwards) before folding, never silently dropped. The assessment set
/// of fold `f` is the union of the bin-local fold-`f` assessment sets.
pub fn stratified_vfold(strata: &[f64], v: usize, bins: usize, seed: u64) -> EvalResult<Vec<Partition>> {
    let n = strata.len();
    check_v(n, v)?;
    if bins == 0 {
        return Err(EvalError::insufficient(n, "stratification requires bins >= 1"));
    }
    if strata.iter().any(|v| !v.is_finite()) {
        return Err(EvalError::insufficient(
            n,
            "strata column contains non-finite values",
        ));
    }

    let mut groups = bin_indices(strata, bins);
    merge_small_bins(&mut groups, v);
    if groups.len() == 1 && groups[0].len() < v {
        return Err(EvalError::insufficient(
            n,
            format!("strata too small for {v}-fold even after merging"),
        ));
    }

    // One rng drives every bin-local shuffle, in bin order, so the whole
    // sequence is a function of (strata, v, bins, seed).
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); v];
    for group in &mut groups {
        group.shuffle(&mut rng);
        let mut start = 0;
        for (f, size) in fold_sizes(group.len(), v).into_iter().enumerate() {
            folds[f].extend_from_slice(&group[start..start + size]);
            start += size;
        }
    }

    Ok(assemble_folds(&folds, 0))
}

/// Bootstrap resampling: `times` with-replacement draws of size `n`.
///
/// The analysis side is the drawn index multiset; the assessment side is
/// the out-of-bag rows never drawn. For small `n` the out-of-bag set may
/// be empty; the partition is still emitted.
pub fn bootstrap(n: usize, times: usize, seed: u64) -> EvalResult<Vec<Partition>> {
    if n == 0 {
        return Err(EvalError::insufficient(n, "bootstrap requires a non-empty dataset"));
    }
    if times == 0 {
        return Err(EvalError::insufficient(n, "bootstrap requires times >= 1"));
    }

    let mut partitions = Vec::with_capacity(times);
    for rep in 0..times {
        let mut rng = StdRng::seed_from_u64(stream_seed(seed, rep as u64));
        let mut drawn = vec![false; n];
        let mut analysis: Vec<usize> = (0..n)
            .map(|_| {
                let idx = rng.gen_range(0..n);
                drawn[idx] = true;
                idx
            })
            .collect();
        analysis.sort_unstable();
        let assessment: Vec<usize> = (0..n).filter(|&i| !drawn[i]).collect();
        partitions.push(Partition::new(
            PartitionId::fold(rep as u32),
            analysis,
            assessment,
        ));
    }
    Ok(partitions)
}

/// Monte Carlo cross-validation: `times` independent draws of
/// `floor(prop * n)` analysis rows without replacement; the remainder
/// assesses. Assessment sets of different partitions may overlap.
pub fn monte_carlo(n: usize, prop: f64, times: usize, seed: u64) -> EvalResult<Vec<Partition>> {
    let analysis_size = split_size(n, prop, times, "monte carlo cv")?;

    let mut partitions = Vec::with_capacity(times);
    for rep in 0..times {
        let mut rng = StdRng::seed_from_u64(stream_seed(seed, rep as u64));
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);
        let mut analysis = order[..analysis_size].to_vec();
        let mut assessment = order[analysis_size..].to_vec();
        analysis.sort_unstable();
        assessment.sort_unstable();
        partitions.push(Partition::new(
            PartitionId::fold(rep as u32),
            analysis,
            assessment,
        ));
    }
    Ok(partitions)
}

/// Rolling-origin windows over an ordered dataset (no shuffling).
///
/// Iteration `i` starts at `s = i * (skip + 1)`; the analysis window is
/// `[s, s + initial)` (or `[0, s + initial)` when cumulative) and the
/// assessment window `[s + initial, s + initial + assess)`. Generation
/// stops when the assessment window would run past `n`, giving
/// `(n - initial - assess) / (skip + 1) + 1` iterations.
pub fn rolling_origin(
    n: usize,
    initial: usize,
    assess: usize,
    skip: usize,
    cumulative: bool,
) -> EvalResult<Vec<Partition>> {
    if initial == 0 || assess == 0 {
        return Err(EvalError::insufficient(
            n,
            "rolling origin requires initial >= 1 and assess >= 1",
        ));
    }
    if initial + assess > n {
        return Err(EvalError::insufficient(
            n,
            format!("rolling origin needs at least {} rows", initial + assess),
        ));
    }

    let step = skip + 1;
    let iterations = (n - initial - assess) / step + 1;
    let mut partitions = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let s = i * step;
        let analysis_start = if cumulative { 0 } else { s };
        let analysis: Vec<usize> = (analysis_start..s + initial).collect();
        let assessment: Vec<usize> = (s + initial..s + initial + assess).collect();
        partitions.push(Partition::new(PartitionId::fold(i as u32), analysis, assessment));
    }
    Ok(partitions)
}

/// A single partition holding out a uniformly random `1 - prop` fraction.
pub fn validation_split(n: usize, prop: f64, seed: u64) -> EvalResult<Vec<Partition>> {
    let analysis_size = split_size(n, prop, 1, "validation split")?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    let mut analysis = order[..analysis_size].to_vec();
    let mut assessment = order[analysis_size..].to_vec();
    analysis.sort_unstable();
    assessment.sort_unstable();

    Ok(vec![Partition::new(PartitionId::fold(0), analysis, assessment)])
}

/// Leave-one-out: `n` partitions with singleton assessment sets.
pub fn leave_one_out(n: usize) -> EvalResult<Vec<Partition>> {
    if n < 2 {
        return Err(EvalError::insufficient(n, "leave-one-out requires n >= 2"));
    }
    Ok((0..n)
        .map(|i| {
            let analysis: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            Partition::new(PartitionId::fold(i as u32), analysis, vec![i])
        })
        .collect())
}

fn check_v(n: usize, v: usize) -> EvalResult<()> {
    if v < 2 {
        return Err(EvalError::insufficient(n, "v-fold requires v >= 2"));
    }
    if n < v {
        return Err(EvalError::insufficient(n, format!("{v}-fold requires n >= {v}")));
    }
    Ok(())
}

/// Remainder-first fold sizing: the first `n % v` folds take the extra row.
fn fold_sizes(n: usize, v: usize) -> Vec<usize> {
    (0..v).map(|f| n / v + usize::from(f < n % v)).collect()
}

/// Validate `prop` and return `floor(prop * n)`, requiring both sides of
/// every split to be non-empty.
fn split_size(n: usize, prop: f64, times: usize, what: &str) -> EvalResult<usize> {
    if !(prop > 0.0 && prop < 1.0) {
        return Err(EvalError::insufficient(n, format!("{what} requires prop in (0, 1)")));
    }
    if times == 0 {
        return Err(EvalError::insufficient(n, format!("{what} requires times >= 1")));
    }
    let analysis_size = (prop * n as f64).floor() as usize;
    if analysis_size == 0 || analysis_size >= n {
        return Err(EvalError::insufficient(
            n,
            format!("{what} with prop = {prop} leaves an empty split"),
        ));
    }
    Ok(analysis_size)
}

/// Build the partition per fold: the fold assesses, everything else analyzes.
fn assemble_folds(folds: &[Vec<usize>], repeat: u32) -> Vec<Partition> {
    folds
        .iter()
        .enumerate()
        .map(|(f, fold)| {
            let mut assessment = fold.clone();
            assessment.sort_unstable();
            let mut analysis: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(g, _)| *g != f)
                .flat_map(|(_, other)| other.iter().copied())
                .collect();
            analysis.sort_unstable();
            Partition::new(PartitionId::new(repeat, f as u32), analysis, assessment)
        })
        .collect()
}

/// Group row indices by strata value: identity groups when few distinct
/// values exist, step-function quantile bins otherwise.
fn bin_indices(strata: &[f64], bins: usize) -> Vec<Vec<usize>> {
    let mut distinct: Vec<f64> = strata.to_vec();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();

    if distinct.len() <= bins {
        return distinct
            .iter()
            .map(|&value| {
                strata
                    .iter()
                    .enumerate()
                    .filter(|(_, &s)| s == value)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
    }

    // Quantile cut-points with no interpolation: break k sits at the first
    // sorted value whose rank reaches k/bins of the total.
    let mut sorted: Vec<f64> = strata.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let mut breaks: Vec<f64> = (1..bins)
        .map(|k| {
            let rank = ((k as f64 / bins as f64) * n as f64).ceil() as usize;
            sorted[rank.min(n - 1)]
        })
        .collect();
    breaks.dedup();

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); breaks.len() + 1];
    for (i, &value) in strata.iter().enumerate() {
        let bin = breaks.iter().take_while(|&&b| value >= b).count();
        groups[bin].push(i);
    }
    groups.retain(|g| !g.is_empty());
    groups
}

/// Merge bins with fewer than `v` members into their neighbor.
fn merge_small_bins(groups: &mut Vec<Vec<usize>>, v: usize) {
    while groups.len() > 1 {
        let small = groups.iter().position(|g| g.len() < v);
        match small {
            Some(i) => {
                let members = groups.remove(i);
                let target = if i < groups.len() { i } else { i - 1 };
                groups[target].extend(members);
            }
            None => break,
        }
    }
}
