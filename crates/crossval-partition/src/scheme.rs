use serde::{Deserialize, Serialize};

use crossval_core::{EvalResult, Frame, Partition};

use crate::generate;

/// A resampling scheme, carrying only the parameters needed to regenerate
/// its partition sequence from `(n, seed)`.
///
/// Identical `(scheme, n, seed)` triples always regenerate bit-identical
/// index sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scheme {
    /// `v` folds; each fold is the assessment set exactly once.
    VFold { v: usize },
    /// V-fold repeated with independent shuffles; `v * repeats` partitions.
    RepeatedVFold { v: usize, repeats: usize },
    /// V-fold inside strata derived from a column of the frame.
    StratifiedVFold {
        v: usize,
        strata_column: String,
        bins: usize,
    },
    /// With-replacement draws of size `n`; out-of-bag rows assess.
    Bootstrap { times: usize },
    /// Random `prop` fraction analyzes, remainder assesses, repeated.
    MonteCarloCv { prop: f64, times: usize },
    /// Ordered time-series windows.
    RollingOrigin {
        initial: usize,
        assess: usize,
        skip: usize,
        cumulative: bool,
    },
    /// A single random `prop` / `1 - prop` split.
    ValidationSplit { prop: f64 },
    /// `n` partitions with singleton assessment sets.
    LeaveOneOut,
}

impl Scheme {
    /// Generate the ordered partition sequence for `frame` under `seed`.
    pub fn partitions(&self, frame: &Frame, seed: u64) -> EvalResult<Vec<Partition>> {
        let n = frame.n_rows();
        match self {
            Scheme::VFold { v } => generate::vfold(n, *v, seed),
            Scheme::RepeatedVFold { v, repeats } => generate::repeated_vfold(n, *v, *repeats, seed),
            Scheme::StratifiedVFold {
                v,
                strata_column,
                bins,
            } => {
                let strata = frame.column(strata_column)?;
                generate::stratified_vfold(strata, *v, *bins, seed)
            }
            Scheme::Bootstrap { times } => generate::bootstrap(n, *times, seed),
            Scheme::MonteCarloCv { prop, times } => generate::monte_carlo(n, *prop, *times, seed),
            Scheme::RollingOrigin {
                initial,
                assess,
                skip,
                cumulative,
            } => generate::rolling_origin(n, *initial, *assess, *skip, *cumulative),
            Scheme::ValidationSplit { prop } => generate::validation_split(n, *prop, seed),
            Scheme::LeaveOneOut => generate::leave_one_out(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> Frame {
        Frame::from_columns(vec![("y", (0..n).map(|i| i as f64).collect::<Vec<_>>())]).unwrap()
    }

    #[test]
    fn test_dispatch_vfold() {
        let parts = Scheme::VFold { v: 5 }.partitions(&frame(25), 7).unwrap();
        assert_eq!(parts.len(), 5);
    }

    #[test]
    fn test_serde_round_trip() {
        let scheme = Scheme::MonteCarloCv {
            prop: 0.75,
            times: 10,
        };
        let json = serde_json::to_string(&scheme).unwrap();
        let back: Scheme = serde_json::from_str(&json).unwrap();
        assert_eq!(scheme, back);
    }
}
