use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one partition, ordered by `(repeat, fold)`.
///
/// Single-pass schemes use `repeat = 0`; repeated V-fold tags each
/// partition with the repeat it came from so downstream consumers can
/// regroup full coverage blocks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PartitionId {
    pub repeat: u32,
    pub fold: u32,
}

impl PartitionId {
    pub fn new(repeat: u32, fold: u32) -> Self {
        PartitionId { repeat, fold }
    }

    /// Id for a scheme without repeats.
    pub fn fold(fold: u32) -> Self {
        PartitionId { repeat: 0, fold }
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.repeat == 0 {
            write!(f, "fold{:02}", self.fold)
        } else {
            write!(f, "repeat{}.fold{:02}", self.repeat, self.fold)
        }
    }
}

/// One analysis/assessment split over a shared frame.
///
/// Both sides are integer row indices into the frame; records are never
/// copied into the partition. For most schemes the two sides are disjoint
/// and exhaustive. Bootstrap keeps `analysis` as a with-replacement
/// multiset with the never-drawn rows as `assessment`; Monte Carlo CV
/// allows assessment sets of different partitions to overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub id: PartitionId,
    pub analysis: Vec<usize>,
    pub assessment: Vec<usize>,
}

impl Partition {
    pub fn new(id: PartitionId, analysis: Vec<usize>, assessment: Vec<usize>) -> Self {
        Partition {
            id,
            analysis,
            assessment,
        }
    }
}
