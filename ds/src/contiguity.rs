//! Partitioning of a gapped id sequence into runs of consecutive ids
//!
//! Dialog ids are ascending but not contiguous; a gap separates one scene
//! from the next. The index is built once from the full id list and answers
//! "which scene contains this id" by binary search over run bounds.

use std::ops::RangeInclusive;

use thiserror::Error;
use tracing::debug;

/// A maximal closed interval of ids that are all present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    lo: i64,
    hi: i64,
}

#[allow(clippy::len_without_is_empty)]
impl Run {
    fn new(lo: i64, hi: i64) -> Self {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    pub fn len(&self) -> u64 {
        self.hi.abs_diff(self.lo) + 1
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lo <= id && id <= self.hi
    }

    /// Every id in the run, ascending
    pub fn ids(&self) -> RangeInclusive<i64> {
        self.lo..=self.hi
    }
}

/// Input that breaks the ascending, distinct contract
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContiguityError {
    #[error("Ids not ascending at position {position}: {previous} then {next}")]
    NotAscending { position: usize, previous: i64, next: i64 },

    #[error("Duplicate id {id} at position {position}")]
    Duplicate { position: usize, id: i64 },
}

/// Sorted, non-overlapping runs covering exactly the input ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContiguityIndex {
    runs: Vec<Run>,
}

impl ContiguityIndex {
    /// Build from ids the caller guarantees are ascending and distinct
    ///
    /// Store output ordered by id satisfies this. Use [`try_build`] for
    /// input of unknown shape.
    ///
    /// [`try_build`]: ContiguityIndex::try_build
    pub fn build(ids: &[i64]) -> Self {
        let mut runs = Vec::new();
        let Some((&first, rest)) = ids.split_first() else {
            return Self { runs };
        };

        let mut start = first;
        let mut prev = first;
        for &id in rest {
            if prev.checked_add(1) != Some(id) {
                runs.push(Run::new(start, prev));
                start = id;
            }
            prev = id;
        }
        runs.push(Run::new(start, prev));

        debug!(ids = ids.len(), runs = runs.len(), "ContiguityIndex::build");
        Self { runs }
    }

    /// Build after checking the ascending, distinct contract
    pub fn try_build(ids: &[i64]) -> Result<Self, ContiguityError> {
        for (i, pair) in ids.windows(2).enumerate() {
            let (previous, next) = (pair[0], pair[1]);
            if next == previous {
                return Err(ContiguityError::Duplicate {
                    position: i + 1,
                    id: next,
                });
            }
            if next < previous {
                return Err(ContiguityError::NotAscending {
                    position: i + 1,
                    previous,
                    next,
                });
            }
        }
        Ok(Self::build(ids))
    }

    /// The run containing `target`, if `target` was in the input
    pub fn run_containing(&self, target: i64) -> Option<Run> {
        // First run whose upper bound reaches target; it holds target iff lo <= target.
        let pos = self.runs.partition_point(|run| run.hi < target);
        self.runs.get(pos).copied().filter(|run| run.lo <= target)
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of runs
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
