//! Shot descriptors and shot-range selection.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{MeasureError, MeasureResult};

/// One entry of a shot vector: `copies` repetitions of `shots` shots each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotCopies {
    /// Shots per repetition.
    pub shots: u64,
    /// Number of repetitions.
    pub copies: u64,
}

/// How many measurement repetitions were requested, and how they are
/// partitioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shots {
    shot_vector: Vec<ShotCopies>,
}

impl Shots {
    /// Analytic execution: no shots.
    pub fn analytic() -> Self {
        Self::default()
    }

    /// A shot vector; consecutive equal entries are merged into copies.
    pub fn from_vec(shots: impl IntoIterator<Item = u64>) -> Self {
        let mut shot_vector: Vec<ShotCopies> = Vec::new();
        for s in shots {
            match shot_vector.last_mut() {
                Some(last) if last.shots == s => last.copies += 1,
                _ => shot_vector.push(ShotCopies { shots: s, copies: 1 }),
            }
        }
        Self { shot_vector }
    }

    /// A shot vector given directly as `(shots, copies)` entries.
    pub fn from_copies(entries: impl IntoIterator<Item = ShotCopies>) -> Self {
        Self {
            shot_vector: entries.into_iter().filter(|e| e.copies > 0).collect(),
        }
    }

    /// The shot vector.
    pub fn shot_vector(&self) -> &[ShotCopies] {
        &self.shot_vector
    }

    /// Total number of shots, or `None` for analytic execution.
    pub fn total_shots(&self) -> Option<u64> {
        if self.shot_vector.is_empty() {
            None
        } else {
            Some(self.shot_vector.iter().map(|e| e.shots * e.copies).sum())
        }
    }

    /// True if no shots were requested.
    pub fn is_analytic(&self) -> bool {
        self.shot_vector.is_empty()
    }

    /// True if the shots are split into more than one group.
    pub fn has_partitioned_shots(&self) -> bool {
        match self.shot_vector.as_slice() {
            [] => false,
            [single] => single.copies > 1,
            _ => true,
        }
    }

    /// Number of result elements a shot vector produces: `Σ copies`.
    pub fn num_elements(&self) -> u64 {
        self.shot_vector.iter().map(|e| e.copies).sum()
    }
}

impl From<u64> for Shots {
    fn from(shots: u64) -> Self {
        Self::from_vec([shots])
    }
}

impl From<Vec<u64>> for Shots {
    fn from(shots: Vec<u64>) -> Self {
        Self::from_vec(shots)
    }
}

/// A contiguous, half-open sub-range of shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRange {
    /// First shot retained.
    pub start: usize,
    /// One past the last shot retained.
    pub end: usize,
}

impl ShotRange {
    /// Create a range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of shots selected, before clamping.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clamp to `total` available shots. An empty result is an error.
    pub fn resolve(&self, total: usize) -> MeasureResult<Range<usize>> {
        let end = self.end.min(total);
        if self.start >= end {
            return Err(MeasureError::EmptyShotRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(self.start..end)
    }
}

impl From<Range<usize>> for ShotRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Resolve an optional shot range against `total` shots.
pub(crate) fn select_shots(range: Option<ShotRange>, total: usize) -> MeasureResult<Range<usize>> {
    match range {
        Some(r) => r.resolve(total),
        None if total == 0 => Err(MeasureError::EmptyShotRange { start: 0, end: 0 }),
        None => Ok(0..total),
    }
}
